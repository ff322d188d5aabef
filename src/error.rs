//! Error types for notecore.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias for note store operations
pub type NoteResult<T> = Result<T, NoteError>;

/// Main error type for note store operations
#[derive(Error, Debug)]
pub enum NoteError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("This username already exists: {0}")]
    DuplicateUsername(String),

    #[error("Invalid username or password!")]
    AuthenticationFailed,

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database operation failed: {0}")]
    DatabaseOperation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NoteError {
    /// Create a validation error carrying a single message
    pub fn validation(message: impl Into<String>) -> Self {
        NoteError::Validation(ValidationError::new(vec![message.into()]))
    }

    /// Create a new write failure
    pub fn write_failed(message: impl Into<String>) -> Self {
        NoteError::WriteFailed(message.into())
    }

    /// Create a new not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        NoteError::NotFound(message.into())
    }

    /// Create a new database operation error
    pub fn database_op(message: impl Into<String>) -> Self {
        NoteError::DatabaseOperation(message.into())
    }

    /// Whether the caller can recover by fixing input or retrying with other data.
    ///
    /// Storage-level failures are not recoverable from the caller's side.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            NoteError::Validation(_)
                | NoteError::DuplicateUsername(_)
                | NoteError::AuthenticationFailed
                | NoteError::NotFound(_)
        )
    }
}

/// Form validation failure.
///
/// Holds every rule that failed, in check order, so the UI can show them all at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub messages: Vec<String>,
}

impl ValidationError {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    /// Check whether any of the messages contains `needle`
    pub fn mentions(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.contains(needle))
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.messages.join("\n"))
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_joins_lines() {
        let err = ValidationError::new(vec![
            "Username cannot be empty!".to_string(),
            "Passwords do not match!".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Username cannot be empty!\nPasswords do not match!"
        );
    }

    #[test]
    fn test_note_error_validation() {
        let err = NoteError::validation("message");
        assert!(matches!(err, NoteError::Validation(ref v) if v.messages == vec!["message"]));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_storage_errors_not_recoverable() {
        assert!(!NoteError::write_failed("insert note").is_recoverable());
        assert!(!NoteError::database_op("lock poisoned").is_recoverable());
        assert!(NoteError::not_found("note 3").is_recoverable());
    }
}
