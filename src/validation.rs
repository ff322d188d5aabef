//! Input validation for notecore.
//!
//! Validators run before any storage access. Form validators collect every
//! failing rule into one `NoteError::Validation` so the UI can list them.

use crate::error::{NoteError, NoteResult, ValidationError};

pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_USERNAME_LENGTH: usize = 100;
pub const MAX_NOTE_TITLE_LENGTH: usize = 1_000;
pub const MAX_NOTE_CONTENT_LENGTH: usize = 100_000; // 100KB of text
pub const MAX_SEARCH_QUERY_LENGTH: usize = 500;

/// Validate a registration form.
///
/// `confirm_password` is only compared when the form supplies one.
/// Password length is counted in characters, not bytes.
pub fn validate_registration(
    username: &str,
    password: &str,
    confirm_password: Option<&str>,
    min_password_length: usize,
) -> NoteResult<()> {
    let mut errors = Vec::new();

    check_username(username, &mut errors);

    if password.trim().is_empty() {
        errors.push("Password cannot be empty!".to_string());
    }

    if let Some(confirm) = confirm_password {
        if !confirm.is_empty() && password != confirm {
            errors.push("Passwords do not match!".to_string());
        }
    }

    if password.chars().count() < min_password_length {
        errors.push(format!(
            "The password must contain at least {} characters!",
            min_password_length
        ));
    }

    finish(errors)
}

/// Validate a login form. Only the username is checked; a wrong password is
/// an authentication failure, not a validation one.
pub fn validate_login(username: &str) -> NoteResult<()> {
    let mut errors = Vec::new();
    check_username(username, &mut errors);
    finish(errors)
}

fn check_username(username: &str, errors: &mut Vec<String>) {
    if username.trim().is_empty() {
        errors.push("Username cannot be empty!".to_string());
    } else if username.chars().count() > MAX_USERNAME_LENGTH {
        errors.push(format!(
            "Username cannot exceed {} characters!",
            MAX_USERNAME_LENGTH
        ));
    }
}

fn finish(errors: Vec<String>) -> NoteResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(NoteError::Validation(ValidationError::new(errors)))
    }
}

/// Validate note title and content sizes.
pub fn validate_note_fields(title: &str, content: &str) -> NoteResult<()> {
    let mut errors = Vec::new();

    if title.len() > MAX_NOTE_TITLE_LENGTH {
        errors.push(format!(
            "Title cannot exceed {} bytes (got {})",
            MAX_NOTE_TITLE_LENGTH,
            title.len()
        ));
    }

    if content.len() > MAX_NOTE_CONTENT_LENGTH {
        errors.push(format!(
            "Content cannot exceed {} bytes (got {})",
            MAX_NOTE_CONTENT_LENGTH,
            content.len()
        ));
    }

    finish(errors)
}

/// Validate a title search query.
pub fn validate_search_query(query: &str) -> NoteResult<()> {
    let length = query.chars().count();
    if length > MAX_SEARCH_QUERY_LENGTH {
        return Err(NoteError::validation(format!(
            "Search query cannot exceed {} characters (got {})",
            MAX_SEARCH_QUERY_LENGTH, length
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(result: NoteResult<()>) -> Vec<String> {
        match result {
            Err(NoteError::Validation(v)) => v.messages,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_registration_valid() {
        assert!(validate_registration("bob", "password123", Some("password123"), 8).is_ok());
        assert!(validate_registration("bob", "password123", None, 8).is_ok());
    }

    #[test]
    fn test_registration_short_password() {
        let msgs = messages(validate_registration("alice", "short1", Some("short1"), 8));
        assert_eq!(msgs, vec!["The password must contain at least 8 characters!"]);
    }

    #[test]
    fn test_registration_collects_all_errors() {
        let msgs = messages(validate_registration("   ", "", Some("other"), 8));
        assert_eq!(
            msgs,
            vec![
                "Username cannot be empty!",
                "Password cannot be empty!",
                "Passwords do not match!",
                "The password must contain at least 8 characters!",
            ]
        );
    }

    #[test]
    fn test_registration_mismatch() {
        let msgs = messages(validate_registration("bob", "password123", Some("password124"), 8));
        assert_eq!(msgs, vec!["Passwords do not match!"]);
    }

    #[test]
    fn test_registration_empty_confirmation_not_compared() {
        assert!(validate_registration("bob", "password123", Some(""), 8).is_ok());
    }

    #[test]
    fn test_registration_length_counts_chars() {
        // 8 characters, 16 bytes
        assert!(validate_registration("bob", "пароль12", None, 8).is_ok());
    }

    #[test]
    fn test_login_requires_username() {
        assert!(validate_login("bob").is_ok());
        let msgs = messages(validate_login(""));
        assert_eq!(msgs, vec!["Username cannot be empty!"]);
    }

    #[test]
    fn test_username_too_long() {
        let long_name = "a".repeat(MAX_USERNAME_LENGTH + 1);
        assert!(validate_login(&long_name).is_err());
    }

    #[test]
    fn test_note_fields_limits() {
        assert!(validate_note_fields("Groceries", "milk, eggs").is_ok());
        assert!(validate_note_fields("", "").is_ok());

        let long_content = "x".repeat(MAX_NOTE_CONTENT_LENGTH + 1);
        assert!(validate_note_fields("t", &long_content).is_err());
    }

    #[test]
    fn test_search_query_too_long() {
        assert!(validate_search_query("Groc").is_ok());
        let long_query = "q".repeat(MAX_SEARCH_QUERY_LENGTH + 1);
        assert!(validate_search_query(&long_query).is_err());

        // Limit counts characters, not bytes
        let cyrillic = "я".repeat(MAX_SEARCH_QUERY_LENGTH);
        assert!(validate_search_query(&cyrillic).is_ok());
    }
}
