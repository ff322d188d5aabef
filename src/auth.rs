//! Registration and login.
//!
//! Passwords are reduced to a digest by a pluggable [`PasswordHasher`] before
//! they reach the store; the store only compares digests. The default hasher
//! is SHA-256 rendered as lowercase hex.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::database::Database;
use crate::error::{NoteError, NoteResult};
use crate::models::User;
use crate::validation::{validate_login, validate_registration};

/// One-way password digest.
///
/// Implementations must be deterministic: the digest is used as an opaque
/// equality key.
pub trait PasswordHasher: Send + Sync {
    fn digest(&self, password: &str) -> String;
}

/// SHA-256 digest, lowercase hex
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl PasswordHasher for Sha256Hasher {
    fn digest(&self, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        let result = hasher.finalize();

        result.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Sign-up form as submitted by the UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    /// Confirmation field; only compared when present and non-empty
    pub confirm_password: Option<String>,
}

impl RegistrationForm {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        confirm_password: Option<&str>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            confirm_password: confirm_password.map(String::from),
        }
    }
}

/// Validate the form, digest the password and create the user.
pub fn register_user(
    db: &Database,
    hasher: &dyn PasswordHasher,
    form: &RegistrationForm,
    min_password_length: usize,
) -> NoteResult<User> {
    validate_registration(
        &form.username,
        &form.password,
        form.confirm_password.as_deref(),
        min_password_length,
    )?;

    let digest = hasher.digest(&form.password);
    let user_id = db.create_user(&form.username, &digest)?;
    tracing::info!("Created new user: {}", form.username);

    Ok(User {
        id: user_id,
        username: form.username.clone(),
        password_digest: digest,
    })
}

/// Look up the user for a username/password pair.
///
/// No match is reported as `AuthenticationFailed`.
pub fn authenticate_user(
    db: &Database,
    hasher: &dyn PasswordHasher,
    username: &str,
    password: &str,
) -> NoteResult<User> {
    validate_login(username)?;

    let digest = hasher.digest(password);
    match db.find_user(username, &digest)? {
        Some(user) => {
            tracing::info!("Logged in: {}", username);
            Ok(user)
        }
        None => {
            tracing::warn!("Failed login for {}", username);
            Err(NoteError::AuthenticationFailed)
        }
    }
}
