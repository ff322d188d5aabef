//! notecore - local persistence core of the note-taking app.
//!
//! This library provides:
//! - Data models (User, Note, Checkbox, NoteDetail)
//! - Database operations (SQLite, foreign-key cascades)
//! - Replace-on-edit handling of a note's images and checkboxes
//! - Title search
//! - Registration and login over a pluggable password digest
//! - An async store handle for the UI layer
//! - Configuration management
//!
//! # Feature Flags
//!
//! - `desktop`: Resolve the config directory from the platform when none is given.

pub mod auth;
mod children;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod search;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use auth::{PasswordHasher, RegistrationForm, Sha256Hasher};
pub use config::Config;
pub use database::Database;
pub use error::{NoteError, NoteResult, ValidationError};
pub use models::{Checkbox, Note, NoteDetail, NoteId, User, UserId};
pub use store::NoteStore;
