//! Data models for notecore.
//!
//! This module defines the core entities: User, Note and the note's child
//! payloads (image URIs and Checkbox items). Surrogate keys are SQLite
//! rowids wrapped in newtypes so user and note ids cannot be mixed up.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

macro_rules! rowid_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                self.0.to_sql()
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map($name)
            }
        }
    };
}

rowid_newtype!(
    /// Primary key of a row in `users`
    UserId
);

rowid_newtype!(
    /// Primary key of a row in `notes`
    NoteId
);

/// A registered user.
///
/// Only the password digest is ever stored; the plaintext never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_digest: String,
}

/// A note owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    /// Unix millis of the last save. Reset on every edit, so lists sort by
    /// last modification.
    pub created_at: i64,
    pub user_id: UserId,
}

impl Note {
    /// `created_at` as a UTC datetime (None if out of chrono's range)
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.created_at).single()
    }
}

/// A checklist item attached to a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkbox {
    pub checked: bool,
    pub text: String,
}

impl Checkbox {
    pub fn new(text: impl Into<String>, checked: bool) -> Self {
        Self {
            checked,
            text: text.into(),
        }
    }
}

/// A note together with its child collections, as shown in the note view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDetail {
    pub note: Note,
    /// Image URIs in insertion order
    pub images: Vec<String>,
    /// Checklist items in insertion order
    pub checkboxes: Vec<Checkbox>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_at_utc() {
        let note = Note {
            id: NoteId(1),
            title: "Groceries".to_string(),
            content: "milk, eggs".to_string(),
            created_at: 1_700_000_000_123,
            user_id: UserId(7),
        };

        let dt = note.created_at_utc().unwrap();
        assert_eq!(dt.timestamp_millis(), 1_700_000_000_123);
    }

    #[test]
    fn test_ids_serialize_as_plain_integers() {
        let json = serde_json::to_string(&NoteId(42)).unwrap();
        assert_eq!(json, "42");

        let id: UserId = serde_json::from_str("9").unwrap();
        assert_eq!(id, UserId(9));
        assert_eq!(id.to_string(), "9");
    }

    #[test]
    fn test_checkbox_new() {
        let item = Checkbox::new("task1", false);
        assert_eq!(item.text, "task1");
        assert!(!item.checked);
    }
}
