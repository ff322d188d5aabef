//! Database operations for notecore.
//!
//! This module owns the SQLite schema (users, notes, image, checkbox) and
//! every read and write against it. Referential integrity lives in the
//! schema: all child tables cascade on delete and update of their parent,
//! and `PRAGMA foreign_keys` is switched on for every connection.
//!
//! Timestamps are Unix milliseconds (INTEGER).

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use rusqlite::{ffi, params, Connection, OptionalExtension, Row};

use crate::children::{insert_children, replace_children, Checkboxes, Images};
use crate::error::{NoteError, NoteResult};
use crate::models::{Checkbox, Note, NoteDetail, NoteId, User, UserId};
use crate::validation::validate_note_fields;

/// Busy timeout used when none is configured
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Columns selected for every Note query, in `row_to_note` order
pub(crate) const NOTE_COLUMNS: &str = "id, title, content, created_at, user_id";

/// Current time as Unix milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn is_constraint(err: &rusqlite::Error, extended_code: i32) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => e.extended_code == extended_code,
        _ => false,
    }
}

/// Database wrapper for SQLite operations
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database file with the default busy timeout
    pub fn new<P: AsRef<Path>>(db_path: P) -> NoteResult<Self> {
        Self::open(db_path, DEFAULT_BUSY_TIMEOUT_MS)
    }

    /// Open (or create) a database file and provision the schema
    pub fn open<P: AsRef<Path>>(db_path: P, busy_timeout_ms: u64) -> NoteResult<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
        // Enable WAL mode for concurrent readers
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        let db = Self { conn };
        db.provision_schema()?;
        tracing::info!("Opened note database at {}", db_path.display());
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn new_in_memory() -> NoteResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let db = Self { conn };
        db.provision_schema()?;
        Ok(db)
    }

    /// Create the four tables and their indexes if they do not exist yet.
    ///
    /// Safe to call any number of times.
    pub fn provision_schema(&self) -> NoteResult<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
            );

            -- created_at is the last save time, reset on every edit
            CREATE TABLE IF NOT EXISTS notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE ON UPDATE CASCADE
            );

            CREATE TABLE IF NOT EXISTS image (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                note_id INTEGER NOT NULL,
                image_uri TEXT NOT NULL,
                FOREIGN KEY (note_id) REFERENCES notes (id) ON DELETE CASCADE ON UPDATE CASCADE
            );

            CREATE TABLE IF NOT EXISTS checkbox (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                note_id INTEGER NOT NULL,
                checked INTEGER NOT NULL DEFAULT 0,
                textCheckbox TEXT NOT NULL,
                FOREIGN KEY (note_id) REFERENCES notes (id) ON DELETE CASCADE ON UPDATE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_notes_user_created ON notes (user_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_image_note ON image (note_id);
            CREATE INDEX IF NOT EXISTS idx_checkbox_note ON checkbox (note_id);
            "#,
        )?;

        tracing::debug!("Schema provisioned");
        Ok(())
    }

    /// Get the underlying connection (for advanced operations)
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Create a user. The digest is stored as-is.
    pub fn create_user(&self, username: &str, password_digest: &str) -> NoteResult<UserId> {
        let result = self.conn.execute(
            "INSERT INTO users (username, password) VALUES (?, ?)",
            params![username, password_digest],
        );

        match result {
            Ok(0) => Err(NoteError::write_failed(format!("insert user {}", username))),
            Ok(_) => {
                let user_id = UserId(self.conn.last_insert_rowid());
                tracing::debug!("Created user {} ({})", username, user_id);
                Ok(user_id)
            }
            Err(e) if is_constraint(&e, ffi::SQLITE_CONSTRAINT_UNIQUE) => {
                Err(NoteError::DuplicateUsername(username.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Find the user matching both username and digest. `None` if there is no match.
    pub fn find_user(&self, username: &str, password_digest: &str) -> NoteResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, password FROM users WHERE username = ? AND password = ? LIMIT 1",
                params![username, password_digest],
                |row| self.row_to_user(row),
            )
            .optional()?;
        Ok(user)
    }

    /// Get a user by id
    pub fn get_user(&self, user_id: UserId) -> NoteResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, password FROM users WHERE id = ?",
                params![user_id],
                |row| self.row_to_user(row),
            )
            .optional()?;
        Ok(user)
    }

    // ========================================================================
    // Notes
    // ========================================================================

    /// Create a note stamped with the current time, with its images and checkboxes
    pub fn create_note(
        &mut self,
        user_id: UserId,
        title: &str,
        content: &str,
        images: &[String],
        checkboxes: &[Checkbox],
    ) -> NoteResult<NoteId> {
        self.create_note_with_timestamp(user_id, title, content, images, checkboxes, now_millis())
    }

    /// Create a note with a specific `created_at` (Unix millis).
    ///
    /// The note row and all child rows are written in one transaction.
    pub fn create_note_with_timestamp(
        &mut self,
        user_id: UserId,
        title: &str,
        content: &str,
        images: &[String],
        checkboxes: &[Checkbox],
        created_at: i64,
    ) -> NoteResult<NoteId> {
        validate_note_fields(title, content)?;

        let tx = self.conn.transaction()?;

        let inserted = tx
            .execute(
                "INSERT INTO notes (title, content, created_at, user_id) VALUES (?, ?, ?, ?)",
                params![title, content, created_at, user_id],
            )
            .map_err(|e| {
                if is_constraint(&e, ffi::SQLITE_CONSTRAINT_FOREIGNKEY) {
                    NoteError::not_found(format!("user {}", user_id))
                } else {
                    NoteError::Database(e)
                }
            })?;

        if inserted == 0 {
            tracing::warn!("Failed adding note for user {}", user_id);
            return Err(NoteError::write_failed(format!("insert note for user {}", user_id)));
        }

        let note_id = NoteId(tx.last_insert_rowid());

        if !images.is_empty() {
            insert_children::<Images>(&tx, note_id, images)?;
        }
        if !checkboxes.is_empty() {
            insert_children::<Checkboxes>(&tx, note_id, checkboxes)?;
        }

        tx.commit()?;

        tracing::debug!("Created note {} for user {}", note_id, user_id);
        Ok(note_id)
    }

    /// Edit a note, stamping it with the current time.
    ///
    /// `None` leaves a child collection untouched; `Some` replaces it, and
    /// an empty slice clears it.
    pub fn update_note(
        &mut self,
        note_id: NoteId,
        title: &str,
        content: &str,
        images: Option<&[String]>,
        checkboxes: Option<&[Checkbox]>,
    ) -> NoteResult<()> {
        self.update_note_with_timestamp(note_id, title, content, images, checkboxes, now_millis())
    }

    /// Edit a note with a specific `created_at` (Unix millis)
    pub fn update_note_with_timestamp(
        &mut self,
        note_id: NoteId,
        title: &str,
        content: &str,
        images: Option<&[String]>,
        checkboxes: Option<&[Checkbox]>,
        created_at: i64,
    ) -> NoteResult<()> {
        validate_note_fields(title, content)?;

        let tx = self.conn.transaction()?;

        let updated = tx.execute(
            "UPDATE notes SET title = ?, content = ?, created_at = ? WHERE id = ?",
            params![title, content, created_at, note_id],
        )?;

        if updated == 0 {
            tracing::warn!("Failed updating note {}: no such note", note_id);
            return Err(NoteError::not_found(format!("note {}", note_id)));
        }

        if let Some(images) = images {
            replace_children::<Images>(&tx, note_id, images)?;
        }
        if let Some(checkboxes) = checkboxes {
            replace_children::<Checkboxes>(&tx, note_id, checkboxes)?;
        }

        tx.commit()?;

        tracing::debug!("Updated note {}", note_id);
        Ok(())
    }

    /// Delete a note. Its images and checkboxes go with it through the
    /// foreign-key cascade.
    pub fn delete_note(&self, note_id: NoteId) -> NoteResult<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?", params![note_id])?;

        if deleted == 0 {
            tracing::warn!("Failed removing note {}: no such note", note_id);
            return Err(NoteError::write_failed(format!("delete note {}: no such note", note_id)));
        }

        tracing::debug!("Deleted note {}", note_id);
        Ok(())
    }

    /// Get a note by id
    pub fn get_note(&self, note_id: NoteId) -> NoteResult<Option<Note>> {
        let note = self
            .conn
            .query_row(
                &format!("SELECT {} FROM notes WHERE id = ?", NOTE_COLUMNS),
                params![note_id],
                |row| self.row_to_note(row),
            )
            .optional()?;
        Ok(note)
    }

    /// Get a note with its images and checkboxes
    pub fn get_note_detail(&self, note_id: NoteId) -> NoteResult<Option<NoteDetail>> {
        let note = match self.get_note(note_id)? {
            Some(note) => note,
            None => return Ok(None),
        };

        Ok(Some(NoteDetail {
            images: self.get_images_for_note(note_id)?,
            checkboxes: self.get_checkboxes_for_note(note_id)?,
            note,
        }))
    }

    /// All notes of a user, most recently saved first.
    ///
    /// An absent user id yields an empty list.
    pub fn list_notes_by_user(&self, user_id: impl Into<Option<UserId>>) -> NoteResult<Vec<Note>> {
        let user_id = match user_id.into() {
            Some(id) => id,
            None => return Ok(Vec::new()),
        };

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM notes WHERE user_id = ? ORDER BY created_at DESC, id DESC",
            NOTE_COLUMNS
        ))?;

        let notes = stmt
            .query_map(params![user_id], |row| self.row_to_note(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(notes)
    }

    // ========================================================================
    // Child lookups
    // ========================================================================

    /// Image URIs of a note, in insertion order
    pub fn get_images_for_note(&self, note_id: NoteId) -> NoteResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT image_uri FROM image WHERE note_id = ? ORDER BY id")?;

        let images = stmt
            .query_map(params![note_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(images)
    }

    /// Checkboxes of a note, in insertion order
    pub fn get_checkboxes_for_note(&self, note_id: NoteId) -> NoteResult<Vec<Checkbox>> {
        let mut stmt = self.conn.prepare(
            "SELECT checked, textCheckbox FROM checkbox WHERE note_id = ? ORDER BY id",
        )?;

        let rows = stmt.query_map(params![note_id], |row| {
            Ok(Checkbox {
                checked: row.get::<_, i64>(0)? != 0,
                text: row.get(1)?,
            })
        })?;

        let mut checkboxes = Vec::new();
        for checkbox in rows {
            checkboxes.push(checkbox?);
        }
        Ok(checkboxes)
    }

    /// Close the database connection
    pub fn close(self) -> NoteResult<()> {
        self.conn
            .close()
            .map_err(|(_, e)| NoteError::Database(e))
    }

    pub(crate) fn row_to_note(&self, row: &Row) -> rusqlite::Result<Note> {
        Ok(Note {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            created_at: row.get(3)?,
            user_id: row.get(4)?,
        })
    }

    fn row_to_user(&self, row: &Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            password_digest: row.get(2)?,
        })
    }
}
