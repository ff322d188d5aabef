//! Async entry point used by the UI layer.
//!
//! `NoteStore` owns the one database handle of the process and hands each
//! call to a blocking worker thread, so callers on an async runtime never
//! block on SQLite. Every call completes (or fails) before its future
//! resolves; callers sequence dependent steps by awaiting.

use std::sync::{Arc, Mutex};

use crate::auth::{self, PasswordHasher, RegistrationForm, Sha256Hasher};
use crate::config::Config;
use crate::database::Database;
use crate::error::{NoteError, NoteResult};
use crate::models::{Checkbox, Note, NoteDetail, NoteId, User, UserId};
use crate::validation::DEFAULT_MIN_PASSWORD_LENGTH;

/// Shared handle to the note database
#[derive(Clone)]
pub struct NoteStore {
    db: Arc<Mutex<Database>>,
    hasher: Arc<dyn PasswordHasher>,
    min_password_length: usize,
}

impl NoteStore {
    /// Wrap an open database, using the SHA-256 hasher
    pub fn new(db: Database) -> Self {
        Self::with_hasher(db, Arc::new(Sha256Hasher))
    }

    /// Wrap an open database with a custom password hasher
    pub fn with_hasher(db: Database, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            hasher,
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }

    /// Open the configured database file
    pub async fn open(config: &Config) -> NoteResult<Self> {
        let path = config.database_file().to_string();
        let busy_timeout_ms = config.busy_timeout_ms();

        let db = tokio::task::spawn_blocking(move || Database::open(&path, busy_timeout_ms))
            .await
            .map_err(|e| NoteError::database_op(format!("open task failed: {}", e)))??;

        let mut store = Self::new(db);
        store.min_password_length = config.min_password_length();
        Ok(store)
    }

    /// In-memory store (for testing)
    pub fn in_memory() -> NoteResult<Self> {
        Ok(Self::new(Database::new_in_memory()?))
    }

    /// Override the minimum password length enforced at registration
    pub fn set_min_password_length(&mut self, length: usize) {
        self.min_password_length = length;
    }

    async fn run<T, F>(&self, op: &'static str, f: F) -> NoteResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> NoteResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let result = tokio::task::spawn_blocking(move || {
            let mut guard = db
                .lock()
                .map_err(|_| NoteError::database_op("database lock poisoned"))?;
            f(&mut *guard)
        })
        .await
        .map_err(|e| NoteError::database_op(format!("{} task failed: {}", op, e)))?;

        if let Err(e) = &result {
            if e.is_recoverable() {
                tracing::debug!("{} rejected: {}", op, e);
            } else {
                tracing::error!("{} failed: {}", op, e);
            }
        }
        result
    }

    /// Create the schema if needed. The constructors already do this.
    pub async fn provision_schema(&self) -> NoteResult<()> {
        self.run("provision_schema", |db| db.provision_schema()).await
    }

    // ========================================================================
    // Credentials
    // ========================================================================

    pub async fn register_user(&self, form: RegistrationForm) -> NoteResult<User> {
        let hasher = Arc::clone(&self.hasher);
        let min_len = self.min_password_length;
        self.run("register_user", move |db| {
            auth::register_user(db, hasher.as_ref(), &form, min_len)
        })
        .await
    }

    pub async fn authenticate_user(&self, username: &str, password: &str) -> NoteResult<User> {
        let hasher = Arc::clone(&self.hasher);
        let username = username.to_string();
        let password = password.to_string();
        self.run("authenticate_user", move |db| {
            auth::authenticate_user(db, hasher.as_ref(), &username, &password)
        })
        .await
    }

    // ========================================================================
    // Notes
    // ========================================================================

    pub async fn create_note(
        &self,
        user_id: UserId,
        title: &str,
        content: &str,
        images: Vec<String>,
        checkboxes: Vec<Checkbox>,
    ) -> NoteResult<NoteId> {
        let title = title.to_string();
        let content = content.to_string();
        self.run("create_note", move |db| {
            db.create_note(user_id, &title, &content, &images, &checkboxes)
        })
        .await
    }

    /// Edit a note. `None` keeps a child collection, `Some` replaces it.
    pub async fn update_note(
        &self,
        note_id: NoteId,
        title: &str,
        content: &str,
        images: Option<Vec<String>>,
        checkboxes: Option<Vec<Checkbox>>,
    ) -> NoteResult<()> {
        let title = title.to_string();
        let content = content.to_string();
        self.run("update_note", move |db| {
            db.update_note(
                note_id,
                &title,
                &content,
                images.as_deref(),
                checkboxes.as_deref(),
            )
        })
        .await
    }

    pub async fn delete_note(&self, note_id: NoteId) -> NoteResult<()> {
        self.run("delete_note", move |db| db.delete_note(note_id)).await
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn get_note(&self, note_id: NoteId) -> NoteResult<Option<Note>> {
        self.run("get_note", move |db| db.get_note(note_id)).await
    }

    pub async fn get_note_detail(&self, note_id: NoteId) -> NoteResult<Option<NoteDetail>> {
        self.run("get_note_detail", move |db| db.get_note_detail(note_id))
            .await
    }

    pub async fn list_notes_by_user(
        &self,
        user_id: impl Into<Option<UserId>>,
    ) -> NoteResult<Vec<Note>> {
        let user_id = user_id.into();
        self.run("list_notes_by_user", move |db| db.list_notes_by_user(user_id))
            .await
    }

    pub async fn search_notes_by_title(
        &self,
        user_id: impl Into<Option<UserId>>,
        substring: &str,
    ) -> NoteResult<Vec<Note>> {
        let user_id = user_id.into();
        let substring = substring.to_string();
        self.run("search_notes_by_title", move |db| {
            db.search_notes_by_title(user_id, &substring)
        })
        .await
    }

    pub async fn get_images_for_note(&self, note_id: NoteId) -> NoteResult<Vec<String>> {
        self.run("get_images_for_note", move |db| db.get_images_for_note(note_id))
            .await
    }

    pub async fn get_checkboxes_for_note(&self, note_id: NoteId) -> NoteResult<Vec<Checkbox>> {
        self.run("get_checkboxes_for_note", move |db| {
            db.get_checkboxes_for_note(note_id)
        })
        .await
    }
}
