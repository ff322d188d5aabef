//! Title search for notecore.
//!
//! Search is a substring match on the note title through SQLite `LIKE`, so
//! ASCII letters match case-insensitively and everything else matches
//! exactly. `%`, `_` and `\` typed by the user are matched literally.

use rusqlite::params;

use crate::database::{Database, NOTE_COLUMNS};
use crate::error::NoteResult;
use crate::models::{Note, UserId};
use crate::validation::validate_search_query;

const LIKE_ESCAPE: char = '\\';

/// Build a `LIKE` pattern matching titles that contain `substring`.
pub fn title_pattern(substring: &str) -> String {
    let mut pattern = String::with_capacity(substring.len() + 2);
    pattern.push('%');
    for c in substring.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl Database {
    /// Notes of a user whose title contains `substring`, most recently saved first.
    ///
    /// An empty substring matches every note of the user. An absent user id
    /// yields an empty list.
    pub fn search_notes_by_title(
        &self,
        user_id: impl Into<Option<UserId>>,
        substring: &str,
    ) -> NoteResult<Vec<Note>> {
        validate_search_query(substring)?;

        let user_id = match user_id.into() {
            Some(id) => id,
            None => return Ok(Vec::new()),
        };

        let mut stmt = self.connection().prepare(&format!(
            r#"
            SELECT {}
            FROM notes
            WHERE user_id = ? AND title LIKE ? ESCAPE '\'
            ORDER BY created_at DESC, id DESC
            "#,
            NOTE_COLUMNS
        ))?;

        let notes = stmt
            .query_map(params![user_id, title_pattern(substring)], |row| {
                self.row_to_note(row)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "Title search {:?} for user {} matched {} notes",
            substring,
            user_id,
            notes.len()
        );
        Ok(notes)
    }
}
