//! Child collections of a note (images and checkboxes).
//!
//! Both kinds follow the same two-step discipline:
//! - insert path: one row per item, in order, used on create
//! - replace path: delete every row of the note, then the insert path, used on edit
//!
//! There is no diffing. Child rowids are not preserved across a replace.
//! Callers pass the open transaction so delete and reinsert commit together.

use rusqlite::{params, Connection};

use crate::error::{NoteError, NoteResult};
use crate::models::{Checkbox, NoteId};

/// A kind of row owned by a note.
pub(crate) trait ChildKind {
    /// Table holding the rows; must have a `note_id` column
    const TABLE: &'static str;

    type Item;

    fn insert_one(conn: &Connection, note_id: NoteId, item: &Self::Item) -> NoteResult<usize>;
}

/// Image attachments, stored by URI
pub(crate) struct Images;

impl ChildKind for Images {
    const TABLE: &'static str = "image";

    type Item = String;

    fn insert_one(conn: &Connection, note_id: NoteId, image_uri: &String) -> NoteResult<usize> {
        Ok(conn.execute(
            "INSERT INTO image (note_id, image_uri) VALUES (?, ?)",
            params![note_id, image_uri],
        )?)
    }
}

/// Checklist items
pub(crate) struct Checkboxes;

impl ChildKind for Checkboxes {
    const TABLE: &'static str = "checkbox";

    type Item = Checkbox;

    fn insert_one(conn: &Connection, note_id: NoteId, item: &Checkbox) -> NoteResult<usize> {
        Ok(conn.execute(
            "INSERT INTO checkbox (note_id, checked, textCheckbox) VALUES (?, ?, ?)",
            params![note_id, item.checked, item.text],
        )?)
    }
}

/// Insert every item as a new row of `note_id`. Returns the number of rows written.
pub(crate) fn insert_children<K: ChildKind>(
    conn: &Connection,
    note_id: NoteId,
    items: &[K::Item],
) -> NoteResult<usize> {
    for item in items {
        if K::insert_one(conn, note_id, item)? == 0 {
            tracing::warn!("Failed inserting {} row for note {}", K::TABLE, note_id);
            return Err(NoteError::write_failed(format!(
                "insert into {} for note {}",
                K::TABLE,
                note_id
            )));
        }
    }

    tracing::debug!("Inserted {} {} rows for note {}", items.len(), K::TABLE, note_id);
    Ok(items.len())
}

/// Replace all rows of `note_id` with `items`.
///
/// The insert path runs whether the delete removed rows or not, so an empty
/// `items` leaves the note with no rows of this kind.
pub(crate) fn replace_children<K: ChildKind>(
    conn: &Connection,
    note_id: NoteId,
    items: &[K::Item],
) -> NoteResult<usize> {
    let removed = conn.execute(
        &format!("DELETE FROM {} WHERE note_id = ?", K::TABLE),
        params![note_id],
    )?;
    tracing::debug!("Removed {} {} rows for note {}", removed, K::TABLE, note_id);

    insert_children::<K>(conn, note_id, items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    fn setup() -> (Database, NoteId) {
        let mut db = Database::new_in_memory().unwrap();
        let user_id = db.create_user("alice", "digest").unwrap();
        let note_id = db
            .create_note(user_id, "Title", "Body", &[], &[])
            .unwrap();
        (db, note_id)
    }

    fn image_rowids(db: &Database, note_id: NoteId) -> Vec<i64> {
        let mut stmt = db
            .connection()
            .prepare("SELECT id FROM image WHERE note_id = ? ORDER BY id")
            .unwrap();
        let rows = stmt
            .query_map([note_id], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<i64>, _>>()
            .unwrap();
        rows
    }

    #[test]
    fn test_insert_children_keeps_order() {
        let (db, note_id) = setup();
        let images = vec!["file:///b.png".to_string(), "file:///a.png".to_string()];

        let written = insert_children::<Images>(db.connection(), note_id, &images).unwrap();
        assert_eq!(written, 2);
        assert_eq!(db.get_images_for_note(note_id).unwrap(), images);
    }

    #[test]
    fn test_replace_children_is_full_replace() {
        let (db, note_id) = setup();
        let old = vec!["file:///old1.png".to_string(), "file:///old2.png".to_string()];
        insert_children::<Images>(db.connection(), note_id, &old).unwrap();
        let old_ids = image_rowids(&db, note_id);

        let new = vec!["file:///new.png".to_string()];
        replace_children::<Images>(db.connection(), note_id, &new).unwrap();

        assert_eq!(db.get_images_for_note(note_id).unwrap(), new);
        let new_ids = image_rowids(&db, note_id);
        assert!(new_ids.iter().all(|id| !old_ids.contains(id)));
    }

    #[test]
    fn test_replace_children_on_empty_collection_inserts() {
        let (db, note_id) = setup();
        let items = vec![Checkbox::new("task1", true), Checkbox::new("task2", false)];

        let written = replace_children::<Checkboxes>(db.connection(), note_id, &items).unwrap();
        assert_eq!(written, 2);
        assert_eq!(db.get_checkboxes_for_note(note_id).unwrap(), items);
    }

    #[test]
    fn test_replace_children_with_empty_clears() {
        let (db, note_id) = setup();
        insert_children::<Checkboxes>(db.connection(), note_id, &[Checkbox::new("task1", false)])
            .unwrap();

        let written = replace_children::<Checkboxes>(db.connection(), note_id, &[]).unwrap();
        assert_eq!(written, 0);
        assert!(db.get_checkboxes_for_note(note_id).unwrap().is_empty());
    }

    #[test]
    fn test_insert_for_missing_note_is_rejected() {
        let (db, _) = setup();
        let result = insert_children::<Images>(
            db.connection(),
            NoteId(9999),
            &["file:///x.png".to_string()],
        );
        assert!(matches!(result, Err(NoteError::Database(_))));
    }
}
