//! Note database operations (create, fetch, list, edit, delete, pin)

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Result as SqliteResult};

use super::super::Database;
use crate::models::{Note, NoteOrder};

const NOTE_COLUMNS: &str =
    "id, title, slug, content, author, draft, pinned, views, created_at, updated_at";

impl Database {
    /// Create a note with a fresh id, unique slug, and timestamps
    pub fn create_note(
        &self,
        title: &str,
        content: &str,
        author: Option<&str>,
        draft: bool,
    ) -> SqliteResult<Note> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();
        let now_str = now.to_rfc3339();
        let slug = unique_slug(&conn, title)?;

        conn.execute(
            "INSERT INTO notes (title, slug, content, author, draft, pinned, views, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, ?6, ?6)",
            rusqlite::params![title, slug, content, author, draft as i64, &now_str],
        )?;

        let id = conn.last_insert_rowid();

        Ok(Note {
            id,
            title: title.to_string(),
            slug,
            content: content.to_string(),
            author: author.map(|s| s.to_string()),
            draft,
            pinned: false,
            views: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a note by id
    pub fn get_note(&self, id: i64) -> SqliteResult<Option<Note>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS),
            [id],
            row_to_note,
        )
        .optional()
    }

    /// Get a note by id, counting the fetch as a view
    pub fn get_note_counting_view(&self, id: i64) -> SqliteResult<Option<Note>> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute("UPDATE notes SET views = views + 1 WHERE id = ?1", [id])?;
        if updated == 0 {
            return Ok(None);
        }
        conn.query_row(
            &format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS),
            [id],
            row_to_note,
        )
        .optional()
    }

    /// List notes, pinned first. Drafts are excluded unless requested.
    pub fn list_notes(&self, order: NoteOrder, include_drafts: bool) -> SqliteResult<Vec<Note>> {
        let conn = self.conn.lock().unwrap();

        let sql = if include_drafts {
            format!(
                "SELECT {} FROM notes ORDER BY {}",
                NOTE_COLUMNS,
                order.sql_clause()
            )
        } else {
            format!(
                "SELECT {} FROM notes WHERE draft = 0 ORDER BY {}",
                NOTE_COLUMNS,
                order.sql_clause()
            )
        };

        let mut stmt = conn.prepare(&sql)?;
        let notes = stmt
            .query_map([], row_to_note)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(notes)
    }

    /// Edit a note. Absent fields keep their current value.
    /// Returns Ok(None) if the id does not exist.
    pub fn update_note(
        &self,
        id: i64,
        title: Option<&str>,
        content: Option<&str>,
        draft: Option<bool>,
    ) -> SqliteResult<Option<Note>> {
        let conn = self.conn.lock().unwrap();

        let existing = conn
            .query_row(
                &format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS),
                [id],
                row_to_note,
            )
            .optional()?;

        let existing = match existing {
            Some(note) => note,
            None => return Ok(None),
        };

        // An edit with no fields is a no-op; the modification timestamp
        // only moves when something actually changed.
        if title.is_none() && content.is_none() && draft.is_none() {
            return Ok(Some(existing));
        }

        let new_title = title
            .map(|s| s.to_string())
            .unwrap_or_else(|| existing.title.clone());
        let new_content = content
            .map(|s| s.to_string())
            .unwrap_or_else(|| existing.content.clone());
        let new_draft = draft.unwrap_or(existing.draft);
        let now = Utc::now();

        conn.execute(
            "UPDATE notes SET title = ?1, content = ?2, draft = ?3, updated_at = ?4 WHERE id = ?5",
            rusqlite::params![&new_title, &new_content, new_draft as i64, now.to_rfc3339(), id],
        )?;

        Ok(Some(Note {
            title: new_title,
            content: new_content,
            draft: new_draft,
            updated_at: now,
            ..existing
        }))
    }

    /// Delete a note permanently. Returns false if the id does not exist.
    pub fn delete_note(&self, id: i64) -> SqliteResult<bool> {
        let conn = self.conn.lock().unwrap();
        let rows_affected = conn.execute("DELETE FROM notes WHERE id = ?1", [id])?;
        Ok(rows_affected > 0)
    }

    /// Pin or unpin a note. Returns the new pin state, or None if the id does not exist.
    pub fn toggle_note_pin(&self, id: i64) -> SqliteResult<Option<bool>> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE notes SET pinned = 1 - pinned WHERE id = ?1",
            [id],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        conn.query_row("SELECT pinned FROM notes WHERE id = ?1", [id], |row| {
            row.get::<_, i64>(0).map(|p| p != 0)
        })
        .optional()
    }
}

/// Derive a URL-friendly slug from the title, suffixing with a counter
/// until it is unique in the notes table.
fn unique_slug(conn: &Connection, title: &str) -> SqliteResult<String> {
    let base = slugify(title);
    let base = if base.is_empty() {
        "note".to_string()
    } else {
        base
    };

    let mut candidate = base.clone();
    let mut n = 2;
    loop {
        let taken: bool = conn
            .query_row(
                "SELECT COUNT(*) FROM notes WHERE slug = ?1",
                [&candidate],
                |row| row.get::<_, i64>(0),
            )
            .map(|c| c > 0)?;
        if !taken {
            return Ok(candidate);
        }
        candidate = format!("{}-{}", base, n);
        n += 1;
    }
}

fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<&str>>()
        .join("-")
}

fn row_to_note(row: &rusqlite::Row) -> rusqlite::Result<Note> {
    let draft: i64 = row.get(5)?;
    let pinned: i64 = row.get(6)?;
    let created_at_str: String = row.get(8)?;
    let updated_at_str: String = row.get(9)?;

    Ok(Note {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        content: row.get(3)?,
        author: row.get(4)?,
        draft: draft != 0,
        pinned: pinned != 0,
        views: row.get(7)?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .unwrap()
            .with_timezone(&Utc),
        updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
            .unwrap()
            .with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_db() -> (tempfile::TempDir, Database) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).expect("Failed to open database");
        (dir, db)
    }

    #[test]
    fn test_create_and_get_roundtrip() {
        let (_dir, db) = test_db();

        let note = db
            .create_note("Rust Notes", "# Ownership\n\nMove semantics.", Some("alice"), false)
            .expect("Failed to create note");

        assert_eq!(note.slug, "rust-notes");
        assert_eq!(note.views, 0);

        let fetched = db
            .get_note(note.id)
            .expect("Failed to get note")
            .expect("Note should exist");
        assert_eq!(fetched.content, "# Ownership\n\nMove semantics.");
        assert_eq!(fetched.author.as_deref(), Some("alice"));
        assert_eq!(fetched.created_at, note.created_at);
    }

    #[test]
    fn test_get_counting_view_increments() {
        let (_dir, db) = test_db();

        let note = db
            .create_note("Viewed", "content", None, false)
            .expect("Failed to create note");

        let first = db
            .get_note_counting_view(note.id)
            .expect("Failed to get note")
            .expect("Note should exist");
        let second = db
            .get_note_counting_view(note.id)
            .expect("Failed to get note")
            .expect("Note should exist");

        assert_eq!(first.views, 1);
        assert_eq!(second.views, 2);
    }

    #[test]
    fn test_update_changes_only_targeted_fields() {
        let (_dir, db) = test_db();

        let note = db
            .create_note("Original Title", "Original content.", None, false)
            .expect("Failed to create note");

        std::thread::sleep(std::time::Duration::from_millis(5));

        let updated = db
            .update_note(note.id, None, Some("New content."), None)
            .expect("Failed to update note")
            .expect("Note should exist");

        assert_eq!(updated.id, note.id);
        assert_eq!(updated.title, "Original Title");
        assert_eq!(updated.slug, note.slug);
        assert_eq!(updated.content, "New content.");
        assert_eq!(updated.created_at, note.created_at);
        assert!(updated.updated_at > note.updated_at);
    }

    #[test]
    fn test_empty_update_is_noop() {
        let (_dir, db) = test_db();

        let note = db
            .create_note("Untouched", "Same content.", None, false)
            .expect("Failed to create note");

        std::thread::sleep(std::time::Duration::from_millis(5));

        let result = db
            .update_note(note.id, None, None, None)
            .expect("Failed to update note")
            .expect("Note should exist");

        assert_eq!(result.content, "Same content.");
        assert_eq!(result.updated_at, note.updated_at);

        let fetched = db
            .get_note(note.id)
            .expect("Failed to get note")
            .expect("Note should exist");
        assert_eq!(fetched.updated_at, note.updated_at);
    }

    #[test]
    fn test_update_missing_note_returns_none() {
        let (_dir, db) = test_db();

        let result = db
            .update_note(999, None, Some("content"), None)
            .expect("Update should not error");
        assert!(result.is_none());
    }

    #[test]
    fn test_delete_removes_note() {
        let (_dir, db) = test_db();

        let note = db
            .create_note("Doomed", "bye", None, false)
            .expect("Failed to create note");

        assert!(db.delete_note(note.id).expect("Failed to delete note"));
        assert!(db
            .get_note(note.id)
            .expect("Failed to get note")
            .is_none());

        // Second delete reports missing
        assert!(!db.delete_note(note.id).expect("Delete should not error"));
    }

    #[test]
    fn test_slug_dedupe() {
        let (_dir, db) = test_db();

        let a = db
            .create_note("Same Title", "a", None, false)
            .expect("Failed to create note");
        let b = db
            .create_note("Same Title", "b", None, false)
            .expect("Failed to create note");
        let c = db
            .create_note("Same Title", "c", None, false)
            .expect("Failed to create note");

        assert_eq!(a.slug, "same-title");
        assert_eq!(b.slug, "same-title-2");
        assert_eq!(c.slug, "same-title-3");
    }

    #[test]
    fn test_list_excludes_drafts_by_default() {
        let (_dir, db) = test_db();

        db.create_note("Published", "p", None, false)
            .expect("Failed to create note");
        db.create_note("Draft", "d", None, true)
            .expect("Failed to create note");

        let public = db
            .list_notes(NoteOrder::Created, false)
            .expect("Failed to list notes");
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].title, "Published");

        let all = db
            .list_notes(NoteOrder::Created, true)
            .expect("Failed to list notes");
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_list_views_order_most_viewed_first() {
        let (_dir, db) = test_db();

        let alpha = db
            .create_note("Alpha", "a", None, false)
            .expect("Failed to create note");
        let beta = db
            .create_note("Beta", "b", None, false)
            .expect("Failed to create note");

        db.get_note_counting_view(alpha.id)
            .expect("Failed to get note");
        db.get_note_counting_view(beta.id)
            .expect("Failed to get note");
        db.get_note_counting_view(beta.id)
            .expect("Failed to get note");

        let notes = db
            .list_notes(NoteOrder::Views, false)
            .expect("Failed to list notes");
        assert_eq!(notes[0].title, "Beta");
        assert_eq!(notes[0].views, 2);
        assert_eq!(notes[1].title, "Alpha");
        assert_eq!(notes[1].views, 1);
    }

    #[test]
    fn test_list_pinned_first() {
        let (_dir, db) = test_db();

        db.create_note("Plain", "a", None, false)
            .expect("Failed to create note");
        let pinned = db
            .create_note("Important", "b", None, false)
            .expect("Failed to create note");

        let state = db
            .toggle_note_pin(pinned.id)
            .expect("Failed to toggle pin")
            .expect("Note should exist");
        assert!(state);

        let notes = db
            .list_notes(NoteOrder::Title, false)
            .expect("Failed to list notes");
        assert_eq!(notes[0].title, "Important");

        // Toggle back off
        let state = db
            .toggle_note_pin(pinned.id)
            .expect("Failed to toggle pin")
            .expect("Note should exist");
        assert!(!state);
    }
}
