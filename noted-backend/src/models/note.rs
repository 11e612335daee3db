use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Note - a user-authored, Markdown-formatted text record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub author: Option<String>,
    pub draft: bool,
    pub pinned: bool,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing order for notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteOrder {
    /// Newest first by creation time (default)
    Created,
    /// Most viewed first
    Views,
    /// Alphabetical by title
    Title,
}

impl Default for NoteOrder {
    fn default() -> Self {
        NoteOrder::Created
    }
}

impl NoteOrder {
    /// ORDER BY clause for this ordering. Pinned notes always sort first.
    pub fn sql_clause(&self) -> &'static str {
        match self {
            NoteOrder::Created => "pinned DESC, created_at DESC",
            NoteOrder::Views => "pinned DESC, views DESC, created_at DESC",
            NoteOrder::Title => "pinned DESC, title COLLATE NOCASE ASC",
        }
    }
}

/// Request to create a note
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    pub author: Option<String>,
    #[serde(default)]
    pub draft: bool,
}

/// Request to edit a note. Absent fields are left untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub draft: Option<bool>,
}

/// Note response for API
#[derive(Debug, Clone, Serialize)]
pub struct NoteResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub author: Option<String>,
    pub draft: bool,
    pub pinned: bool,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        NoteResponse {
            id: note.id,
            title: note.title,
            slug: note.slug,
            content: note.content,
            author: note.author,
            draft: note.draft,
            pinned: note.pinned,
            views: note.views,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

/// Rendered note response (Markdown converted to HTML)
#[derive(Debug, Clone, Serialize)]
pub struct RenderedNoteResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub html: String,
    pub updated_at: DateTime<Utc>,
}
