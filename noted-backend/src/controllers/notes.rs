//! Notes REST API — CRUD plus rendered display and file download.

use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::markdown;
use crate::models::{
    CreateNoteRequest, NoteOrder, NoteResponse, RenderedNoteResponse, UpdateNoteRequest,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
struct ListNotesQuery {
    order: Option<NoteOrder>,
    include_drafts: Option<bool>,
}

/// List notes, pinned first, drafts excluded unless requested
async fn list_notes(data: web::Data<AppState>, query: web::Query<ListNotesQuery>) -> impl Responder {
    let order = query.order.unwrap_or_default();
    let include_drafts = query.include_drafts.unwrap_or(false);

    match data.db.list_notes(order, include_drafts) {
        Ok(notes) => {
            let items: Vec<NoteResponse> = notes.into_iter().map(NoteResponse::from).collect();
            HttpResponse::Ok().json(items)
        }
        Err(e) => {
            log::error!("Failed to list notes: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

/// Create a note
async fn create_note(
    data: web::Data<AppState>,
    body: web::Json<CreateNoteRequest>,
) -> impl Responder {
    if body.title.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Note title must not be empty"
        }));
    }
    if body.content.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Note content must not be empty"
        }));
    }

    match data.db.create_note(
        body.title.trim(),
        &body.content,
        body.author.as_deref(),
        body.draft,
    ) {
        Ok(note) => {
            log::info!("Created note {} ({})", note.id, note.slug);
            HttpResponse::Created().json(NoteResponse::from(note))
        }
        Err(e) => {
            log::error!("Failed to create note: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

/// Get a note by id (counts as a view)
async fn get_note(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let note_id = path.into_inner();

    match data.db.get_note_counting_view(note_id) {
        Ok(Some(note)) => HttpResponse::Ok().json(NoteResponse::from(note)),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Note not found"
        })),
        Err(e) => {
            log::error!("Failed to get note {}: {}", note_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

/// Edit a note. Absent fields are left untouched.
async fn update_note(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdateNoteRequest>,
) -> impl Responder {
    let note_id = path.into_inner();

    if matches!(body.title.as_deref(), Some(t) if t.trim().is_empty()) {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Note title must not be empty"
        }));
    }
    if matches!(body.content.as_deref(), Some(c) if c.trim().is_empty()) {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Note content must not be empty"
        }));
    }

    match data.db.update_note(
        note_id,
        body.title.as_deref().map(str::trim),
        body.content.as_deref(),
        body.draft,
    ) {
        Ok(Some(note)) => HttpResponse::Ok().json(NoteResponse::from(note)),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Note not found"
        })),
        Err(e) => {
            log::error!("Failed to update note {}: {}", note_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

/// Delete a note permanently
async fn delete_note(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let note_id = path.into_inner();

    match data.db.delete_note(note_id) {
        Ok(true) => {
            log::info!("Deleted note {}", note_id);
            HttpResponse::Ok().json(serde_json::json!({
                "deleted": note_id
            }))
        }
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Note not found"
        })),
        Err(e) => {
            log::error!("Failed to delete note {}: {}", note_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

/// Render a note's Markdown content to HTML for display
async fn render_note(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let note_id = path.into_inner();

    match data.db.get_note(note_id) {
        Ok(Some(note)) => HttpResponse::Ok().json(RenderedNoteResponse {
            id: note.id,
            html: markdown::render(&note.content),
            title: note.title,
            slug: note.slug,
            updated_at: note.updated_at,
        }),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Note not found"
        })),
        Err(e) => {
            log::error!("Failed to render note {}: {}", note_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

/// Download a note as a Markdown file attachment
async fn download_note(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let note_id = path.into_inner();

    match data.db.get_note(note_id) {
        Ok(Some(note)) => HttpResponse::Ok()
            .content_type("text/markdown; charset=utf-8")
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}.md\"", note.slug),
            ))
            .body(note.content),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Note not found"
        })),
        Err(e) => {
            log::error!("Failed to download note {}: {}", note_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

/// Pin or unpin a note
async fn pin_note(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let note_id = path.into_inner();

    match data.db.toggle_note_pin(note_id) {
        Ok(Some(pinned)) => HttpResponse::Ok().json(serde_json::json!({
            "id": note_id,
            "pinned": pinned
        })),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Note not found"
        })),
        Err(e) => {
            log::error!("Failed to toggle pin on note {}: {}", note_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/notes")
            .route("", web::get().to(list_notes))
            .route("", web::post().to(create_note))
            .route("/{id}", web::get().to(get_note))
            .route("/{id}", web::put().to(update_note))
            .route("/{id}", web::delete().to(delete_note))
            .route("/{id}/render", web::get().to(render_note))
            .route("/{id}/download", web::get().to(download_note))
            .route("/{id}/pin", web::post().to(pin_note)),
    );
}
