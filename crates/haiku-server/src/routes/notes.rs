//! Note routes.
//!
//! All notes are addressed through their owner's path:
//! - GET /user/{user}/notes - Note ids in display order
//! - GET /user/{user}/notes/detail - Full notes in display order
//! - POST /user/{user}/notes - Create a note
//! - GET /user/{user}/note/{note} - Fetch a note
//! - PUT /user/{user}/note/{note} - Replace text and order
//! - DELETE /user/{user}/note/{note} - Delete a note

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use haiku_core::{Note, NoteDetailList, NoteId, NoteList};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extract::{NotePath, StrictJson, UserPath};
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

/// Body of POST /user/{user}/notes and PUT /user/{user}/note/{note}.
///
/// Mirrors [`Note`] so a fetched note can be sent back unchanged; the
/// timestamps are accepted but ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotePayload {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub order: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /user/{user}/notes - List note ids ordered by `order`.
async fn list_notes(
    State(state): State<AppState>,
    UserPath(user_id): UserPath,
) -> ApiResult<Json<NoteList>> {
    let notes = state.store().list_notes(&user_id).await.map_err(|e| {
        tracing::error!(user_id = %user_id, error = %e, "Failed to list notes");
        ApiError::Store(e)
    })?;

    tracing::debug!(user_id = %user_id, count = notes.notes.len(), "Listed notes");
    Ok(Json(notes))
}

/// GET /user/{user}/notes/detail - List full notes ordered by `order`.
async fn list_note_details(
    State(state): State<AppState>,
    UserPath(user_id): UserPath,
) -> ApiResult<Json<NoteDetailList>> {
    let notes = state
        .store()
        .get_note_detail_list(&user_id)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Failed to list note details");
            ApiError::Store(e)
        })?;

    Ok(Json(notes))
}

/// POST /user/{user}/notes - Create a note.
///
/// # Request
///
/// Body: `{ "text": "...", "order": 1.0 }`. The id is assigned by the server.
///
/// # Response
///
/// - 201 Created: the stored `Note`
/// - 400 Bad Request: invalid path, body, or payload carrying an id
/// - 404 Not Found: user does not exist
async fn create_note(
    State(state): State<AppState>,
    UserPath(user_id): UserPath,
    StrictJson(payload): StrictJson<NotePayload>,
) -> ApiResult<(StatusCode, Json<Note>)> {
    if !payload.id.is_empty() {
        return Err(ApiError::BadRequest(
            "Cannot create note with a specific id".to_string(),
        ));
    }

    if payload.text.is_empty() {
        return Err(ApiError::BadRequest(
            "Cannot create note without data".to_string(),
        ));
    }

    let note_id = NoteId::generate()?;

    let note = state
        .store()
        .create_note(&user_id, &note_id, &payload.text, payload.order)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %user_id, note_id = %note_id, error = %e, "Failed to store note");
            ApiError::Store(e)
        })?;

    tracing::info!(user_id = %user_id, note_id = %note.id, "Note created");
    Ok((StatusCode::CREATED, Json(note)))
}

/// GET /user/{user}/note/{note} - Fetch a single note.
async fn get_note(
    State(state): State<AppState>,
    NotePath(user_id, note_id): NotePath,
) -> ApiResult<Json<Note>> {
    let note = state
        .store()
        .get_note(&user_id, &note_id, state.read_scope())
        .await
        .map_err(|e| {
            if !e.is_not_found() {
                tracing::error!(user_id = %user_id, note_id = %note_id, error = %e, "Failed to get note");
            }
            ApiError::Store(e)
        })?;

    Ok(Json(note))
}

/// PUT /user/{user}/note/{note} - Replace a note's text and order.
///
/// The payload id must match the path. Only the owner's note is changed.
async fn update_note(
    State(state): State<AppState>,
    NotePath(user_id, note_id): NotePath,
    StrictJson(payload): StrictJson<NotePayload>,
) -> ApiResult<StatusCode> {
    if payload.id != note_id.as_str() {
        return Err(ApiError::BadRequest(
            "payload id does not correspond to endpoint id".to_string(),
        ));
    }

    if payload.text.is_empty() {
        return Err(ApiError::BadRequest(
            "Cannot update note without data".to_string(),
        ));
    }

    state
        .store()
        .update_note(&user_id, &note_id, &payload.text, payload.order)
        .await
        .map_err(|e| {
            if !e.is_not_found() {
                tracing::error!(user_id = %user_id, note_id = %note_id, error = %e, "Failed to update note");
            }
            ApiError::Store(e)
        })?;

    tracing::info!(user_id = %user_id, note_id = %note_id, "Note updated");
    Ok(StatusCode::OK)
}

/// DELETE /user/{user}/note/{note} - Delete a note.
async fn delete_note(
    State(state): State<AppState>,
    NotePath(user_id, note_id): NotePath,
) -> ApiResult<StatusCode> {
    state
        .store()
        .delete_note(&user_id, &note_id)
        .await
        .map_err(|e| {
            if !e.is_not_found() {
                tracing::error!(user_id = %user_id, note_id = %note_id, error = %e, "Failed to delete note");
            }
            ApiError::Store(e)
        })?;

    tracing::info!(user_id = %user_id, note_id = %note_id, "Note deleted");
    Ok(StatusCode::OK)
}

/// Build note routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/{user}/notes", get(list_notes).post(create_note))
        .route("/user/{user}/notes/detail", get(list_note_details))
        .route(
            "/user/{user}/note/{note}",
            get(get_note).put(update_note).delete(delete_note),
        )
}

// ============================================================================
// Tests
// ============================================================================
