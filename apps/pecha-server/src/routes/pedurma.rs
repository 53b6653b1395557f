//! Pedurma proofreading API routes
//!
//! - `GET  /:pecha_id/texts/:text_id` assembled text of a work
//! - `POST /save` persist an edited text
//! - `GET  /:text_id/notes` replays the latest stored note-edit submission for a
//!   text (edits are recorded by the POST below, not derived from the text)
//! - `POST /:text_id/notes` reconcile pagination against submitted note edits
//! - `GET  /:task_name/completed` texts completed for a task
//! - `POST /:task_name/completed?text_id=` mark a text completed
//!
//! The first path segment is shared by all parameterised routes, so every
//! route names it `:id`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::{NoteEditRepository, TaskRepository};
use crate::error::{AppError, Result};
use crate::pedurma::{update_text_pagination, PedurmaNoteEdit, VolumeUpdate};
use crate::state::AppState;
use crate::text::{self, Text};

/// Create the pedurma router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/save", post(save_text))
        .route("/preview", post(preview_page))
        .route("/:id/texts/:text_id", get(read_text))
        .route("/:id/notes", get(get_text_notes).post(update_text_notes))
        .route("/:id/completed", get(get_completed_texts).post(mark_text_completed))
}

#[derive(Debug, Deserialize)]
pub struct CompletedQuery {
    pub text_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Assemble the text of a work
async fn read_text(
    State(state): State<AppState>,
    Path((pecha_id, text_id)): Path<(String, String)>,
) -> Result<Json<Text>> {
    let text = text::get_text(state.store(), &pecha_id, &text_id).await?;
    Ok(Json(text))
}

/// Persist an edited text, one object per volume
async fn save_text(State(state): State<AppState>, Json(text): Json<Text>) -> Result<Json<String>> {
    let volumes = text::serialize_volumes(&text)?;
    for (vol, content) in &volumes {
        state.store().save_text(&text.id, *vol, content).await?;
    }

    tracing::info!(text_id = %text.id, volumes = volumes.len(), "Saved text");
    Ok(Json(format!("Text {} saved!", text.id)))
}

async fn preview_page() -> Result<Json<()>> {
    Err(AppError::NotImplemented("Pedurma preview is not available".to_string()))
}

/// Latest stored note-edit submission for a text, `[]` when none was made
async fn get_text_notes(
    State(state): State<AppState>,
    Path(text_id): Path<String>,
) -> Result<Json<Vec<PedurmaNoteEdit>>> {
    let repo = NoteEditRepository::new(state.db());
    Ok(Json(repo.latest(&text_id).await?))
}

/// Link body pages to durchen pages and record the submission
async fn update_text_notes(
    State(state): State<AppState>,
    Path(text_id): Path<String>,
    Json(edits): Json<Vec<PedurmaNoteEdit>>,
) -> Result<Json<Vec<VolumeUpdate>>> {
    let pecha_id = &state.config().pedurma.pecha_id;
    let updates = update_text_pagination(state.store(), pecha_id, &text_id, &edits).await?;

    NoteEditRepository::new(state.db())
        .record(&text_id, &edits)
        .await?;

    Ok(Json(updates))
}

async fn mark_text_completed(
    State(state): State<AppState>,
    Path(task_name): Path<String>,
    Query(query): Query<CompletedQuery>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    TaskRepository::new(state.db())
        .mark_completed(&task_name, &query.text_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Task marked as completed!".to_string(),
        }),
    ))
}

async fn get_completed_texts(
    State(state): State<AppState>,
    Path(task_name): Path<String>,
) -> Result<Json<Vec<String>>> {
    let texts = TaskRepository::new(state.db())
        .list_completed(&task_name)
        .await?;
    Ok(Json(texts))
}
