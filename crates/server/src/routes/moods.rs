use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::Json;
use moodchat_core::Mood;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::export::{export_file_name, render_chatbot_page};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMoodRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/moods",
    responses(
        (status = 200, description = "Built-in moods followed by custom ones", body = Vec<Mood>)
    ),
    tag = "moods"
)]
pub async fn list_moods(State(state): State<AppState>) -> Json<Vec<Mood>> {
    Json(state.moods.list().await)
}

#[utoipa::path(
    post,
    path = "/api/moods",
    request_body = CreateMoodRequest,
    responses(
        (status = 201, description = "Custom mood created", body = Mood),
        (status = 400, description = "Name or prompt missing")
    ),
    tag = "moods"
)]
pub async fn create_mood(
    State(state): State<AppState>,
    Json(payload): Json<CreateMoodRequest>,
) -> Result<(StatusCode, Json<Mood>), AppError> {
    let mood = state
        .moods
        .create(
            payload.name.as_deref().unwrap_or_default(),
            payload.prompt.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(mood)))
}

#[utoipa::path(
    delete,
    path = "/api/moods/{id}",
    params(
        ("id" = String, Path, description = "Custom mood ID")
    ),
    responses(
        (status = 204, description = "Mood deleted"),
        (status = 403, description = "Built-in moods cannot be deleted"),
        (status = 404, description = "Mood not found")
    ),
    tag = "moods"
)]
pub async fn delete_mood(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.moods.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/moods/{id}/export",
    params(
        ("id" = String, Path, description = "Mood ID")
    ),
    responses(
        (status = 200, description = "Standalone chatbot page for the mood", content_type = "text/html", body = String),
        (status = 404, description = "Mood not found")
    ),
    tag = "moods"
)]
pub async fn export_mood(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mood = state
        .moods
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Mood not found: {}", id)))?;

    info!(mood_id = %mood.id, "Exporting chatbot page");
    let disposition = format!("attachment; filename=\"{}\"", export_file_name(&mood));
    Ok((
        [(header::CONTENT_DISPOSITION, disposition)],
        Html(render_chatbot_page(&mood)),
    ))
}
