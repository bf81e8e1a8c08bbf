use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use moodchat_core::{ChatSession, MediaAttachment, Message, Segment, DEFAULT_MOOD_ID};
use orchestrator::segment;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    /// Defaults to the programmer persona
    #[serde(default)]
    pub mood_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Serialize, ToSchema)]
pub struct SendMessageResponse {
    pub message: Message,
    pub media: Vec<MediaAttachment>,
    pub degraded: bool,
}

#[derive(Serialize, ToSchema)]
pub struct PinResponse {
    pub message_id: Uuid,
    pub is_pinned: bool,
}

#[derive(Serialize, ToSchema)]
pub struct CancelResponse {
    pub cancelled: bool,
}

async fn find_session(state: &AppState, id: Uuid) -> Result<ChatSession, AppError> {
    state
        .sessions
        .get_session(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {}", id)))
}

#[utoipa::path(
    get,
    path = "/api/sessions",
    responses(
        (status = 200, description = "All sessions, newest first", body = Vec<ChatSession>)
    ),
    tag = "sessions"
)]
pub async fn list_sessions(State(state): State<AppState>) -> Json<Vec<ChatSession>> {
    Json(state.sessions.list_sessions().await)
}

#[utoipa::path(
    post,
    path = "/api/sessions",
    request_body(content = CreateSessionRequest, description = "Optional; an empty body uses the default mood"),
    responses(
        (status = 201, description = "Session created and activated", body = ChatSession),
        (status = 404, description = "Mood not found")
    ),
    tag = "sessions"
)]
pub async fn create_session(
    State(state): State<AppState>,
    payload: Option<Json<CreateSessionRequest>>,
) -> Result<(StatusCode, Json<ChatSession>), AppError> {
    let mood_id = payload
        .as_ref()
        .and_then(|Json(request)| request.mood_id.as_deref())
        .unwrap_or(DEFAULT_MOOD_ID);
    let mood = state
        .moods
        .get(mood_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Mood not found: {}", mood_id)))?;

    let session = state.sessions.create_session(mood).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    get,
    path = "/api/sessions/active",
    responses(
        (status = 200, description = "Active session", body = ChatSession),
        (status = 404, description = "No active session")
    ),
    tag = "sessions"
)]
pub async fn get_active_session(
    State(state): State<AppState>,
) -> Result<Json<ChatSession>, AppError> {
    state
        .sessions
        .active_session()
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No active session".to_string()))
}

#[utoipa::path(
    get,
    path = "/api/sessions/{id}",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session found", body = ChatSession),
        (status = 404, description = "Session not found")
    ),
    tag = "sessions"
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatSession>, AppError> {
    Ok(Json(find_session(&state, id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/sessions/{id}",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "Session not found")
    ),
    tag = "sessions"
)]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.chat.cancel(id);
    state.sessions.delete_session(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/sessions/{id}/activate",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session is now active", body = ChatSession),
        (status = 404, description = "Session not found")
    ),
    tag = "sessions"
)]
pub async fn activate_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatSession>, AppError> {
    state.sessions.set_active(id).await?;
    Ok(Json(find_session(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/sessions/{id}/messages",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Assistant reply, stored in the session", body = SendMessageResponse),
        (status = 400, description = "Empty content"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "A reply is already being generated, or the request was cancelled")
    ),
    tag = "sessions"
)]
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, AppError> {
    let reply = state
        .chat
        .send(id, &payload.content, CancellationToken::new())
        .await?;

    Ok(Json(SendMessageResponse {
        message: reply.message,
        media: reply.media,
        degraded: reply.degraded,
    }))
}

#[utoipa::path(
    post,
    path = "/api/sessions/{id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Whether a call was in flight", body = CancelResponse)
    ),
    tag = "sessions"
)]
pub async fn cancel_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Json<CancelResponse> {
    Json(CancelResponse {
        cancelled: state.chat.cancel(id),
    })
}

#[utoipa::path(
    post,
    path = "/api/sessions/{id}/messages/{message_id}/pin",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("message_id" = Uuid, Path, description = "Message ID")
    ),
    responses(
        (status = 200, description = "Pin toggled", body = PinResponse),
        (status = 404, description = "Session or message not found")
    ),
    tag = "sessions"
)]
pub async fn pin_message(
    State(state): State<AppState>,
    Path((id, message_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<PinResponse>, AppError> {
    let is_pinned = state.sessions.pin_message(id, message_id).await?;
    Ok(Json(PinResponse {
        message_id,
        is_pinned,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/sessions/{id}/messages/{message_id}",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("message_id" = Uuid, Path, description = "Message ID")
    ),
    responses(
        (status = 204, description = "Message deleted"),
        (status = 404, description = "Session or message not found")
    ),
    tag = "sessions"
)]
pub async fn delete_message(
    State(state): State<AppState>,
    Path((id, message_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    state.sessions.delete_message(id, message_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/sessions/{id}/messages/{message_id}/segments",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("message_id" = Uuid, Path, description = "Message ID")
    ),
    responses(
        (status = 200, description = "Prose and code segments in order", body = Vec<Segment>),
        (status = 404, description = "Session or message not found")
    ),
    tag = "sessions"
)]
pub async fn get_message_segments(
    State(state): State<AppState>,
    Path((id, message_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<Segment>>, AppError> {
    let session = find_session(&state, id).await?;
    let message = session.message(message_id).ok_or_else(|| {
        AppError::NotFound(format!(
            "Message {} not found in session {}",
            message_id, id
        ))
    })?;

    Ok(Json(segment(&message.content)))
}
