use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use moodchat_core::{require_non_empty, CoreError, MediaAttachment};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::state::AppState;

pub const CHAT_VALIDATION_ERROR: &str = "Message and mood are required";
pub const CHAT_FAILURE_ERROR: &str = "Failed to process chat message";

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    /// Persona instruction text, or the id of a known mood
    #[serde(default)]
    pub mood: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ChatSuccess {
    success: bool,
    response: String,
    media: Vec<MediaAttachment>,
}

#[derive(Serialize, ToSchema)]
pub struct ChatFailure {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ChatFailure {
    fn respond(status: StatusCode, error: &str, details: Option<String>) -> Response {
        let body = Json(ChatFailure {
            success: false,
            error: error.to_string(),
            details,
        });
        (status, body).into_response()
    }
}

fn field_details(err: CoreError) -> String {
    match err {
        CoreError::Validation(msg) => msg,
    }
}

#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply with media", body = ChatSuccess),
        (status = 400, description = "Message or mood missing", body = ChatFailure),
        (status = 500, description = "Inference failed", body = ChatFailure)
    ),
    tag = "chat"
)]
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(error = %rejection, "Unreadable chat request body");
            ChatRequest::default()
        }
    };

    let checked = require_non_empty("message", request.message.as_deref()).and_then(|message| {
        require_non_empty("mood", request.mood.as_deref()).map(|mood| (message, mood))
    });
    let (message, mood) = match checked {
        Ok(fields) => fields,
        Err(err) => {
            return ChatFailure::respond(
                StatusCode::BAD_REQUEST,
                CHAT_VALIDATION_ERROR,
                Some(field_details(err)),
            )
        }
    };

    let mood_prompt = match state.moods.get(mood).await {
        Some(known) => known.prompt,
        None => mood.to_string(),
    };

    match state.chat.respond(message, &mood_prompt).await {
        Ok(enriched) => Json(ChatSuccess {
            success: true,
            response: enriched.text,
            media: enriched.media,
        })
        .into_response(),
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Chat error");
            let details = state.config.dev_mode.then(|| e.to_string());
            ChatFailure::respond(StatusCode::INTERNAL_SERVER_ERROR, CHAT_FAILURE_ERROR, details)
        }
    }
}
