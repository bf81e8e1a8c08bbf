use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use orchestrator::ChatError;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Database(db::DbError),
    Chat(ChatError),
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    error: String,
    message: String,
}

type Mapped = (StatusCode, &'static str, String);

fn map_db_error(err: db::DbError) -> Mapped {
    match err {
        db::DbError::SessionNotFound(_)
        | db::DbError::MessageNotFound { .. }
        | db::DbError::MoodNotFound(_) => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        db::DbError::DuplicateMessage(_) => (StatusCode::CONFLICT, "conflict", err.to_string()),
        db::DbError::BuiltInMood(_) => (StatusCode::FORBIDDEN, "forbidden", err.to_string()),
        db::DbError::Validation(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
        _ => {
            tracing::error!("Database error: {:?}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "database_error",
                "Database error occurred".to_string(),
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            AppError::Database(err) => map_db_error(err),
            AppError::Chat(err) => match err {
                ChatError::SessionNotFound(_) => {
                    (StatusCode::NOT_FOUND, "not_found", err.to_string())
                }
                ChatError::Busy(_) => (StatusCode::CONFLICT, "busy", err.to_string()),
                ChatError::Cancelled(_) => (StatusCode::CONFLICT, "cancelled", err.to_string()),
                ChatError::Validation(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
                ChatError::Store(err) => map_db_error(err),
                ChatError::Gateway(_) => {
                    tracing::error!("Inference error: {:?}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "inference_error",
                        err.to_string(),
                    )
                }
            },
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<db::DbError> for AppError {
    fn from(err: db::DbError) -> Self {
        AppError::Database(err)
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        AppError::Chat(err)
    }
}
