use inference::GatewayError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("A reply is already being generated for session {0}")]
    Busy(Uuid),

    #[error("Request cancelled for session {0}")]
    Cancelled(Uuid),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Store(#[from] db::DbError),

    #[error("Inference error: {0}")]
    Gateway(#[from] GatewayError),
}

impl From<moodchat_core::CoreError> for ChatError {
    fn from(err: moodchat_core::CoreError) -> Self {
        match err {
            moodchat_core::CoreError::Validation(msg) => ChatError::Validation(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
