use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Message {message_id} not found in session {session_id}")]
    MessageNotFound { session_id: Uuid, message_id: Uuid },

    #[error("Message already exists: {0}")]
    DuplicateMessage(Uuid),

    #[error("Mood not found: {0}")]
    MoodNotFound(String),

    #[error("Built-in mood cannot be modified: {0}")]
    BuiltInMood(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<moodchat_core::CoreError> for DbError {
    fn from(err: moodchat_core::CoreError) -> Self {
        match err {
            moodchat_core::CoreError::Validation(msg) => DbError::Validation(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
