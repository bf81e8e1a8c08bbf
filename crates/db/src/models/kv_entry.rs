use chrono::Utc;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KvRow {
    pub key: String,
    pub value: String,
    /// Unix seconds of the last write
    pub updated_at: i64,
}

impl KvRow {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            updated_at: Utc::now().timestamp(),
        }
    }
}
