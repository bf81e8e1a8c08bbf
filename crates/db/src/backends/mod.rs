//! Durable key/value storage behind the session and mood repositories.
//!
//! Each record is a whole serialized collection stored under a fixed key,
//! so a backend only needs `get`, `set` and `clear`.

mod json_dir;
mod memory;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

pub use json_dir::JsonDirStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Name of the backend, for logging
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the record. Clearing a missing key is not an error.
    async fn clear(&self, key: &str) -> Result<()>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;
