pub mod backends;
mod error;
pub mod models;
mod pool;
pub mod repositories;

pub use backends::{JsonDirStore, KeyValueStore, MemoryStore, SharedStore, SqliteStore};
pub use error::*;
pub use pool::*;
pub use repositories::*;
