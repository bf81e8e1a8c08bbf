mod mood_repository;
mod session_repository;

pub use mood_repository::*;
pub use session_repository::*;
