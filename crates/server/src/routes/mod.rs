mod chat;
mod health;
mod moods;
mod sessions;
mod upload;

pub use chat::*;
pub use health::*;
pub use moods::*;
pub use sessions::*;
pub use upload::*;
