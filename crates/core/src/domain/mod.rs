mod media;
mod message;
mod mood;
mod segment;
mod session;

pub use media::*;
pub use message::*;
pub use mood::*;
pub use segment::*;
pub use session::*;
