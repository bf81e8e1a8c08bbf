pub mod chat_service;
pub mod enricher;
pub mod segmenter;

pub use chat_service::{ChatReply, ChatService, FALLBACK_ASSISTANT_REPLY};
pub use enricher::{EnrichedResponse, Enricher, MediaRule, RandomSource, RngSource, WeatherRule};
pub use segmenter::{render_markdown, segment};
