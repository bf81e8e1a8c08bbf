pub mod error;
pub mod resources;
pub mod services;

pub use error::{ChatError, Result};
pub use services::{
    render_markdown, segment, ChatReply, ChatService, EnrichedResponse, Enricher, MediaRule,
    RandomSource, RngSource, WeatherRule, FALLBACK_ASSISTANT_REPLY,
};
