//! Inference gateway: one templated prompt out, one reply back.

pub mod client;
pub mod error;
pub mod prompt;
pub mod types;

pub use client::{InferenceClient, InferenceGateway, DEFAULT_API_URL};
pub use error::{GatewayError, GatewayResult};
pub use prompt::{build_prompt, extract_reply, FALLBACK_REPLY, RESPONSE_MARKER};
pub use types::*;
