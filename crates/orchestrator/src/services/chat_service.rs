//! Drives one chat turn: gateway call, enrichment, persistence.

use std::sync::Arc;

use db::SessionRepository;
use inference::{GatewayResult, InferenceGateway};
use moodchat_core::{require_non_empty, MediaAttachment, Message};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ChatError, Result};
use crate::resources::InFlightRegistry;
use crate::services::enricher::{EnrichedResponse, Enricher};

/// Assistant text stored when the gateway fails.
pub const FALLBACK_ASSISTANT_REPLY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    /// The assistant message as appended to the session
    pub message: Message,
    pub media: Vec<MediaAttachment>,
    /// Set when the gateway failed and the fallback text was stored instead.
    pub degraded: bool,
}

#[derive(Clone)]
pub struct ChatService {
    gateway: Arc<dyn InferenceGateway>,
    sessions: SessionRepository,
    enricher: Enricher,
    inflight: InFlightRegistry,
}

impl ChatService {
    pub fn new(
        gateway: Arc<dyn InferenceGateway>,
        sessions: SessionRepository,
        enricher: Enricher,
    ) -> Self {
        Self {
            gateway,
            sessions,
            enricher,
            inflight: InFlightRegistry::new(),
        }
    }

    pub fn sessions(&self) -> &SessionRepository {
        &self.sessions
    }

    /// One stateless exchange: nothing is stored.
    pub async fn respond(&self, message: &str, mood_prompt: &str) -> GatewayResult<EnrichedResponse> {
        let text = self.gateway.converse(message, mood_prompt).await?;
        Ok(self.enricher.enrich_exchange(message, &text))
    }

    /// Appends `content` as a user message, asks the gateway for a reply in
    /// the session's mood and appends that reply.
    ///
    /// Only one call per session may be in flight. If `cancel` fires before
    /// the gateway answers, no assistant message is appended.
    pub async fn send(
        &self,
        session_id: Uuid,
        content: &str,
        cancel: CancellationToken,
    ) -> Result<ChatReply> {
        let content = require_non_empty("content", Some(content))?;

        let guard = self
            .inflight
            .acquire(session_id, &cancel)
            .ok_or(ChatError::Busy(session_id))?;

        let session = self
            .sessions
            .get_session(session_id)
            .await
            .ok_or(ChatError::SessionNotFound(session_id))?;

        self.sessions
            .append_message(session_id, Message::user(content))
            .await?;

        debug!(
            session_id = %session_id,
            mood = %session.mood.id,
            "Requesting assistant reply"
        );

        let outcome = tokio::select! {
            biased;
            _ = guard.token().cancelled() => {
                info!(session_id = %session_id, "Chat request cancelled");
                return Err(ChatError::Cancelled(session_id));
            }
            result = self.gateway.converse(content, &session.mood.prompt) => result,
        };

        let (text, media, degraded) = match outcome {
            Ok(text) => {
                let enriched = self.enricher.enrich_exchange(content, &text);
                (enriched.text, enriched.media, false)
            }
            Err(e) => {
                warn!(
                    session_id = %session_id,
                    kind = e.kind(),
                    error = %e,
                    "Inference failed, storing fallback reply"
                );
                (FALLBACK_ASSISTANT_REPLY.to_string(), Vec::new(), true)
            }
        };

        let message = Message::assistant(text);
        self.sessions
            .append_message(session_id, message.clone())
            .await?;
        drop(guard);

        info!(
            session_id = %session_id,
            message_id = %message.id,
            media = media.len(),
            degraded,
            "Assistant reply stored"
        );

        Ok(ChatReply {
            message,
            media,
            degraded,
        })
    }

    /// Cancels the in-flight call for `session_id`. Returns whether one existed.
    pub fn cancel(&self, session_id: Uuid) -> bool {
        self.inflight.cancel(session_id)
    }

    pub fn is_busy(&self, session_id: Uuid) -> bool {
        self.inflight.is_busy(session_id)
    }
}
