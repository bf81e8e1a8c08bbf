use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Message, Mood};

/// One conversation thread with its own persona and message history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ChatSession {
    pub id: Uuid,
    /// Insertion order is chat order.
    pub messages: Vec<Message>,
    /// Persona active when the session was created.
    pub mood: Mood,
    pub timestamp: DateTime<Utc>,
    pub title: String,
}

impl ChatSession {
    pub fn new(mood: Mood, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: Vec::new(),
            mood,
            timestamp: Utc::now(),
            title: title.into(),
        }
    }

    /// Title given to the `ordinal`-th session (1-based).
    pub fn default_title(ordinal: usize) -> String {
        format!("Chat {}", ordinal)
    }

    pub fn contains_message(&self, message_id: Uuid) -> bool {
        self.messages.iter().any(|m| m.id == message_id)
    }

    pub fn message(&self, message_id: Uuid) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == message_id)
    }

    pub fn message_mut(&mut self, message_id: Uuid) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == message_id)
    }

    /// Removes a message, shifting the rest down. Returns the removed message.
    pub fn remove_message(&mut self, message_id: Uuid) -> Option<Message> {
        let index = self.messages.iter().position(|m| m.id == message_id)?;
        Some(self.messages.remove(index))
    }

    pub fn pinned(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.is_pinned)
    }
}
