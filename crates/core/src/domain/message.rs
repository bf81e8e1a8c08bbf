use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

/// A single chat message. Owned by exactly one [`ChatSession`](super::ChatSession).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_pinned: bool,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            is_pinned: false,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Flips the pinned flag and returns the new state.
    pub fn toggle_pin(&mut self) -> bool {
        self.is_pinned = !self.is_pinned;
        self.is_pinned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_defaults_unpinned() {
        let message = Message::user("hello");
        assert_eq!(message.role, Role::User);
        assert_eq!(message.content, "hello");
        assert!(!message.is_pinned);
    }

    #[test]
    fn test_toggle_pin_flips_state() {
        let mut message = Message::assistant("hi");
        assert!(message.toggle_pin());
        assert!(!message.toggle_pin());
    }

    #[test]
    fn test_message_serializes_camel_case() {
        let message = Message::user("hello");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["isPinned"], false);
    }

    #[test]
    fn test_missing_pin_flag_defaults_to_false() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "role": "assistant",
            "content": "stored before pinning existed",
            "timestamp": "2025-01-01T00:00:00Z"
        });
        let message: Message = serde_json::from_value(json).unwrap();
        assert!(!message.is_pinned);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("user"), Some(Role::User));
        assert_eq!(Role::Assistant.as_str(), "assistant");
        assert_eq!(Role::parse("system"), None);
    }
}
