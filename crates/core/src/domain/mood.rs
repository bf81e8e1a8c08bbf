use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Id prefix reserved for user-created personas.
pub const CUSTOM_MOOD_PREFIX: &str = "custom-";

pub const DEFAULT_MOOD_ID: &str = "programmer";

/// A persona: the instruction text injected into the model prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Mood {
    pub id: String,
    pub name: String,
    pub prompt: String,
}

impl Mood {
    /// Creates a user persona with a fresh id in the custom namespace.
    pub fn custom(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: format!("{}{}", CUSTOM_MOOD_PREFIX, Uuid::new_v4()),
            name: name.into(),
            prompt: prompt.into(),
        }
    }

    pub fn is_custom(&self) -> bool {
        is_custom_id(&self.id)
    }

    /// The fixed seed personas. Never deleted, ids never reassigned.
    pub fn built_ins() -> Vec<Mood> {
        vec![
            Mood {
                id: DEFAULT_MOOD_ID.to_string(),
                name: "Programming Expert".to_string(),
                prompt: "You are an expert programming assistant.".to_string(),
            },
            Mood {
                id: "doctor".to_string(),
                name: "Medical Expert".to_string(),
                prompt: "You are a medical expert.".to_string(),
            },
            Mood {
                id: "business".to_string(),
                name: "Business Consultant".to_string(),
                prompt: "You are a business consultant.".to_string(),
            },
        ]
    }

    pub fn default_mood() -> Mood {
        Self::built_ins().remove(0)
    }
}

pub fn is_custom_id(id: &str) -> bool {
    id.starts_with(CUSTOM_MOOD_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_mood_is_namespaced() {
        let mood = Mood::custom("Pirate", "You talk like a pirate.");
        assert!(mood.id.starts_with(CUSTOM_MOOD_PREFIX));
        assert!(mood.is_custom());
    }

    #[test]
    fn test_custom_ids_are_unique() {
        let a = Mood::custom("A", "a");
        let b = Mood::custom("A", "a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_built_ins_are_not_custom() {
        let built_ins = Mood::built_ins();
        assert_eq!(built_ins.len(), 3);
        assert!(built_ins.iter().all(|m| !m.is_custom()));
        assert_eq!(Mood::default_mood().id, DEFAULT_MOOD_ID);
    }
}
