use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Language label used when a fence carries no tag.
pub const DEFAULT_CODE_LANGUAGE: &str = "plaintext";

/// One contiguous run of message content, classified as prose or code.
/// Produced at render time, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    PlainText { text: String },
    CodeBlock { code: String, language: String },
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::PlainText { text: text.into() }
    }

    /// Builds a code block; `None` falls back to [`DEFAULT_CODE_LANGUAGE`].
    pub fn code(code: impl Into<String>, language: Option<&str>) -> Self {
        Self::CodeBlock {
            code: code.into(),
            language: language.unwrap_or(DEFAULT_CODE_LANGUAGE).to_string(),
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, Self::CodeBlock { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_defaults_language() {
        let segment = Segment::code("ls", None);
        assert_eq!(
            segment,
            Segment::CodeBlock {
                code: "ls".to_string(),
                language: "plaintext".to_string()
            }
        );
        assert!(segment.is_code());
    }

    #[test]
    fn test_segment_serialization() {
        let json = serde_json::to_value(Segment::plain("hi")).unwrap();
        assert_eq!(json["type"], "plain_text");
        assert_eq!(json["text"], "hi");

        let json = serde_json::to_value(Segment::code("fn main() {}", Some("rust"))).unwrap();
        assert_eq!(json["type"], "code_block");
        assert_eq!(json["language"], "rust");
    }
}
