/// Literal the prompt ends with; the model's continuation follows it.
pub const RESPONSE_MARKER: &str = "Response:";

/// Reply used when the generated text carries no usable continuation.
pub const FALLBACK_REPLY: &str = "I apologize, but I could not generate a proper response.";

/// Wraps the persona instruction and the user's message into one prompt.
pub fn build_prompt(mood_prompt: &str, user_message: &str) -> String {
    format!(
        "You are {mood}. Please provide a helpful response while staying in character and \
         responding in the same language as the user's message and in the same tone and style \
         as the user's message.\n\nUser's message: {message}\n\n{marker}",
        mood = mood_prompt,
        message = user_message,
        marker = RESPONSE_MARKER,
    )
}

/// Everything after the first [`RESPONSE_MARKER`], trimmed. Falls back to
/// [`FALLBACK_REPLY`] when the marker is missing or nothing follows it.
pub fn extract_reply(generated_text: &str) -> String {
    generated_text
        .find(RESPONSE_MARKER)
        .map(|index| generated_text[index + RESPONSE_MARKER.len()..].trim())
        .filter(|reply| !reply.is_empty())
        .unwrap_or(FALLBACK_REPLY)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_persona_and_message() {
        let prompt = build_prompt("a medical expert", "Is coffee bad?");

        assert!(prompt.starts_with("You are a medical expert. Please provide"));
        assert!(prompt.contains("\n\nUser's message: Is coffee bad?\n\n"));
        assert!(prompt.ends_with("Response:"));
    }

    #[test]
    fn test_extract_after_marker() {
        let generated = "You are x.\n\nUser's message: hi\n\nResponse:  It's sunny today. \n";
        assert_eq!(extract_reply(generated), "It's sunny today.");
    }

    #[test]
    fn test_extract_keeps_later_markers() {
        let generated = "Response: first part\nResponse: second part";
        assert_eq!(extract_reply(generated), "first part\nResponse: second part");
    }

    #[test]
    fn test_missing_marker_falls_back() {
        assert_eq!(extract_reply("no marker here"), FALLBACK_REPLY);
    }

    #[test]
    fn test_empty_continuation_falls_back() {
        assert_eq!(extract_reply("prompt...\n\nResponse:   \n"), FALLBACK_REPLY);
    }
}
