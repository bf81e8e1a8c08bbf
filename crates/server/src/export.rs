//! Standalone chatbot page for a mood.
//!
//! The page is a single HTML file with the persona's name in the title and
//! its prompt as the system message of a browser-side chat loop.

use moodchat_core::Mood;
use serde_json::Value;

const CHATBOT_TEMPLATE: &str = include_str!("../templates/chatbot.html");

const NAME_PLACEHOLDER: &str = "{{MOOD_NAME}}";
const PROMPT_PLACEHOLDER: &str = "{{MOOD_PROMPT}}";

/// Renders the exported page for `mood`.
pub fn render_chatbot_page(mood: &Mood) -> String {
    CHATBOT_TEMPLATE
        .replace(NAME_PLACEHOLDER, &html_escape(&mood.name))
        .replace(PROMPT_PLACEHOLDER, &script_string(&mood.prompt))
}

/// File name offered to the browser for the download.
pub fn export_file_name(mood: &Mood) -> String {
    format!("{}-chatbot.html", mood.id)
}

fn html_escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// A JS string literal that cannot close the surrounding `<script>` element.
fn script_string(text: &str) -> String {
    Value::String(text.to_string()).to_string().replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_embeds_name_and_prompt() {
        let mood = Mood::default_mood();
        let page = render_chatbot_page(&mood);

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Programming Expert Chatbot</title>"));
        assert!(page.contains(r#"const MOOD_PROMPT = "You are an expert programming assistant.";"#));
        assert!(!page.contains(NAME_PLACEHOLDER));
        assert!(!page.contains(PROMPT_PLACEHOLDER));
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<b>Bob & 'Al'</b>"), "&lt;b&gt;Bob &amp; &#39;Al&#39;&lt;/b&gt;");
        assert_eq!(html_escape("plain"), "plain");
    }

    #[test]
    fn test_prompt_cannot_break_out_of_script() {
        let mood = Mood::custom(
            "Pirate",
            "Say \"arr\"\n`${alert(1)}`</script><script>alert(2)</script>",
        );
        let page = render_chatbot_page(&mood);

        assert_eq!(page.matches("</script>").count(), 1);
        assert!(page.contains(r#"\"arr\"\n`${alert(1)}`<\/script><script>alert(2)<\/script>"#));
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name(&Mood::default_mood()), "programmer-chatbot.html");
    }
}
