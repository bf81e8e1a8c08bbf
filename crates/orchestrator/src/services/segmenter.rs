//! Splits message content into prose and fenced code blocks.
//!
//! A fence opens with three backticks, an optional language tag made of ASCII
//! word characters, and a newline. The body runs to the next three backticks;
//! fences do not nest. An opener whose header is malformed is treated as prose
//! from its first backtick and scanning resumes one byte later. An opener with
//! no closing fence leaves the rest of the content as prose.

use moodchat_core::Segment;

const FENCE: &str = "```";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Looking for the next opening fence at or after `cursor`.
    InText,
    /// Found three backticks at `fence_start`; reading the language tag.
    InFenceHeader { fence_start: usize },
    /// Header accepted; looking for the closing fence.
    InFenceBody {
        fence_start: usize,
        language_end: usize,
        body_start: usize,
    },
}

/// Pure and deterministic: the same content always yields the same segments.
pub fn segment(content: &str) -> Vec<Segment> {
    let bytes = content.as_bytes();
    let mut segments = Vec::new();
    let mut state = ScanState::InText;
    let mut cursor = 0;
    let mut prose_start = 0;

    loop {
        match state {
            ScanState::InText => match find_fence(content, cursor) {
                Some(fence_start) => state = ScanState::InFenceHeader { fence_start },
                None => break,
            },
            ScanState::InFenceHeader { fence_start } => {
                let language_start = fence_start + FENCE.len();
                let language_end = language_start
                    + bytes[language_start..]
                        .iter()
                        .take_while(|b| is_word_byte(**b))
                        .count();

                if bytes.get(language_end) == Some(&b'\n') {
                    state = ScanState::InFenceBody {
                        fence_start,
                        language_end,
                        body_start: language_end + 1,
                    };
                } else {
                    cursor = fence_start + 1;
                    state = ScanState::InText;
                }
            }
            ScanState::InFenceBody {
                fence_start,
                language_end,
                body_start,
            } => {
                // Unterminated: nothing after this point can close a fence either.
                let Some(close) = find_fence(content, body_start) else {
                    break;
                };

                push_prose(&mut segments, &content[prose_start..fence_start]);

                let language = &content[fence_start + FENCE.len()..language_end];
                let language = (!language.is_empty()).then_some(language);
                segments.push(Segment::code(content[body_start..close].trim(), language));

                cursor = close + FENCE.len();
                prose_start = cursor;
                state = ScanState::InText;
            }
        }
    }

    push_prose(&mut segments, &content[prose_start..]);
    segments
}

/// Writes segments back out as markdown. Code blocks always carry their
/// language tag, so the output is a normalized form of the original content
/// that segments to the same sequence.
pub fn render_markdown(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::PlainText { text } => out.push_str(text),
            Segment::CodeBlock { code, language } => {
                out.push_str(FENCE);
                out.push_str(language);
                out.push('\n');
                out.push_str(code);
                out.push('\n');
                out.push_str(FENCE);
            }
        }
    }
    out
}

fn find_fence(content: &str, from: usize) -> Option<usize> {
    content[from..].find(FENCE).map(|i| i + from)
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn push_prose(segments: &mut Vec<Segment>, text: &str) {
    if !text.is_empty() {
        segments.push(Segment::plain(text));
    }
}
