//! Attaches synthetic media to assistant replies based on keyword rules.

use std::sync::{Arc, Mutex};

use moodchat_core::{MediaAttachment, WeatherCondition};
use rand::{Rng, SeedableRng};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// Inclusive bounds of the synthetic temperature, in °C.
pub const MIN_TEMPERATURE: i32 = 15;
pub const MAX_TEMPERATURE: i32 = 30;

/// Source of uniform random choices.
pub trait RandomSource: Send {
    /// Returns a value in `0..upper`. `upper` is never zero.
    fn pick(&mut self, upper: u32) -> u32;
}

/// Adapts any `rand` generator.
pub struct RngSource<R>(pub R);

impl<R: Rng + Send> RandomSource for RngSource<R> {
    fn pick(&mut self, upper: u32) -> u32 {
        self.0.gen_range(0..upper)
    }
}

/// One independent enrichment rule.
pub trait MediaRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, text: &str, random: &mut dyn RandomSource) -> Option<MediaAttachment>;
}

/// Adds a weather card when the text mentions weather, temperature or a forecast.
pub struct WeatherRule {
    pattern: Regex,
}

impl WeatherRule {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"(?i)weather|temperature|forecast")
                .expect("Invalid weather regex pattern"),
        }
    }
}

impl Default for WeatherRule {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaRule for WeatherRule {
    fn name(&self) -> &'static str {
        "weather"
    }

    fn apply(&self, text: &str, random: &mut dyn RandomSource) -> Option<MediaAttachment> {
        if !self.pattern.is_match(text) {
            return None;
        }

        let span = (MAX_TEMPERATURE - MIN_TEMPERATURE + 1) as u32;
        let temperature = MIN_TEMPERATURE + random.pick(span) as i32;
        let conditions = WeatherCondition::ALL;
        let condition = conditions[random.pick(conditions.len() as u32) as usize];

        Some(MediaAttachment::weather(temperature, condition))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedResponse {
    /// The input text, unchanged
    pub text: String,
    pub media: Vec<MediaAttachment>,
}

/// Runs every rule against a reply. Not idempotent: rules may draw randomness.
#[derive(Clone)]
pub struct Enricher {
    rules: Arc<Vec<Box<dyn MediaRule>>>,
    random: Arc<Mutex<Box<dyn RandomSource>>>,
}

impl Enricher {
    /// Default rule set backed by an OS-seeded generator.
    pub fn new() -> Self {
        Self::with_random(Box::new(RngSource(rand::rngs::StdRng::from_entropy())))
    }

    pub fn with_random(random: Box<dyn RandomSource>) -> Self {
        Self::with_rules(vec![Box::new(WeatherRule::new())], random)
    }

    pub fn with_rules(rules: Vec<Box<dyn MediaRule>>, random: Box<dyn RandomSource>) -> Self {
        Self {
            rules: Arc::new(rules),
            random: Arc::new(Mutex::new(random)),
        }
    }

    pub fn enrich(&self, text: &str) -> EnrichedResponse {
        self.enrich_matching(text, &[text])
    }

    /// Enriches a reply in the context of the question that produced it: a
    /// rule that does not match the reply may still match the user's message.
    /// Each rule attaches at most once either way.
    pub fn enrich_exchange(&self, user_message: &str, reply: &str) -> EnrichedResponse {
        self.enrich_matching(reply, &[reply, user_message])
    }

    fn enrich_matching(&self, text: &str, sources: &[&str]) -> EnrichedResponse {
        // A poisoned lock only means another caller panicked mid-draw; the
        // generator itself is still usable.
        let mut random = self
            .random
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut media = Vec::new();
        for rule in self.rules.iter() {
            for source in sources {
                if let Some(attachment) = rule.apply(source, random.as_mut()) {
                    debug!(rule = rule.name(), kind = attachment.kind(), "Attached media");
                    media.push(attachment);
                    break;
                }
            }
        }

        EnrichedResponse {
            text: text.to_string(),
            media,
        }
    }
}

impl Default for Enricher {
    fn default() -> Self {
        Self::new()
    }
}
