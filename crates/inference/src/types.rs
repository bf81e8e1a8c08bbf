use serde::{Deserialize, Serialize};

/// Sampling settings sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters {
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub do_sample: bool,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_new_tokens: 1000,
            temperature: 0.7,
            top_p: 0.95,
            do_sample: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerationRequest<'a> {
    pub inputs: &'a str,
    pub parameters: GenerationParameters,
}

/// One element of the endpoint's success body (an array).
#[derive(Debug, Deserialize)]
pub struct GenerationOutput {
    #[serde(default)]
    pub generated_text: Option<String>,
}
