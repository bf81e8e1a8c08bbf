use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, warn};

use crate::error::{GatewayError, GatewayResult};
use crate::prompt::{build_prompt, extract_reply};
use crate::types::{GenerationOutput, GenerationParameters, GenerationRequest};

pub const DEFAULT_API_URL: &str =
    "https://api-inference.huggingface.co/models/mistralai/Mixtral-8x7B-Instruct-v0.1";

/// One request/response exchange with a hosted model.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Sends the persona-templated prompt and returns the assistant text.
    async fn converse(&self, user_message: &str, mood_prompt: &str) -> GatewayResult<String>;
}

/// Client for a Hugging Face style text-generation endpoint
#[derive(Clone)]
pub struct InferenceClient {
    client: Client,
    api_url: String,
    api_key: String,
    parameters: GenerationParameters,
}

impl InferenceClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        if api_key.is_empty() {
            warn!("No inference API key configured, requests will be sent unauthenticated");
        }

        Self {
            client: Client::new(),
            api_url: api_url.into(),
            api_key,
            parameters: GenerationParameters::default(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Posts `prompt` and returns the raw `generated_text` of the first output.
    pub async fn generate(&self, prompt: &str) -> GatewayResult<String> {
        debug!(
            url = %self.api_url,
            prompt_len = prompt.len(),
            "Sending generation request"
        );

        let request = GenerationRequest {
            inputs: prompt,
            parameters: self.parameters,
        };

        let mut builder = self.client.post(&self.api_url).json(&request);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder.send().await.map_err(|e| {
            error!(url = %self.api_url, error = %e, "Inference endpoint unreachable");
            GatewayError::Unreachable(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Unreachable(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            error!(status = status.as_u16(), body = %body, "Inference request failed");
            return Err(GatewayError::UpstreamFailure {
                status: status.as_u16(),
                body,
            });
        }

        let outputs: Vec<GenerationOutput> = serde_json::from_str(&body).map_err(|e| {
            warn!(
                error = %e,
                body_preview = %body.chars().take(200).collect::<String>(),
                "Unexpected inference response shape"
            );
            GatewayError::MalformedResponse(format!("Expected an array of outputs: {}", e))
        })?;

        outputs
            .into_iter()
            .next()
            .and_then(|output| output.generated_text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                GatewayError::MalformedResponse("Missing generated_text in first output".to_string())
            })
    }
}

#[async_trait]
impl InferenceGateway for InferenceClient {
    async fn converse(&self, user_message: &str, mood_prompt: &str) -> GatewayResult<String> {
        let prompt = build_prompt(mood_prompt, user_message);
        let generated = self.generate(&prompt).await?;
        Ok(extract_reply(&generated))
    }
}
