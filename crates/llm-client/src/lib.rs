pub mod prompt;
pub mod stream;

pub use prompt::{analysis_messages, ANALYSIS_SYSTEM_PROMPT};
pub use stream::delta_stream;

use agri_core::{AgriError, AgriResult, ChatMessage, CompletionProvider, CompletionStream};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

pub const MAX_COMPLETION_TOKENS: u32 = 1024;
pub const REPETITION_PENALTY: f64 = 1.05;

/// Connection settings for an OpenAI-compatible completion server (vLLM).
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub timeout: Duration,
}

impl LlmConfig {
    pub fn new(api_key: String, api_base: String, model: String) -> Self {
        Self {
            api_key,
            api_base,
            model,
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    max_completion_tokens: u32,
    repetition_penalty: f64,
}

/// Streaming chat-completion client.
///
/// Every call opens its own request. The configured timeout bounds connecting
/// and each wait for data, so a long generation survives as long as tokens
/// keep arriving.
#[derive(Clone)]
pub struct VllmClient {
    client: Client,
    config: LlmConfig,
}

impl VllmClient {
    pub fn new(config: LlmConfig) -> AgriResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .read_timeout(config.timeout)
            .build()
            .map_err(|e| AgriError::UpstreamUnavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'))
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl CompletionProvider for VllmClient {
    async fn stream(&self, messages: Vec<ChatMessage>) -> AgriResult<CompletionStream> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: &messages,
            stream: true,
            max_completion_tokens: MAX_COMPLETION_TOKENS,
            repetition_penalty: REPETITION_PENALTY,
        };

        tracing::debug!(
            "Requesting streamed completion from {} (model {})",
            self.config.api_base,
            self.config.model
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgriError::UpstreamUnavailable(format!("completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Completion request failed with status {}: {}", status, body);
            return Err(AgriError::UpstreamUnavailable(format!(
                "completion HTTP {}: {}",
                status, body
            )));
        }

        Ok(delta_stream(response.bytes_stream()))
    }
}
