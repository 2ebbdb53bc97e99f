//! Groq backend (OpenAI-compatible chat completions, streamed).

use async_trait::async_trait;

use crate::config::{GenerationConfig, ProviderConfig, ProviderKind};
use crate::error::Result;
use crate::request::{ChatRequest, CompletionRequest};
use crate::sse::collect_text;
use crate::transport::{check_status, http_client, Attempt, ProviderBackend, Shape};

/// Backend for Groq's `chat/completions` endpoint with bearer authorization.
///
/// Replies are streamed as server-sent events and collected in full before
/// being returned; no partial text leaves this backend.
#[derive(Debug, Clone)]
pub struct GroqBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    generation: GenerationConfig,
}

impl GroqBackend {
    /// Create a backend from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Transport`](crate::ProviderError::Transport)
    /// if the HTTP client cannot be created.
    pub fn new(config: &ProviderConfig, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(http_client(config)?, config, api_key))
    }

    /// Create a backend with a custom reqwest client.
    #[must_use]
    pub fn with_client(
        client: reqwest::Client,
        config: &ProviderConfig,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: config.base_url().to_string(),
            api_key: api_key.into(),
            generation: config.generation(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/openai/v1/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ProviderBackend for GroqBackend {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Groq
    }

    async fn send(&self, attempt: &Attempt, request: &CompletionRequest) -> Result<String> {
        let body = match attempt.shape {
            Shape::Structured => ChatRequest::structured(request, &attempt.model, self.generation),
            Shape::Flattened => ChatRequest::flattened(request, &attempt.model, self.generation),
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let response = check_status(response).await?;
        collect_text(response.bytes_stream()).await
    }
}
