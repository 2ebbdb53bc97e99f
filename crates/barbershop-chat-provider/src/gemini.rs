//! Gemini `generateContent` backend.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::{GenerationConfig, ProviderConfig, ProviderKind};
use crate::error::{ProviderError, Result};
use crate::request::{CompletionRequest, GeminiRequest};
use crate::transport::{check_status, http_client, Attempt, ProviderBackend, Shape};

/// Backend for the Gemini REST API. The key travels as a `key` query parameter.
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    generation: GenerationConfig,
}

impl GeminiBackend {
    /// Create a backend from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Transport`] if the HTTP client cannot be created.
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

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Pull `candidates[0].content.parts[0].text` out of a response body.
fn extract_text(body: &str) -> Result<String> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Parse(format!("invalid JSON: {e}")))?;

    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or_else(|| ProviderError::Parse("missing candidates[0].content.parts[0].text".into()))
}

#[async_trait]
impl ProviderBackend for GeminiBackend {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn send(&self, attempt: &Attempt, request: &CompletionRequest) -> Result<String> {
        let body = match attempt.shape {
            Shape::Structured => GeminiRequest::structured(request, self.generation),
            Shape::Flattened => GeminiRequest::flattened(request, self.generation),
        };

        let response = self
            .client
            .post(self.endpoint(&attempt.model))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let response = check_status(response).await?;
        let body = response.text().await?;
        extract_text(&body)
    }
}
