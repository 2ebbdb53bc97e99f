//! Response transport: executes the fallback strategy over an HTTP backend.
//!
//! The strategy is an explicit list of attempts run in order. It stops at the
//! first success or at the first error that does not allow fallback.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::client::{Completion, CompletionClient};
use crate::config::{ProviderConfig, ProviderKind};
use crate::error::{ProviderError, Result};
use crate::gemini::GeminiBackend;
use crate::groq::GroqBackend;
use crate::request::CompletionRequest;

/// Payload shape used by an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// One role-tagged entry per turn.
    Structured,
    /// The whole transcript as a single labelled text block.
    Flattened,
}

impl Shape {
    fn complete(self, text: String) -> Completion {
        match self {
            Self::Structured => Completion::Structured { text },
            Self::Flattened => Completion::Flattened { text },
        }
    }
}

/// One step of the fallback strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    /// Model to call.
    pub model: String,
    /// Payload shape to send.
    pub shape: Shape,
}

impl Attempt {
    /// Create an attempt.
    #[must_use]
    pub fn new(model: impl Into<String>, shape: Shape) -> Self {
        Self {
            model: model.into(),
            shape,
        }
    }
}

/// A provider API that can perform a single attempt.
#[async_trait]
pub trait ProviderBackend: Send + Sync {
    /// Which provider this backend talks to.
    fn kind(&self) -> ProviderKind;

    /// Perform one HTTP call and return the raw assistant text.
    ///
    /// # Errors
    ///
    /// Returns a classified [`ProviderError`] for any failure.
    async fn send(&self, attempt: &Attempt, request: &CompletionRequest) -> Result<String>;
}

/// HTTP completion client with a primary attempt and one fallback.
#[derive(Debug)]
pub struct ResponseTransport<B> {
    backend: B,
    strategy: Vec<Attempt>,
}

impl<B: ProviderBackend> ResponseTransport<B> {
    /// Create a transport with the configured primary and fallback models.
    ///
    /// The primary attempt is structured; the fallback is flattened.
    #[must_use]
    pub fn new(backend: B, config: &ProviderConfig) -> Self {
        Self::with_strategy(
            backend,
            vec![
                Attempt::new(config.primary_model(), Shape::Structured),
                Attempt::new(config.fallback_model(), Shape::Flattened),
            ],
        )
    }

    /// Create a transport with an explicit strategy.
    #[must_use]
    pub fn with_strategy(backend: B, strategy: Vec<Attempt>) -> Self {
        Self { backend, strategy }
    }

    /// Get the attempts in execution order.
    #[must_use]
    pub fn strategy(&self) -> &[Attempt] {
        &self.strategy
    }
}

#[async_trait]
impl<B: ProviderBackend> CompletionClient for ResponseTransport<B> {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let provider = self.backend.kind();
        let mut attempts = self.strategy.iter().enumerate().peekable();

        while let Some((index, attempt)) = attempts.next() {
            tracing::debug!(
                provider = %provider,
                attempt = index,
                model = %attempt.model,
                shape = ?attempt.shape,
                "Requesting completion"
            );

            let outcome = self
                .backend
                .send(attempt, request)
                .await
                .and_then(|text| {
                    if text.trim().is_empty() {
                        Err(ProviderError::EmptyReply)
                    } else {
                        Ok(text)
                    }
                });

            match outcome {
                Ok(text) => return Ok(attempt.shape.complete(text)),
                Err(err) if err.allows_fallback() && attempts.peek().is_some() => {
                    tracing::warn!(
                        provider = %provider,
                        attempt = index,
                        model = %attempt.model,
                        status = ?err.status(),
                        error = %err,
                        "Completion attempt failed, falling back"
                    );
                }
                Err(err) => {
                    tracing::error!(
                        provider = %provider,
                        attempt = index,
                        model = %attempt.model,
                        status = ?err.status(),
                        error = %err,
                        "Completion failed"
                    );
                    return Err(err);
                }
            }
        }

        Err(ProviderError::EmptyReply)
    }
}

/// Build the HTTP completion client for `config`.
///
/// # Errors
///
/// Returns [`ProviderError::Transport`] if the HTTP client cannot be created.
pub fn connect(config: &ProviderConfig, api_key: &str) -> Result<Arc<dyn CompletionClient>> {
    let client: Arc<dyn CompletionClient> = match config.kind {
        ProviderKind::Gemini => Arc::new(ResponseTransport::new(
            GeminiBackend::new(config, api_key)?,
            config,
        )),
        ProviderKind::Groq => Arc::new(ResponseTransport::new(
            GroqBackend::new(config, api_key)?,
            config,
        )),
    };
    Ok(client)
}

pub(crate) fn http_client(config: &ProviderConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(|e| ProviderError::Transport(format!("failed to create HTTP client: {e}")))
}

/// Error envelope shared by Gemini and OpenAI-compatible APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Pass a successful response through; classify anything else.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| format!("provider returned status {status}"));

    Err(ProviderError::from_status(status.as_u16(), message))
}
