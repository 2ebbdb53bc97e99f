//! The completion client seam.
//!
//! Everything above the provider crate talks to a [`CompletionClient`]. The
//! HTTP implementation is [`ResponseTransport`](crate::ResponseTransport);
//! tests substitute their own.

use async_trait::async_trait;

use crate::error::Result;
use crate::request::CompletionRequest;

/// A finished assistant reply, tagged with the payload shape that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Answered by a structured, per-turn request.
    Structured {
        /// Raw assistant text.
        text: String,
    },
    /// Answered by a flattened fallback request.
    Flattened {
        /// Raw assistant text.
        text: String,
    },
}

impl Completion {
    /// The raw assistant text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Structured { text } | Self::Flattened { text } => text,
        }
    }

    /// Consume the completion and return its text.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Structured { text } | Self::Flattened { text } => text,
        }
    }

    /// Whether the reply came from a fallback attempt.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Flattened { .. })
    }
}

/// Trait for requesting assistant replies.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Ask for the reply to `request`.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt made. No attempt is retried
    /// beyond the client's own fallback strategy.
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;
}
