//! Provider error types.

use thiserror::Error;

/// A result type using `ProviderError`.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur while asking a completion API for a reply.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The credential was rejected (401 or 403).
    #[error("unauthorized (status {status})")]
    Unauthorized {
        /// HTTP status returned by the provider.
        status: u16,
    },

    /// The provider is throttling requests (429).
    #[error("rate limited")]
    RateLimited,

    /// Any other non-success status.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status returned by the provider.
        status: u16,
        /// Error detail extracted from the response body.
        message: String,
    },

    /// The response did not have the expected shape.
    #[error("unexpected response format: {0}")]
    Parse(String),

    /// The provider answered successfully but produced no text.
    #[error("empty reply")]
    EmptyReply,

    /// Connection, timeout or stream read failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ProviderError {
    /// Classify a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { status },
            429 => Self::RateLimited,
            _ => Self::Api {
                status,
                message: message.into(),
            },
        }
    }

    /// Returns `true` if the next attempt in the fallback strategy should run.
    ///
    /// Credential, throttling and network failures end the strategy at once.
    #[must_use]
    pub const fn allows_fallback(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::Parse(_) | Self::EmptyReply)
    }

    /// Returns the HTTP status behind this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status } | Self::Api { status, .. } => Some(*status),
            Self::RateLimited => Some(429),
            Self::Parse(_) | Self::EmptyReply | Self::Transport(_) => None,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    /// The request URL is stripped: Gemini carries the API key in the query.
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url().to_string())
    }
}
