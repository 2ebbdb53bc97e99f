//! Provider configuration.
//!
//! Every field except the provider kind is optional; unset fields resolve to
//! the defaults of the chosen provider.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Which completion API to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Gemini `generateContent`, whole-JSON responses.
    Gemini,
    /// Groq OpenAI-compatible chat completions, streamed as SSE.
    #[default]
    Groq,
}

impl ProviderKind {
    /// Return the lowercase name of this provider.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Groq => "groq",
        }
    }

    const fn default_base_url(self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com",
            Self::Groq => "https://api.groq.com",
        }
    }

    const fn default_primary_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.0-flash",
            Self::Groq => "openai/gpt-oss-120b",
        }
    }

    const fn default_fallback_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-pro",
            Self::Groq => "llama-3.1-8b-instant",
        }
    }

    const fn default_generation(self) -> GenerationConfig {
        match self {
            Self::Gemini => GenerationConfig {
                temperature: 0.7,
                top_k: Some(40),
                top_p: 0.95,
                max_output_tokens: 1024,
            },
            Self::Groq => GenerationConfig {
                temperature: 1.0,
                top_k: None,
                top_p: 1.0,
                max_output_tokens: 8192,
            },
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown provider name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider `{0}` (expected `gemini` or `groq`)")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "groq" => Ok(Self::Groq),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GenerationConfig {
    /// Sampling temperature.
    pub temperature: f32,
    /// Top-k sampling cutoff. Only Gemini accepts it.
    #[serde(default)]
    pub top_k: Option<u32>,
    /// Nucleus sampling cutoff.
    pub top_p: f32,
    /// Upper bound on generated tokens.
    pub max_output_tokens: u32,
}

/// Configuration for a completion provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderConfig {
    /// Which API to call.
    #[serde(default)]
    pub kind: ProviderKind,

    /// API root, without a trailing slash.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Model used for the first attempt.
    #[serde(default)]
    pub primary_model: Option<String>,

    /// Model used for the single fallback attempt.
    #[serde(default)]
    pub fallback_model: Option<String>,

    /// Sampling parameters.
    #[serde(default)]
    pub generation: Option<GenerationConfig>,

    /// Per-attempt request timeout in seconds.
    #[serde(default = "ProviderConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    const fn default_timeout_secs() -> u64 {
        30
    }

    /// Create a configuration with every default of `kind`.
    #[must_use]
    pub const fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            base_url: None,
            primary_model: None,
            fallback_model: None,
            generation: None,
            timeout_secs: Self::default_timeout_secs(),
        }
    }

    /// Override the API root (used to point at a mock server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Get the API root, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.kind.default_base_url())
            .trim_end_matches('/')
    }

    /// Get the model for the first attempt.
    #[must_use]
    pub fn primary_model(&self) -> &str {
        self.primary_model
            .as_deref()
            .unwrap_or_else(|| self.kind.default_primary_model())
    }

    /// Get the model for the fallback attempt.
    #[must_use]
    pub fn fallback_model(&self) -> &str {
        self.fallback_model
            .as_deref()
            .unwrap_or_else(|| self.kind.default_fallback_model())
    }

    /// Get the sampling parameters.
    #[must_use]
    pub fn generation(&self) -> GenerationConfig {
        self.generation
            .unwrap_or_else(|| self.kind.default_generation())
    }

    /// Get the per-attempt timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new(ProviderKind::default())
    }
}
