//! Chat settings supplied when a conversation is mounted.

use std::path::Path;

use barbershop_chat_core::FragmentConfig;
use serde::Deserialize;

use crate::error::{ConfigError, Result};
use crate::notices::Notices;

/// Greeting seeded into the floating widget's conversation.
pub const DEFAULT_WELCOME: &str = "Olá, como posso ajudar hoje?";

/// Canned questions offered on the welcome panel.
pub const SUGGESTIONS: [&str; 4] = [
    "💈 O que é o BarberShop?",
    "💰 Quais os planos?",
    "🆓 Teste grátis",
    "📊 Funcionalidades",
];

/// Everything a conversation needs besides its completion client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatSettings {
    /// API credential. Empty means "not configured".
    #[serde(default)]
    pub api_key: String,

    /// Fixed persona and sales script, sent with every request.
    pub system_prompt: String,

    /// Synthetic bot greeting the conversation starts with, if any.
    #[serde(default)]
    pub welcome: Option<String>,

    /// Failure texts.
    #[serde(default)]
    pub notices: Notices,

    /// Bubble splitting and reveal tuning.
    #[serde(default)]
    pub reveal: FragmentConfig,
}

impl ChatSettings {
    /// Create settings with default notices, reveal tuning and no welcome.
    #[must_use]
    pub fn new(api_key: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            system_prompt: system_prompt.into(),
            welcome: None,
            notices: Notices::default(),
            reveal: FragmentConfig::default(),
        }
    }

    /// Seed the conversation with a greeting.
    #[must_use]
    pub fn with_welcome(mut self, welcome: impl Into<String>) -> Self {
        self.welcome = Some(welcome.into());
        self
    }

    /// Replace the reveal tuning.
    #[must_use]
    pub fn with_reveal(mut self, reveal: FragmentConfig) -> Self {
        self.reveal = reveal;
        self
    }

    /// Whether a credential is configured.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Read a system prompt from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::EmptyPrompt`] if it holds only whitespace.
    pub fn load_system_prompt(path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let prompt = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ConfigError::EmptyPrompt(path.to_path_buf()));
        }

        tracing::debug!(path = %path.display(), chars = prompt.chars().count(), "Loaded system prompt");
        Ok(prompt.to_string())
    }
}
