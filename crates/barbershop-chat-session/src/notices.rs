//! User-facing notices for failed turns.
//!
//! Every failure of a send ends as exactly one synthetic bot message. The
//! texts are configurable; the defaults are the ones the widget shipped with.

use barbershop_chat_provider::ProviderError;
use serde::Deserialize;

/// Why a turn produced a notice instead of a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// No credential configured; no request was made.
    MissingCredential,
    /// The provider rejected the credential.
    InvalidCredential,
    /// The provider is throttling requests.
    RateLimited,
    /// The provider answered but produced no usable text.
    EmptyReply,
    /// Anything else: server errors, malformed replies, network failures.
    Generic,
}

impl FailureKind {
    /// Classify a provider error.
    #[must_use]
    pub const fn classify(err: &ProviderError) -> Self {
        match err {
            ProviderError::Unauthorized { .. } => Self::InvalidCredential,
            ProviderError::RateLimited => Self::RateLimited,
            ProviderError::EmptyReply => Self::EmptyReply,
            ProviderError::Api { .. } | ProviderError::Parse(_) | ProviderError::Transport(_) => {
                Self::Generic
            }
        }
    }
}

/// Texts shown for each [`FailureKind`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Notices {
    /// Shown when no credential is configured.
    #[serde(default = "Notices::default_missing_credential")]
    pub missing_credential: String,

    /// Shown on 401/403.
    #[serde(default = "Notices::default_invalid_credential")]
    pub invalid_credential: String,

    /// Shown on 429.
    #[serde(default = "Notices::default_rate_limited")]
    pub rate_limited: String,

    /// Shown when the reply is empty after cleanup.
    #[serde(default = "Notices::default_empty_reply")]
    pub empty_reply: String,

    /// Shown for every other failure.
    #[serde(default = "Notices::default_generic")]
    pub generic: String,
}

impl Notices {
    fn default_missing_credential() -> String {
        "⚠️ API Key não configurada. Configure BARBERCHAT_API_KEY no ambiente.".to_string()
    }

    fn default_invalid_credential() -> String {
        "❌ API Key inválida. Verifique sua chave de acesso.".to_string()
    }

    fn default_rate_limited() -> String {
        "⏳ Limite de requisições atingido. Aguarde um momento.".to_string()
    }

    fn default_empty_reply() -> String {
        "Desculpe, não consegui gerar uma resposta.".to_string()
    }

    fn default_generic() -> String {
        "Desculpe, ocorreu um erro ao processar sua mensagem. \
         Por favor, verifique sua conexão e tente novamente."
            .to_string()
    }

    /// Get the text for `kind`.
    #[must_use]
    pub fn text_for(&self, kind: FailureKind) -> &str {
        match kind {
            FailureKind::MissingCredential => &self.missing_credential,
            FailureKind::InvalidCredential => &self.invalid_credential,
            FailureKind::RateLimited => &self.rate_limited,
            FailureKind::EmptyReply => &self.empty_reply,
            FailureKind::Generic => &self.generic,
        }
    }
}

impl Default for Notices {
    fn default() -> Self {
        Self {
            missing_credential: Self::default_missing_credential(),
            invalid_credential: Self::default_invalid_credential(),
            rate_limited: Self::default_rate_limited(),
            empty_reply: Self::default_empty_reply(),
            generic: Self::default_generic(),
        }
    }
}
