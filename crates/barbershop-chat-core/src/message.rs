//! The conversation message record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::MessageId;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The visitor typing into the widget.
    User,
    /// The assistant, including synthetic notices.
    Bot,
}

impl Sender {
    /// Human-readable label used when a conversation is flattened to text.
    #[must_use]
    pub const fn transcript_label(self) -> &'static str {
        match self {
            Self::User => "Usuário",
            Self::Bot => "Assistente",
        }
    }
}

/// One chat bubble.
///
/// Text and sender are fixed at creation. Only `is_complete` may change, and
/// only from `false` to `true` once the bubble's reveal step is over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique ID within the conversation.
    pub id: MessageId,
    /// Plain text content.
    pub text: String,
    /// Producer of this message.
    pub sender: Sender,
    /// Whether the bubble's staged reveal has finished.
    pub is_complete: bool,
    /// When the message was appended.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a user message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User, true)
    }

    /// Create a bot message.
    #[must_use]
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot, true)
    }

    /// Create a bot message that is still part of an ongoing reveal.
    #[must_use]
    pub fn bot_partial(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot, false)
    }

    fn new(text: impl Into<String>, sender: Sender, is_complete: bool) -> Self {
        Self {
            id: MessageId::generate(),
            text: text.into(),
            sender,
            is_complete,
            created_at: Utc::now(),
        }
    }

    /// Check if this is a user message.
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    /// Display time as `HH:MM` in local time.
    #[must_use]
    pub fn display_time(&self) -> String {
        self.created_at
            .with_timezone(&chrono::Local)
            .format("%H:%M")
            .to_string()
    }
}
