//! Outbound request building.
//!
//! A [`CompletionRequest`] carries the provider-neutral conversation: the
//! system prompt, the prior turns and the new utterance. Provider adapters turn
//! it into one of two wire shapes. The structured shape sends one role-tagged
//! entry per turn. The flattened shape, used for fallback attempts, packs the
//! whole transcript into a single text block with role labels.
//!
//! No truncation happens here; the full history is sent on every turn.

use barbershop_chat_core::{Message, Sender};
use serde::Serialize;

use crate::config::GenerationConfig;

/// One prior turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Who said it.
    pub sender: Sender,
    /// What was said.
    pub text: String,
}

/// A provider-neutral request for the next assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Fixed persona and sales script, always sent first.
    pub system_prompt: String,
    /// Prior turns in chronological order.
    pub history: Vec<Turn>,
    /// The new user utterance, always sent last.
    pub utterance: String,
}

impl CompletionRequest {
    /// Build a request from the messages that precede `utterance`.
    #[must_use]
    pub fn new(
        system_prompt: impl Into<String>,
        history: &[Message],
        utterance: impl Into<String>,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            history: history
                .iter()
                .map(|message| Turn {
                    sender: message.sender,
                    text: message.text.clone(),
                })
                .collect(),
            utterance: utterance.into(),
        }
    }

    /// Render the whole conversation as one labelled text block.
    #[must_use]
    pub fn flattened_text(&self) -> String {
        let transcript = self
            .history
            .iter()
            .map(|turn| format!("{}: {}", turn.sender.transcript_label(), turn.text))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "{}\n\nHistórico de conversa:\n{}\n\n{}: {}",
            self.system_prompt,
            transcript,
            Sender::User.transcript_label(),
            self.utterance
        )
    }
}

// ============================================================================
// Gemini
// ============================================================================

/// Body of a Gemini `generateContent` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    top_p: f32,
    max_output_tokens: u32,
}

impl From<GenerationConfig> for GeminiGenerationConfig {
    fn from(config: GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

impl GeminiContent {
    fn new(role: Option<&'static str>, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![GeminiPart { text: text.into() }],
        }
    }
}

const fn gemini_role(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "user",
        Sender::Bot => "model",
    }
}

impl GeminiRequest {
    /// One content entry per turn.
    ///
    /// Gemini has no system role here, so the prompt goes first as a `model`
    /// entry.
    #[must_use]
    pub fn structured(request: &CompletionRequest, generation: GenerationConfig) -> Self {
        let mut contents = Vec::with_capacity(request.history.len() + 2);
        contents.push(GeminiContent::new(
            Some(gemini_role(Sender::Bot)),
            request.system_prompt.clone(),
        ));
        contents.extend(
            request
                .history
                .iter()
                .map(|turn| GeminiContent::new(Some(gemini_role(turn.sender)), turn.text.clone())),
        );
        contents.push(GeminiContent::new(
            Some(gemini_role(Sender::User)),
            request.utterance.clone(),
        ));

        Self {
            contents,
            generation_config: generation.into(),
        }
    }

    /// A single role-less content entry holding the flattened transcript.
    #[must_use]
    pub fn flattened(request: &CompletionRequest, generation: GenerationConfig) -> Self {
        Self {
            contents: vec![GeminiContent::new(None, request.flattened_text())],
            generation_config: generation.into(),
        }
    }
}

// ============================================================================
// OpenAI-style chat completions (Groq)
// ============================================================================

/// Body of an OpenAI-compatible `chat/completions` call.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_completion_tokens: u32,
    top_p: f32,
    stream: bool,
    stop: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

const fn chat_role(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "user",
        Sender::Bot => "assistant",
    }
}

impl ChatRequest {
    /// A `system` message, one message per turn, then the utterance.
    #[must_use]
    pub fn structured(
        request: &CompletionRequest,
        model: impl Into<String>,
        generation: GenerationConfig,
    ) -> Self {
        let mut messages = Vec::with_capacity(request.history.len() + 2);
        messages.push(ChatMessage {
            role: "system",
            content: request.system_prompt.clone(),
        });
        messages.extend(request.history.iter().map(|turn| ChatMessage {
            role: chat_role(turn.sender),
            content: turn.text.clone(),
        }));
        messages.push(ChatMessage {
            role: chat_role(Sender::User),
            content: request.utterance.clone(),
        });

        Self::with_messages(model, messages, generation)
    }

    /// A single user message holding the flattened transcript.
    #[must_use]
    pub fn flattened(
        request: &CompletionRequest,
        model: impl Into<String>,
        generation: GenerationConfig,
    ) -> Self {
        let messages = vec![ChatMessage {
            role: chat_role(Sender::User),
            content: request.flattened_text(),
        }];
        Self::with_messages(model, messages, generation)
    }

    fn with_messages(
        model: impl Into<String>,
        messages: Vec<ChatMessage>,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: generation.temperature,
            max_completion_tokens: generation.max_output_tokens,
            top_p: generation.top_p,
            stream: true,
            stop: None,
        }
    }
}
