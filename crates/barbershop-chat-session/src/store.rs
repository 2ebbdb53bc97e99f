//! Conversation state store.
//!
//! One store per mounted conversation. It holds the append-only message list,
//! the input buffer, the pending flag and the generation counter, and records
//! the UI effects each mutation implies.

use barbershop_chat_core::{Generation, Message, MessageId};

/// A side effect the front end should apply after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEffect {
    /// Scroll the message list to the newest message.
    ScrollToLatest,
    /// Give keyboard focus back to the input box.
    FocusInput,
}

/// State of a single conversation.
#[derive(Debug)]
pub struct ConversationStore {
    messages: Vec<Message>,
    welcome: Option<String>,
    input: String,
    /// Cursor position in characters, not bytes.
    cursor: usize,
    pending: bool,
    show_welcome: bool,
    generation: Generation,
    typing_after: Option<MessageId>,
    effects: Vec<UiEffect>,
}

impl ConversationStore {
    /// Create a store, seeded with `welcome` as a bot message if given.
    #[must_use]
    pub fn new(welcome: Option<String>) -> Self {
        let mut store = Self {
            messages: Vec::new(),
            welcome,
            input: String::new(),
            cursor: 0,
            pending: false,
            show_welcome: true,
            generation: Generation::INITIAL,
            typing_after: None,
            effects: Vec::new(),
        };
        store.seed();
        store
    }

    fn seed(&mut self) {
        if let Some(welcome) = &self.welcome {
            self.messages.push(Message::bot(welcome.clone()));
        }
    }

    fn initial_len(&self) -> usize {
        usize::from(self.welcome.is_some())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Messages in creation order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Current input buffer.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Cursor position in the input buffer, in characters.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether a request is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Whether no message has been sent since mount or the last clear.
    #[must_use]
    pub const fn show_welcome(&self) -> bool {
        self.show_welcome
    }

    /// Current conversation epoch.
    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// Message after which the typing indicator is drawn, if shown.
    #[must_use]
    pub const fn typing_after(&self) -> Option<MessageId> {
        self.typing_after
    }

    /// Whether the conversation holds more than its initial content.
    #[must_use]
    pub fn can_clear(&self) -> bool {
        self.messages.len() > self.initial_len()
    }

    /// Take the effects recorded since the last call.
    pub fn drain_effects(&mut self) -> Vec<UiEffect> {
        std::mem::take(&mut self.effects)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Append a user message and mark a request as pending.
    ///
    /// Returns `None` without touching state when `text` is blank or a request
    /// is already pending.
    pub fn append_user_message(&mut self, text: &str) -> Option<MessageId> {
        let text = text.trim();
        if text.is_empty() || self.pending {
            return None;
        }

        let message = Message::user(text);
        let id = message.id;
        self.messages.push(message);
        self.clear_input();
        self.pending = true;
        self.show_welcome = false;
        self.typing_after = Some(id);
        self.record_append();
        Some(id)
    }

    /// Append a finished bot message.
    pub fn append_bot_message(&mut self, text: impl Into<String>) -> MessageId {
        self.push_bot(Message::bot(text))
    }

    /// Append a bot bubble whose reveal step is still running.
    pub fn append_bot_partial(&mut self, text: impl Into<String>) -> MessageId {
        self.push_bot(Message::bot_partial(text))
    }

    fn push_bot(&mut self, message: Message) -> MessageId {
        let id = message.id;
        self.messages.push(message);
        self.record_append();
        id
    }

    fn record_append(&mut self) {
        self.effects.push(UiEffect::ScrollToLatest);
        if !self.pending {
            self.effects.push(UiEffect::FocusInput);
        }
    }

    /// Flip a bubble's `is_complete` flag to `true`. Unknown IDs are ignored.
    pub fn mark_complete(&mut self, id: MessageId) {
        if let Some(message) = self.messages.iter_mut().rev().find(|m| m.id == id) {
            message.is_complete = true;
        }
    }

    /// Move the typing indicator (or hide it with `None`).
    pub fn set_typing_after(&mut self, id: Option<MessageId>) {
        self.typing_after = id;
    }

    /// Release the pending flag.
    pub fn finish_request(&mut self) {
        self.pending = false;
    }

    /// Reset to the initial state and start a new generation.
    ///
    /// Work tagged with an older generation must be dropped by its owner.
    pub fn clear(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.messages.clear();
        self.seed();
        self.clear_input();
        self.pending = false;
        self.show_welcome = true;
        self.typing_after = None;
        self.effects.push(UiEffect::FocusInput);
        self.generation
    }

    // =========================================================================
    // Input Editing
    // =========================================================================

    fn byte_offset(&self, char_index: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_index)
            .map_or(self.input.len(), |(offset, _)| offset)
    }

    fn input_chars(&self) -> usize {
        self.input.chars().count()
    }

    /// Insert a character at the cursor. Ignored while pending.
    pub fn insert_char(&mut self, c: char) {
        if self.pending {
            return;
        }
        let offset = self.byte_offset(self.cursor);
        self.input.insert(offset, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor. Ignored while pending.
    pub fn delete_char(&mut self) {
        if self.pending || self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let offset = self.byte_offset(self.cursor);
        self.input.remove(offset);
    }

    /// Delete the character at the cursor. Ignored while pending.
    pub fn delete_char_forward(&mut self) {
        if self.pending || self.cursor >= self.input_chars() {
            return;
        }
        let offset = self.byte_offset(self.cursor);
        self.input.remove(offset);
    }

    /// Move the cursor left.
    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move the cursor right.
    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.input_chars() {
            self.cursor += 1;
        }
    }

    /// Move the cursor to the start.
    pub fn move_cursor_start(&mut self) {
        self.cursor = 0;
    }

    /// Move the cursor to the end.
    pub fn move_cursor_end(&mut self) {
        self.cursor = self.input_chars();
    }

    /// Clear the input buffer.
    pub fn clear_input(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }
}
