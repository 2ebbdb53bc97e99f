//! Application state.
//!
//! Wraps the [`ChatController`] with the terminal-only state: scroll offset,
//! suggestion selection, input focus and the animation frame. Conversation
//! state itself lives in the controller's store.

use barbershop_chat_provider::ProviderKind;
use barbershop_chat_session::{ChatController, ChatEvent, ConversationStore, UiEffect, SUGGESTIONS};

/// Application state.
pub struct App {
    chat: ChatController,
    provider: ProviderKind,
    /// Chat scroll position, in lines up from the bottom.
    pub chat_scroll: usize,
    /// Highlighted suggestion on the welcome panel.
    pub selected_suggestion: Option<usize>,
    /// Whether the input box has keyboard focus.
    pub input_focused: bool,
    /// Whether the app should quit.
    pub should_quit: bool,
    animation_frame: usize,
}

impl App {
    /// Create the app around a mounted conversation.
    #[must_use]
    pub fn new(chat: ChatController, provider: ProviderKind) -> Self {
        Self {
            chat,
            provider,
            chat_scroll: 0,
            selected_suggestion: None,
            input_focused: true,
            should_quit: false,
            animation_frame: 0,
        }
    }

    /// Conversation state.
    #[must_use]
    pub const fn store(&self) -> &ConversationStore {
        self.chat.store()
    }

    /// Provider answering this conversation.
    #[must_use]
    pub const fn provider(&self) -> ProviderKind {
        self.provider
    }

    /// Whether the controller is waiting on a reply or revealing one.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.store().is_pending() || self.chat.is_revealing()
    }

    /// Tick the animation frame (call on each render).
    pub fn tick_animation(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }

    /// Current frame of the typing indicator.
    #[must_use]
    pub fn typing_dots(&self) -> &'static str {
        const DOTS: [&str; 4] = ["   ", ".  ", ".. ", "..."];
        DOTS[(self.animation_frame / 3) % DOTS.len()]
    }

    // =========================================================================
    // Conversation
    // =========================================================================

    /// Apply a background event. Returns true if the screen should redraw.
    pub fn handle_chat_event(&mut self, event: ChatEvent) -> bool {
        let changed = self.chat.handle_event(event);
        self.apply_effects();
        changed
    }

    /// Send the input buffer, or the highlighted suggestion if the buffer is
    /// empty.
    pub fn submit(&mut self) {
        let suggestion = self
            .selected_suggestion
            .filter(|_| self.store().show_welcome() && self.store().input().trim().is_empty());

        let sent = match suggestion {
            Some(index) => self.chat.send_suggestion(SUGGESTIONS[index]),
            None => self.chat.submit(),
        };

        if sent.is_some() {
            self.selected_suggestion = None;
            self.input_focused = false;
        }
        self.apply_effects();
    }

    /// Start over, if there is anything to clear.
    pub fn clear_conversation(&mut self) {
        if !self.store().can_clear() {
            return;
        }
        self.chat.clear();
        self.selected_suggestion = None;
        self.chat_scroll = 0;
        self.apply_effects();
    }

    /// Highlight the next suggestion (welcome panel only).
    pub fn next_suggestion(&mut self) {
        if !self.store().show_welcome() {
            return;
        }
        self.selected_suggestion = Some(match self.selected_suggestion {
            Some(i) => (i + 1) % SUGGESTIONS.len(),
            None => 0,
        });
    }

    /// Highlight the previous suggestion (welcome panel only).
    pub fn prev_suggestion(&mut self) {
        if !self.store().show_welcome() {
            return;
        }
        self.selected_suggestion = Some(match self.selected_suggestion {
            Some(0) | None => SUGGESTIONS.len() - 1,
            Some(i) => i - 1,
        });
    }

    fn apply_effects(&mut self) {
        for effect in self.chat.store_mut().drain_effects() {
            match effect {
                UiEffect::ScrollToLatest => self.chat_scroll = 0,
                UiEffect::FocusInput => self.input_focused = true,
            }
        }
    }

    // =========================================================================
    // Scrolling
    // =========================================================================

    /// Scroll chat up (view older messages).
    pub fn scroll_chat_up(&mut self, amount: usize) {
        self.chat_scroll = self.chat_scroll.saturating_add(amount);
    }

    /// Scroll chat down (view newer messages).
    pub fn scroll_chat_down(&mut self, amount: usize) {
        self.chat_scroll = self.chat_scroll.saturating_sub(amount);
    }

    // =========================================================================
    // Input Handling
    // =========================================================================

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, c: char) {
        self.chat.store_mut().insert_char(c);
    }

    /// Delete the character before the cursor.
    pub fn delete_char(&mut self) {
        self.chat.store_mut().delete_char();
    }

    /// Delete the character at the cursor.
    pub fn delete_char_forward(&mut self) {
        self.chat.store_mut().delete_char_forward();
    }

    /// Move cursor left.
    pub fn move_cursor_left(&mut self) {
        self.chat.store_mut().move_cursor_left();
    }

    /// Move cursor right.
    pub fn move_cursor_right(&mut self) {
        self.chat.store_mut().move_cursor_right();
    }

    /// Move cursor to start.
    pub fn move_cursor_start(&mut self) {
        self.chat.store_mut().move_cursor_start();
    }

    /// Move cursor to end.
    pub fn move_cursor_end(&mut self) {
        self.chat.store_mut().move_cursor_end();
    }
}
