//! The chat controller: send pipeline, generation guard and staged reveal.
//!
//! The controller owns the [`ConversationStore`]. Network calls and reveal
//! timers run as background tasks and report back through a channel of
//! [`ChatEvent`]s, which the owner feeds into [`ChatController::handle_event`]
//! from its event loop. All state changes therefore happen on one task and no
//! locking is needed.
//!
//! Every event carries the generation it was started under. `clear()` starts a
//! new generation, so a reply or tick that arrives afterwards is dropped.

use std::sync::Arc;

use barbershop_chat_core::{fragment, normalize, Generation, MessageId};
use barbershop_chat_provider::{Completion, CompletionClient, CompletionRequest, ProviderError};
use tokio::sync::mpsc;

use crate::notices::FailureKind;
use crate::reveal::ActiveReveal;
use crate::settings::ChatSettings;
use crate::store::ConversationStore;

/// Capacity of the controller's event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Results of background work, delivered to the controller's owner.
#[derive(Debug)]
pub enum ChatEvent {
    /// The completion call for a send finished.
    Completed {
        /// Generation the send was made under.
        generation: Generation,
        /// Reply or classified failure.
        outcome: Result<Completion, ProviderError>,
    },
    /// Time to show the next bubble (or hide the typing indicator).
    RevealTick {
        /// Generation the reveal was started under.
        generation: Generation,
        /// Reveal sequence number.
        reveal: u64,
    },
}

impl ChatEvent {
    /// The generation this event belongs to.
    #[must_use]
    pub const fn generation(&self) -> Generation {
        match self {
            Self::Completed { generation, .. } | Self::RevealTick { generation, .. } => *generation,
        }
    }
}

/// Drives one conversation.
pub struct ChatController {
    settings: ChatSettings,
    store: ConversationStore,
    client: Arc<dyn CompletionClient>,
    events: mpsc::Sender<ChatEvent>,
    reveal: Option<ActiveReveal>,
    next_reveal: u64,
}

impl ChatController {
    /// Create a controller and the receiver its events arrive on.
    #[must_use]
    pub fn new(
        settings: ChatSettings,
        client: Arc<dyn CompletionClient>,
    ) -> (Self, mpsc::Receiver<ChatEvent>) {
        let (events, receiver) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let store = ConversationStore::new(settings.welcome.clone());
        let controller = Self {
            settings,
            store,
            client,
            events,
            reveal: None,
            next_reveal: 0,
        };
        (controller, receiver)
    }

    /// Get the conversation state.
    #[must_use]
    pub const fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Get the conversation state for input editing.
    pub fn store_mut(&mut self) -> &mut ConversationStore {
        &mut self.store
    }

    /// Get the settings this conversation was mounted with.
    #[must_use]
    pub const fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Whether a multi-bubble reply is still being revealed.
    #[must_use]
    pub const fn is_revealing(&self) -> bool {
        self.reveal.is_some()
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Send whatever is in the input buffer.
    pub fn submit(&mut self) -> Option<MessageId> {
        let text = self.store.input().to_string();
        self.send(&text)
    }

    /// Send a canned suggestion through the normal send path.
    pub fn send_suggestion(&mut self, suggestion: &str) -> Option<MessageId> {
        tracing::debug!(suggestion, "Suggestion chosen");
        self.send(suggestion)
    }

    /// Append `text` as a user message and request a reply.
    ///
    /// Blank text, or a send while another is pending, is a no-op and returns
    /// `None`. With no credential configured the reply is a notice and no
    /// request is made.
    pub fn send(&mut self, text: &str) -> Option<MessageId> {
        if text.trim().is_empty() || self.store.is_pending() {
            tracing::debug!(pending = self.store.is_pending(), "Ignoring send");
            return None;
        }

        // A reply still being revealed is shown in full before the next turn.
        self.flush_reveal();

        let id = self.store.append_user_message(text)?;
        let generation = self.store.generation();

        if !self.settings.has_credential() {
            tracing::warn!(generation = %generation, "No API credential configured");
            self.store.finish_request();
            self.append_notice(FailureKind::MissingCredential);
            return Some(id);
        }

        let messages = self.store.messages();
        let (utterance, history) = messages
            .split_last()
            .map(|(last, history)| (last.text.clone(), history))
            .unwrap_or_default();
        let request = CompletionRequest::new(self.settings.system_prompt.clone(), history, utterance);

        tracing::debug!(
            generation = %generation,
            history = request.history.len(),
            "Sending message"
        );

        let client = Arc::clone(&self.client);
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = client.complete(&request).await;
            if events
                .send(ChatEvent::Completed {
                    generation,
                    outcome,
                })
                .await
                .is_err()
            {
                tracing::debug!(generation = %generation, "Controller gone, dropping reply");
            }
        });

        Some(id)
    }

    /// Reset the conversation. In-flight work from before is discarded.
    pub fn clear(&mut self) {
        self.reveal = None;
        let generation = self.store.clear();
        tracing::debug!(generation = %generation, "Conversation cleared");
    }

    // =========================================================================
    // Event Handling
    // =========================================================================

    /// Apply the result of background work.
    ///
    /// Returns `true` if the UI should be redrawn.
    pub fn handle_event(&mut self, event: ChatEvent) -> bool {
        let current = self.store.generation();
        if event.generation() != current {
            tracing::warn!(
                generation = %event.generation(),
                current = %current,
                "Discarding event from a cleared conversation"
            );
            return false;
        }

        match event {
            ChatEvent::Completed { outcome, .. } => {
                self.store.finish_request();
                match outcome {
                    Ok(completion) => self.deliver(&completion),
                    Err(err) => {
                        let kind = FailureKind::classify(&err);
                        tracing::debug!(generation = %current, kind = ?kind, error = %err, "Reply failed");
                        self.append_notice(kind);
                    }
                }
                true
            }
            ChatEvent::RevealTick { reveal, .. } => self.advance_reveal(reveal),
        }
    }

    fn deliver(&mut self, completion: &Completion) {
        let text = normalize(completion.text());
        if text.is_empty() {
            self.append_notice(FailureKind::EmptyReply);
            return;
        }

        let mut bubbles = fragment(&text, &self.settings.reveal).into_iter();
        let Some(first) = bubbles.next() else {
            self.append_notice(FailureKind::EmptyReply);
            return;
        };
        let remaining: Vec<String> = bubbles.collect();

        tracing::debug!(
            generation = %self.store.generation(),
            fallback = completion.is_fallback(),
            bubbles = remaining.len() + 1,
            "Revealing reply"
        );

        let current = self.store.append_bot_partial(first);
        self.store.set_typing_after(Some(current));

        self.next_reveal += 1;
        self.reveal = Some(ActiveReveal::start(
            self.next_reveal,
            self.store.generation(),
            current,
            remaining,
            self.settings.reveal.reveal_delay(),
            self.events.clone(),
        ));
    }

    fn advance_reveal(&mut self, reveal_id: u64) -> bool {
        let Some(reveal) = self.reveal.as_mut().filter(|r| r.id == reveal_id) else {
            tracing::debug!(reveal = reveal_id, "Ignoring tick from an abandoned reveal");
            return false;
        };

        self.store.mark_complete(reveal.current);
        let next = reveal.remaining.pop_front();
        match next {
            Some(text) => {
                let id = self.store.append_bot_partial(text);
                reveal.current = id;
                self.store.set_typing_after(Some(id));
            }
            None => {
                self.reveal = None;
                self.store.set_typing_after(None);
            }
        }
        true
    }

    /// Show every bubble of the current reveal at once.
    fn flush_reveal(&mut self) {
        let Some(mut reveal) = self.reveal.take() else {
            return;
        };
        self.store.mark_complete(reveal.current);
        while let Some(text) = reveal.remaining.pop_front() {
            self.store.append_bot_message(text);
        }
        self.store.set_typing_after(None);
        debug_assert!(reveal.is_exhausted());
    }

    fn append_notice(&mut self, kind: FailureKind) {
        let text = self.settings.notices.text_for(kind).to_string();
        self.store.append_bot_message(text);
        self.store.set_typing_after(None);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use barbershop_chat_core::Sender;
    use barbershop_chat_provider::Result as ProviderResult;

    use super::*;
    use crate::notices::Notices;

    /// Completion client that replays scripted replies and counts calls.
    #[derive(Default)]
    struct MockClient {
        replies: Mutex<VecDeque<ProviderResult<Completion>>>,
        requests: Mutex<Vec<CompletionRequest>>,
        calls: AtomicUsize,
    }

    impl MockClient {
        fn replying(replies: Vec<ProviderResult<Completion>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                ..Self::default()
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionClient for MockClient {
        async fn complete(&self, request: &CompletionRequest) -> ProviderResult<Completion> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ProviderError::EmptyReply))
        }
    }

    fn structured(text: &str) -> ProviderResult<Completion> {
        Ok(Completion::Structured { text: text.into() })
    }

    fn controller(
        api_key: &str,
        client: Arc<MockClient>,
    ) -> (ChatController, mpsc::Receiver<ChatEvent>) {
        ChatController::new(ChatSettings::new(api_key, "You are Ana."), client)
    }

    fn bot_texts(controller: &ChatController) -> Vec<String> {
        controller
            .store()
            .messages()
            .iter()
            .filter(|m| m.sender == Sender::Bot)
            .map(|m| m.text.clone())
            .collect()
    }

    /// Sentences long enough that each fills its own bubble.
    fn long_reply(sentences: usize) -> String {
        (0..sentences)
            .map(|i| format!("Frase {i} {}.", "x".repeat(150)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[tokio::test]
    async fn short_reply_is_one_normalized_bubble() {
        let client = MockClient::replying(vec![structured(
            "**Plano Mensal**: R$49,90\n\nQuer saber mais?",
        )]);
        let (mut chat, mut rx) = controller("valid-key", client.clone());

        chat.send("Quais os planos?").unwrap();
        assert!(chat.store().is_pending());

        let event = rx.recv().await.unwrap();
        assert!(chat.handle_event(event));

        assert!(!chat.store().is_pending());
        assert_eq!(bot_texts(&chat), ["Plano Mensal: R$49,90\n\nQuer saber mais?"]);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn request_carries_prompt_history_and_utterance() {
        let client = MockClient::replying(vec![structured("Oi!"), structured("Temos dois.")]);
        let settings = ChatSettings::new("valid-key", "You are Ana.").with_welcome("Olá!");
        let (mut chat, mut rx) = ChatController::new(settings, client.clone());

        chat.send("Oi").unwrap();
        let event = rx.recv().await.unwrap();
        chat.handle_event(event);
        chat.send("Quais os planos?").unwrap();
        let event = rx.recv().await.unwrap();
        chat.handle_event(event);

        let requests = client.requests.lock().unwrap();
        let second = &requests[1];
        assert_eq!(second.system_prompt, "You are Ana.");
        assert_eq!(second.utterance, "Quais os planos?");
        let history: Vec<&str> = second.history.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(history, ["Olá!", "Oi", "Oi!"]);
    }

    #[tokio::test]
    async fn double_send_issues_one_call() {
        let client = MockClient::replying(vec![structured("Olá!")]);
        let (mut chat, mut rx) = controller("valid-key", client.clone());

        assert!(chat.send("primeira").is_some());
        assert!(chat.send("segunda").is_none());

        let event = rx.recv().await.unwrap();
        chat.handle_event(event);
        assert_eq!(client.calls(), 1);

        let users = chat.store().messages().iter().filter(|m| m.is_user()).count();
        assert_eq!(users, 1);
    }

    #[tokio::test]
    async fn blank_send_is_ignored() {
        let client = MockClient::replying(vec![]);
        let (mut chat, _rx) = controller("valid-key", client.clone());

        assert!(chat.send("").is_none());
        assert!(chat.send("   ").is_none());
        assert!(chat.submit().is_none());
        assert!(chat.store().messages().is_empty());
        assert!(!chat.store().is_pending());

        tokio::task::yield_now().await;
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn missing_credential_short_circuits() {
        let client = MockClient::replying(vec![]);
        let (mut chat, mut rx) = controller("", client.clone());

        chat.send("Quais os planos?").unwrap();

        assert!(!chat.store().is_pending());
        assert_eq!(bot_texts(&chat), [Notices::default().missing_credential]);
        assert_eq!(chat.store().typing_after(), None);

        drop(chat);
        assert!(rx.recv().await.is_none());
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn failures_become_one_notice() {
        let cases = [
            (ProviderError::from_status(403, ""), Notices::default().invalid_credential),
            (ProviderError::RateLimited, Notices::default().rate_limited),
            (ProviderError::Transport("offline".into()), Notices::default().generic),
            (ProviderError::EmptyReply, Notices::default().empty_reply),
        ];

        for (err, expected) in cases {
            let client = MockClient::replying(vec![Err(err)]);
            let (mut chat, mut rx) = controller("valid-key", client);

            chat.send("Oi").unwrap();
            let event = rx.recv().await.unwrap();
            chat.handle_event(event);

            assert_eq!(bot_texts(&chat), [expected]);
            assert!(!chat.store().is_pending());
        }
    }

    #[tokio::test]
    async fn markup_only_reply_is_empty() {
        let client = MockClient::replying(vec![structured("** **")]);
        let (mut chat, mut rx) = controller("valid-key", client);

        chat.send("Oi").unwrap();
        let event = rx.recv().await.unwrap();
        chat.handle_event(event);

        assert_eq!(bot_texts(&chat), [Notices::default().empty_reply]);
    }

    #[tokio::test]
    async fn submit_sends_input_buffer() {
        let client = MockClient::replying(vec![structured("Olá!")]);
        let (mut chat, _rx) = controller("valid-key", client);

        for c in "Teste grátis".chars() {
            chat.store_mut().insert_char(c);
        }
        chat.submit().unwrap();
        assert_eq!(chat.store().messages()[0].text, "Teste grátis");
        assert_eq!(chat.store().input(), "");
    }

    #[tokio::test]
    async fn suggestion_uses_send_path() {
        let client = MockClient::replying(vec![structured("O BarberShop é...")]);
        let (mut chat, _rx) = controller("valid-key", client);

        assert!(chat.store().show_welcome());
        chat.send_suggestion("💈 O que é o BarberShop?").unwrap();
        assert!(!chat.store().show_welcome());
        assert!(chat.send_suggestion("💰 Quais os planos?").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn long_reply_reveals_in_order_with_typing_gaps() {
        let client = MockClient::replying(vec![structured(&long_reply(3))]);
        let (mut chat, mut rx) = controller("valid-key", client);

        chat.send("Conte mais").unwrap();
        let event = rx.recv().await.unwrap();
        chat.handle_event(event);

        // First bubble is shown at once, incomplete, with the indicator after it.
        let first = chat.store().messages()[1].clone();
        assert!(!first.is_complete);
        assert_eq!(chat.store().typing_after(), Some(first.id));
        assert!(chat.is_revealing());

        let start = tokio::time::Instant::now();
        let event = rx.recv().await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
        assert!(chat.handle_event(event));

        let messages = chat.store().messages();
        assert_eq!(messages.len(), 3);
        assert!(messages[1].is_complete);
        assert!(!messages[2].is_complete);
        assert_eq!(chat.store().typing_after(), Some(messages[2].id));

        let event = rx.recv().await.unwrap();
        chat.handle_event(event);
        assert_eq!(chat.store().messages().len(), 4);

        // Final tick hides the indicator.
        let event = rx.recv().await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(4500));
        chat.handle_event(event);
        assert_eq!(chat.store().typing_after(), None);
        assert!(!chat.is_revealing());
        assert!(chat.store().messages().iter().all(|m| m.is_complete));

        let texts = bot_texts(&chat);
        assert_eq!(texts.len(), 3);
        assert!(texts[0].starts_with("Frase 0"));
        assert!(texts[2].starts_with("Frase 2"));
    }

    #[tokio::test(start_paused = true)]
    async fn single_bubble_gets_typing_pulse() {
        let client = MockClient::replying(vec![structured("Olá!")]);
        let (mut chat, mut rx) = controller("valid-key", client);

        chat.send("Oi").unwrap();
        let event = rx.recv().await.unwrap();
        chat.handle_event(event);
        let bubble = chat.store().messages()[1].id;
        assert_eq!(chat.store().typing_after(), Some(bubble));

        let event = rx.recv().await.unwrap();
        chat.handle_event(event);
        assert_eq!(chat.store().typing_after(), None);
        assert!(chat.store().messages()[1].is_complete);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_drops_pending_reveal() {
        let client = MockClient::replying(vec![structured(&long_reply(3))]);
        let (mut chat, mut rx) = controller("valid-key", client);

        chat.send("Conte mais").unwrap();
        let event = rx.recv().await.unwrap();
        chat.handle_event(event);

        chat.clear();
        assert!(chat.store().messages().is_empty());
        assert!(!chat.is_revealing());

        // Ticks already queued are stale; no more are produced.
        while let Ok(Some(event)) =
            tokio::time::timeout(Duration::from_secs(10), rx.recv()).await
        {
            assert!(!chat.handle_event(event));
        }
        assert!(chat.store().messages().is_empty());
    }

    #[tokio::test]
    async fn stale_reply_after_clear_is_discarded() {
        let client = MockClient::replying(vec![structured("Tarde demais")]);
        let (mut chat, mut rx) = controller("valid-key", client);

        chat.send("Oi").unwrap();
        chat.clear();
        assert!(!chat.store().is_pending());

        let event = rx.recv().await.unwrap();
        assert!(!chat.handle_event(event));
        assert!(chat.store().messages().is_empty());
        assert!(!chat.store().is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn sending_mid_reveal_flushes_remaining_bubbles() {
        let client = MockClient::replying(vec![structured(&long_reply(3)), structured("Ok!")]);
        let (mut chat, mut rx) = controller("valid-key", client);

        chat.send("Conte mais").unwrap();
        let event = rx.recv().await.unwrap();
        chat.handle_event(event);
        assert!(chat.is_revealing());

        chat.send("Entendi").unwrap();
        assert!(!chat.is_revealing());

        let senders: Vec<Sender> = chat.store().messages().iter().map(|m| m.sender).collect();
        assert_eq!(
            senders,
            [Sender::User, Sender::Bot, Sender::Bot, Sender::Bot, Sender::User]
        );
        assert!(chat.store().messages()[1..4].iter().all(|m| m.is_complete));
    }
}
