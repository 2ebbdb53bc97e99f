//! Conversation state and reply pipeline for the BarberShop sales assistant.
//!
//! A [`ChatController`] owns one conversation. Sending a message appends it to
//! the [`ConversationStore`], asks the completion client for a reply in the
//! background, cleans the reply up and reveals it as one to three bubbles.
//!
//! ```text
//! send ─▶ store (pending) ─▶ CompletionClient ─▶ ChatEvent::Completed
//!                                                     │
//!                  normalize ─▶ fragment ─▶ first bubble, then RevealTick…
//! ```
//!
//! The owner runs the event loop: it drains the receiver returned by
//! [`ChatController::new`] and passes each event to
//! [`ChatController::handle_event`].
//!
//! # Example
//!
//! ```no_run
//! use barbershop_chat_provider::{connect, ProviderConfig};
//! use barbershop_chat_session::{ChatController, ChatSettings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = connect(&ProviderConfig::default(), "my-api-key")?;
//! let settings = ChatSettings::new("my-api-key", "Você é a Ana.");
//! let (mut chat, mut events) = ChatController::new(settings, client);
//!
//! chat.send("Quais os planos?");
//! while let Some(event) = events.recv().await {
//!     chat.handle_event(event);
//!     if !chat.store().is_pending() && !chat.is_revealing() {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod controller;
pub mod error;
pub mod notices;
mod reveal;
pub mod settings;
pub mod store;

pub use controller::{ChatController, ChatEvent};
pub use error::{ConfigError, Result};
pub use notices::{FailureKind, Notices};
pub use settings::{ChatSettings, DEFAULT_WELCOME, SUGGESTIONS};
pub use store::{ConversationStore, UiEffect};
