//! Completion API clients for the BarberShop sales assistant.
//!
//! This crate turns a conversation into a provider request, performs the HTTP
//! call and hands back the finished assistant text:
//!
//! - [`CompletionRequest`]: provider-neutral prompt, history and utterance
//! - [`GeminiBackend`]: whole-JSON `generateContent` calls
//! - [`GroqBackend`]: OpenAI-style chat completions read as server-sent events
//! - [`ResponseTransport`]: runs the `[primary, fallback]` attempt strategy
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌────────────────────┐
//! │  Chat controller │────▶│  CompletionClient  │
//! │                  │     │  (trait)           │
//! └──────────────────┘     └─────────┬──────────┘
//!                                    │
//!                          ┌─────────▼──────────┐
//!                          │ ResponseTransport  │
//!                          │ primary → fallback │
//!                          └─────────┬──────────┘
//!                                    │
//!                          ┌─────────▼──────────┐
//!                          │  ProviderBackend   │
//!                          │  Gemini | Groq     │
//!                          └─────────┬──────────┘
//!                                    │ HTTPS
//!                                    ▼
//! ```
//!
//! # Example
//!
//! ```no_run
//! use barbershop_chat_provider::{
//!     connect, CompletionClient, CompletionRequest, ProviderConfig, ProviderKind,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProviderConfig::new(ProviderKind::Gemini);
//! let client = connect(&config, "my-api-key")?;
//!
//! let request = CompletionRequest::new("You are Ana.", &[], "Quais os planos?");
//! let completion = client.complete(&request).await?;
//! println!("{}", completion.text());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod config;
pub mod error;
pub mod gemini;
pub mod groq;
pub mod request;
pub mod sse;
pub mod transport;

pub use client::{Completion, CompletionClient};
pub use config::{GenerationConfig, ProviderConfig, ProviderKind, UnknownProvider};
pub use error::{ProviderError, Result};
pub use gemini::GeminiBackend;
pub use groq::GroqBackend;
pub use request::{CompletionRequest, Turn};
pub use transport::{connect, Attempt, ProviderBackend, ResponseTransport, Shape};
