//! Core types and text pipeline for the BarberShop sales assistant.
//!
//! This crate holds everything about a conversation that does not touch the
//! network or a clock:
//!
//! - **Identifiers**: [`MessageId`] for chat bubbles, [`Generation`] for
//!   conversation epochs
//! - **Messages**: the append-only [`Message`] record and its [`Sender`]
//! - **Normalizer**: [`normalize`] strips Markdown the model may emit
//! - **Fragmenter**: [`fragment`] splits a long reply into chat bubbles
//! - **Autolinker**: [`linkify`] turns bare URLs into link segments
//!
//! # Example
//!
//! ```
//! use barbershop_chat_core::{fragment, linkify, normalize, FragmentConfig, Segment};
//!
//! let clean = normalize("**Plano Mensal**: R$49,90");
//! assert_eq!(clean, "Plano Mensal: R$49,90");
//!
//! let bubbles = fragment(&clean, &FragmentConfig::default());
//! assert_eq!(bubbles, vec![clean.clone()]);
//!
//! let segments = linkify("Fale com a gente: wa.me/5521997760398");
//! assert!(matches!(segments[1], Segment::Link { .. }));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod fragment;
pub mod ids;
pub mod link;
pub mod message;
pub mod normalize;

pub use fragment::{fragment, FragmentConfig};
pub use ids::{Generation, IdError, MessageId};
pub use link::{contains_link, linkify, Segment};
pub use message::{Message, Sender};
pub use normalize::normalize;
