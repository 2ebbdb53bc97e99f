//! Identifier types for conversations.
//!
//! Message IDs only need to be unique within one conversation's lifetime, so
//! they are time-ordered UUIDs (v7): a millisecond timestamp followed by random
//! bits. Generations tag the epoch a conversation is in and are bumped on every
//! reset.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Prefix used in the display form of a [`MessageId`].
const MESSAGE_ID_PREFIX: &str = "msg-";

/// A unique identifier for a single chat bubble.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageId(uuid::Uuid);

impl MessageId {
    /// Generate a new time-ordered `MessageId`.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Create a `MessageId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Return the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl FromStr for MessageId {
    type Err = IdError;

    /// Parse a `MessageId` from its `msg-<uuid>` display form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .strip_prefix(MESSAGE_ID_PREFIX)
            .ok_or(IdError::MissingPrefix)?;
        let uuid = uuid::Uuid::parse_str(raw).map_err(|_| IdError::InvalidUuid)?;
        Ok(Self(uuid))
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self.0.simple())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{MESSAGE_ID_PREFIX}{}", self.0.simple())
    }
}

impl TryFrom<String> for MessageId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MessageId> for String {
    fn from(id: MessageId) -> Self {
        id.to_string()
    }
}

/// A monotonically increasing conversation epoch.
///
/// Work started under one generation (a provider call, a delayed bubble) must
/// be dropped once the conversation has moved on to a later one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    /// The first generation of a freshly mounted conversation.
    pub const INITIAL: Self = Self(0);

    /// Return the generation that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Return the raw counter value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input does not start with `msg-`.
    #[error("missing `msg-` prefix")]
    MissingPrefix,

    /// The input is not a valid UUID.
    #[error("invalid UUID format")]
    InvalidUuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_id_roundtrip() {
        let id = MessageId::generate();
        let parsed: MessageId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn message_id_display_has_prefix() {
        let id = MessageId::generate();
        assert!(id.to_string().starts_with("msg-"));
    }

    #[test]
    fn message_id_rejects_missing_prefix() {
        let result = "0191d6b2-0000-7000-8000-000000000000".parse::<MessageId>();
        assert_eq!(result, Err(IdError::MissingPrefix));
    }

    #[test]
    fn message_id_rejects_bad_uuid() {
        let result = "msg-not-a-uuid".parse::<MessageId>();
        assert_eq!(result, Err(IdError::InvalidUuid));
    }

    #[test]
    fn message_ids_are_unique() {
        let ids: std::collections::HashSet<_> = (0..1000).map(|_| MessageId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn message_id_serde_uses_display_form() {
        let id = MessageId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));

        let back: MessageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn generation_advances() {
        let first = Generation::INITIAL;
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.value(), 1);
        assert_eq!(Generation::default(), Generation::INITIAL);
    }
}
