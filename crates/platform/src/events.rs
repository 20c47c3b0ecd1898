//! Inbound events as delivered by the platform's live connection.

use serde::{Deserialize, Serialize};

/// The minimal payload a live message event carries. The full body must be
/// fetched separately via [`crate::PlatformClient::fetch_full_message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageStub {
    pub id: String,
    pub thread_id: String,
    pub author_id: String,
    pub created_at_ms: i64,
}

/// A raw platform event, already decoded from the wire by the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlatformEvent {
    MessageCreated {
        stub: MessageStub,
    },
    MessageUnsent {
        thread_id: String,
        message_id: String,
        author_id: String,
        at_ms: i64,
    },
    ReactionAdded {
        thread_id: String,
        message_id: String,
        author_id: String,
        reaction: String,
    },
    ReactionRemoved {
        thread_id: String,
        message_id: String,
        author_id: String,
    },
    /// A participant read the thread up to `at_ms`.
    MessageSeen {
        thread_id: String,
        user_id: String,
        at_ms: i64,
    },
    /// Anything the driver decoded but the core does not care about
    /// (typing indicators, presence, thread renames, ...).
    Other,
}

impl PlatformEvent {
    /// Thread the event belongs to, if it has one.
    #[must_use]
    pub fn thread_id(&self) -> Option<&str> {
        match self {
            Self::MessageCreated { stub } => Some(&stub.thread_id),
            Self::MessageUnsent { thread_id, .. }
            | Self::ReactionAdded { thread_id, .. }
            | Self::ReactionRemoved { thread_id, .. }
            | Self::MessageSeen { thread_id, .. } => Some(thread_id),
            Self::Other => None,
        }
    }

    /// The acting user: message author, reactor, or reader.
    #[must_use]
    pub fn author_id(&self) -> Option<&str> {
        match self {
            Self::MessageCreated { stub } => Some(&stub.author_id),
            Self::MessageUnsent { author_id, .. }
            | Self::ReactionAdded { author_id, .. }
            | Self::ReactionRemoved { author_id, .. } => Some(author_id),
            Self::MessageSeen { user_id, .. } => Some(user_id),
            Self::Other => None,
        }
    }
}
