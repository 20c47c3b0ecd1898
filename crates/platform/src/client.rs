//! Traits a concrete platform driver implements.

use std::collections::HashSet;

use async_trait::async_trait;

use chronicle_store::Message;

use crate::{error::Result, events::PlatformEvent};

/// A user profile as the platform reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    /// Thread-scoped nickname, if one is set.
    pub nickname: Option<String>,
    pub profile_image: Option<String>,
}

/// Request side of an authenticated platform session.
///
/// Session acquisition and cookie persistence are the driver's problem; the
/// sync core only sees these calls. Every method may fail transiently
/// (network, rate limit) or permanently (bad id, permission); see
/// [`crate::Error`].
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Fetch up to `page_size` messages of `thread_id` strictly older than
    /// `before_ms`, ordered oldest to newest.
    async fn fetch_history(
        &self,
        thread_id: &str,
        before_ms: i64,
        page_size: usize,
    ) -> Result<Vec<Message>>;

    /// Fetch the full body for a message the live stream only stubbed.
    async fn fetch_full_message(&self, message_id: &str) -> Result<Message>;

    /// Current participant ids of a thread.
    async fn fetch_participants(&self, thread_id: &str) -> Result<HashSet<String>>;

    /// Profile data for one user (name, thread nickname, avatar).
    async fn fetch_user_profile(&self, user_id: &str) -> Result<UserProfile>;

    /// Send a text message, optionally as a reply.
    async fn send_text(&self, thread_id: &str, text: &str, reply_to: Option<&str>) -> Result<()>;

    /// Set (`Some`) or clear (`None`) our reaction on a message.
    async fn react(&self, message_id: &str, reaction: Option<&str>) -> Result<()>;
}

/// Event side of the session: a blocking pull yielding events in arrival
/// order. Errors out of `next_event` are fatal for the connection.
#[async_trait]
pub trait PlatformListener: Send {
    async fn next_event(&mut self) -> Result<PlatformEvent>;
}
