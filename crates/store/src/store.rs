use std::collections::HashSet;

use {anyhow::Result, async_trait::async_trait};

use crate::types::{Message, User};

/// Durable keyed storage for the mirrored thread.
///
/// All mutations are single-document upserts and must be safe under retry:
/// applying the same call twice yields the same stored state as once. The
/// ingestion path serialises calls, so implementations need no cross-document
/// transactions.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Insert or overwrite the canonical record for `message.id`.
    /// Returns whether a record with that id existed before.
    async fn upsert_message(&self, message: &Message) -> Result<bool>;

    async fn get_message(&self, id: &str) -> Result<Option<Message>>;

    /// Creation timestamp of the newest stored message, if any. This is the
    /// backfill watermark; it is derived, never stored separately.
    async fn latest_message_timestamp(&self) -> Result<Option<i64>>;

    /// Set the `unsent` flag without touching content. Returns false when no
    /// record with that id exists (the caller fetches and inserts it first).
    async fn mark_unsent(&self, id: &str) -> Result<bool>;

    /// Mutate the reaction map of an existing message: `Some(kind)` adds or
    /// replaces the author's reaction, `None` removes it. Returns false when
    /// the message is absent.
    async fn set_reaction(
        &self,
        message_id: &str,
        author_id: &str,
        kind: Option<&str>,
    ) -> Result<bool>;

    /// Insert or refresh a user record. Profile fields (name, nickname,
    /// avatar) are overwritten; `is_admin`, `last_read_at_ms` and
    /// `app_state` of an existing record are preserved. Returns whether the
    /// user existed before.
    async fn upsert_user(&self, user: &User) -> Result<bool>;

    async fn get_user(&self, id: &str) -> Result<Option<User>>;

    async fn user_ids(&self) -> Result<HashSet<String>>;

    /// Record when a user last read the thread. No-op if the user is absent.
    async fn set_last_read(&self, user_id: &str, at_ms: i64) -> Result<()>;
}
