//! Classifies, filters, persists and dispatches one inbound event at a time.

use std::sync::Arc;

use tracing::debug;

use {
    chronicle_platform::{PlatformClient, PlatformEvent},
    chronicle_plugins::PluginRegistry,
    chronicle_store::{Message, MessageStore, User},
};

use crate::error::{Error, Result};

/// What became of a handled event; returned for observability and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Persisted and (where applicable) dispatched to plugins.
    Routed,
    /// An event kind the core does not track.
    DroppedUnrelated,
    /// Wrong thread and the author holds no privilege.
    DroppedForeignThread,
    /// Authored by the bot's own account.
    DroppedOwnEvent,
}

/// Single-threaded event router: invoked once per inbound event, in
/// delivery order. Persistence always precedes plugin dispatch, so plugins
/// observe a store that already contains the event they are told about.
pub struct EventRouter {
    client: Arc<dyn PlatformClient>,
    store: Arc<dyn MessageStore>,
    plugins: Arc<PluginRegistry>,
    monitored_thread: String,
    self_user_id: String,
}

impl EventRouter {
    #[must_use]
    pub fn new(
        client: Arc<dyn PlatformClient>,
        store: Arc<dyn MessageStore>,
        plugins: Arc<PluginRegistry>,
        monitored_thread: impl Into<String>,
        self_user_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            store,
            plugins,
            monitored_thread: monitored_thread.into(),
            self_user_id: self_user_id.into(),
        }
    }

    /// Route one event. Errors are permanent for this event only unless
    /// [`Error::is_recoverable`] says otherwise; the listener decides.
    pub async fn handle(&self, event: PlatformEvent) -> Result<Disposition> {
        let Some(thread_id) = event.thread_id() else {
            return Ok(Disposition::DroppedUnrelated);
        };
        let author_id = event.author_id().unwrap_or_default().to_string();

        // Only the monitored group is accepted unconditionally; anything
        // else (direct messages) requires a privileged author on record.
        if thread_id != self.monitored_thread && !self.is_privileged(&author_id).await? {
            debug!(thread_id, author_id, "dropping event from foreign thread");
            return Ok(Disposition::DroppedForeignThread);
        }

        // Our own messages echo back through the listener; routing them
        // would loop plugin replies forever.
        if author_id == self.self_user_id {
            return Ok(Disposition::DroppedOwnEvent);
        }

        match event {
            PlatformEvent::MessageCreated { stub } => {
                let message = self.fetch_with_retry(&stub.id).await?;
                self.store
                    .upsert_message(&message)
                    .await
                    .map_err(Error::Store)?;
                let author = self.resolve_author(&message.author_id).await?;
                self.plugins.dispatch_message(&author, &message).await;
            },
            PlatformEvent::MessageUnsent {
                message_id,
                author_id,
                ..
            } => {
                // Retained with the flag set, never hard-deleted. If backfill
                // has not reached the message yet, fetch it first.
                if !self
                    .store
                    .mark_unsent(&message_id)
                    .await
                    .map_err(Error::Store)?
                {
                    let message = self.fetch_with_retry(&message_id).await?;
                    self.store
                        .upsert_message(&message)
                        .await
                        .map_err(Error::Store)?;
                    self.store
                        .mark_unsent(&message_id)
                        .await
                        .map_err(Error::Store)?;
                }
                debug!(message_id, author_id, "message marked unsent");
                // Default policy: persisted but not forwarded to plugins.
            },
            PlatformEvent::ReactionAdded {
                message_id,
                author_id,
                reaction,
                ..
            } => {
                self.apply_reaction(&message_id, &author_id, Some(&reaction))
                    .await?;
                self.plugins
                    .dispatch_reaction_added(&author_id, &message_id, &reaction)
                    .await;
            },
            PlatformEvent::ReactionRemoved {
                message_id,
                author_id,
                ..
            } => {
                self.apply_reaction(&message_id, &author_id, None).await?;
                self.plugins
                    .dispatch_reaction_removed(&author_id, &message_id)
                    .await;
            },
            PlatformEvent::MessageSeen { user_id, at_ms, .. } => {
                self.store
                    .set_last_read(&user_id, at_ms)
                    .await
                    .map_err(Error::Store)?;
            },
            PlatformEvent::Other => unreachable!("filtered by thread_id() above"),
        }

        Ok(Disposition::Routed)
    }

    /// Mutate a reaction, fetching and inserting the target message first
    /// when the store has not seen it yet (backfill may not have reached
    /// that far back).
    async fn apply_reaction(
        &self,
        message_id: &str,
        author_id: &str,
        kind: Option<&str>,
    ) -> Result<()> {
        if self
            .store
            .set_reaction(message_id, author_id, kind)
            .await
            .map_err(Error::Store)?
        {
            return Ok(());
        }
        let message = self.fetch_with_retry(message_id).await?;
        self.store
            .upsert_message(&message)
            .await
            .map_err(Error::Store)?;
        self.store
            .set_reaction(message_id, author_id, kind)
            .await
            .map_err(Error::Store)?;
        Ok(())
    }

    /// Live events carry stubs; fetch the full body, retrying exactly once
    /// on a transient failure.
    async fn fetch_with_retry(&self, message_id: &str) -> Result<Message> {
        match self.client.fetch_full_message(message_id).await {
            Err(e) if e.is_transient() => {
                debug!(message_id, error = %e, "message fetch failed, retrying once");
                Ok(self.client.fetch_full_message(message_id).await?)
            },
            result => Ok(result?),
        }
    }

    async fn is_privileged(&self, author_id: &str) -> Result<bool> {
        let user = self
            .store
            .get_user(author_id)
            .await
            .map_err(Error::Store)?;
        Ok(user.is_some_and(|u| u.is_admin))
    }

    /// The author record, or a bare placeholder when the roster has not
    /// caught up with a brand-new participant yet.
    async fn resolve_author(&self, author_id: &str) -> Result<User> {
        let user = self
            .store
            .get_user(author_id)
            .await
            .map_err(Error::Store)?;
        Ok(user.unwrap_or_else(|| User::new(author_id, author_id)))
    }
}
