use std::sync::Arc;

use {anyhow::Result, async_trait::async_trait};

use {
    chronicle_platform::Outbound,
    chronicle_store::{Message, MessageStore, User},
};

use crate::{capability::Capability, state::StateScope};

/// What every hook invocation receives: the monitored thread, the gated
/// outbound handle, read access to the store, and the plugin's own state
/// scope.
#[derive(Clone)]
pub struct PluginContext {
    pub thread_id: String,
    pub outbound: Arc<Outbound>,
    pub store: Arc<dyn MessageStore>,
    pub state: StateScope,
}

/// A chat plugin. Implementations declare their capabilities once;
/// undeclared hooks are never invoked, and the default bodies make every
/// hook optional.
///
/// Hooks run on the ingestion path, one event at a time; a slow hook slows
/// the whole pipeline down, so anything long-running should be spawned.
#[async_trait]
pub trait ChatPlugin: Send + Sync {
    /// Stable plugin name; also the configuration key and state scope.
    fn name(&self) -> &str;

    /// Which hooks this plugin implements.
    fn capabilities(&self) -> &[Capability];

    /// Called once at startup, after backfill has populated the store and
    /// before the live listener starts.
    async fn init(&self, _cx: &PluginContext) -> Result<()> {
        Ok(())
    }

    /// A new message arrived. The returned flag means "handled" and is used
    /// for logging only; it never stops later plugins from seeing the event.
    async fn on_message(
        &self,
        _cx: &PluginContext,
        _author: &User,
        _message: &Message,
    ) -> Result<bool> {
        Ok(false)
    }

    async fn on_message_unsent(
        &self,
        _cx: &PluginContext,
        _author_id: &str,
        _message_id: &str,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_reaction_added(
        &self,
        _cx: &PluginContext,
        _author_id: &str,
        _message_id: &str,
        _reaction: &str,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_reaction_removed(
        &self,
        _cx: &PluginContext,
        _author_id: &str,
        _message_id: &str,
    ) -> Result<()> {
        Ok(())
    }
}
