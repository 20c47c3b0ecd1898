use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tracing::{debug, info, warn};

use {
    chronicle_platform::Outbound,
    chronicle_store::{Message, MessageStore, User},
};

use crate::{
    capability::Capability,
    plugin::{ChatPlugin, PluginContext},
    state::{SharedState, StateScope},
};

/// Per-plugin dispatch counters.
#[derive(Debug, Default)]
pub struct DispatchStats {
    pub calls: AtomicU64,
    pub failures: AtomicU64,
}

impl DispatchStats {
    fn record(&self, failed: bool) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
    }
}

struct PluginEntry {
    plugin: Arc<dyn ChatPlugin>,
    context: PluginContext,
    stats: Arc<DispatchStats>,
}

/// Ordered set of enabled plugins.
///
/// Built once at startup from configuration. Dispatch walks the entries in
/// registration order, skips plugins that did not declare the capability,
/// and wraps every invocation individually: a hook error is logged and
/// counted, and the walk continues. One plugin's failure never blocks
/// another plugin or the ingestion pipeline.
pub struct PluginRegistry {
    entries: Vec<PluginEntry>,
}

impl PluginRegistry {
    /// Build the registry from the ordered `enabled` list and the set of
    /// compiled-in plugins. Unknown names are logged and skipped.
    #[must_use]
    pub fn build(
        enabled: &[String],
        mut available: Vec<Arc<dyn ChatPlugin>>,
        thread_id: impl Into<String>,
        outbound: Arc<Outbound>,
        store: Arc<dyn MessageStore>,
    ) -> Self {
        let thread_id = thread_id.into();
        let shared: SharedState = Arc::default();
        let mut entries = Vec::with_capacity(enabled.len());

        for name in enabled {
            let Some(pos) = available.iter().position(|p| p.name() == name) else {
                warn!(plugin = %name, "enabled plugin not compiled in, skipping");
                continue;
            };
            let plugin = available.remove(pos);
            let context = PluginContext {
                thread_id: thread_id.clone(),
                outbound: Arc::clone(&outbound),
                store: Arc::clone(&store),
                state: StateScope::new(plugin.name(), Arc::clone(&shared)),
            };
            info!(plugin = plugin.name(), "plugin registered");
            entries.push(PluginEntry {
                plugin,
                context,
                stats: Arc::new(DispatchStats::default()),
            });
        }

        Self { entries }
    }

    /// Registered plugin names, in dispatch order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.plugin.name()).collect()
    }

    #[must_use]
    pub fn stats(&self, name: &str) -> Option<Arc<DispatchStats>> {
        self.entries
            .iter()
            .find(|e| e.plugin.name() == name)
            .map(|e| Arc::clone(&e.stats))
    }

    fn declaring(&self, capability: Capability) -> impl Iterator<Item = &PluginEntry> {
        self.entries
            .iter()
            .filter(move |e| e.plugin.capabilities().contains(&capability))
    }

    /// Initialise every plugin that declares `Init`. Runs once, after
    /// backfill and before the live listener, so plugins observe a
    /// populated store.
    pub async fn init_all(&self) {
        for entry in self.declaring(Capability::Init) {
            let result = entry.plugin.init(&entry.context).await;
            entry.stats.record(result.is_err());
            if let Err(e) = result {
                warn!(plugin = entry.plugin.name(), error = %e, "plugin init failed");
            }
        }
    }

    pub async fn dispatch_message(&self, author: &User, message: &Message) {
        for entry in self.declaring(Capability::OnMessage) {
            let result = entry.plugin.on_message(&entry.context, author, message).await;
            entry.stats.record(result.is_err());
            match result {
                Ok(true) => {
                    debug!(plugin = entry.plugin.name(), message_id = %message.id, "message handled");
                },
                Ok(false) => {},
                Err(e) => {
                    warn!(plugin = entry.plugin.name(), error = %e, "on_message hook failed");
                },
            }
        }
    }

    pub async fn dispatch_unsent(&self, author_id: &str, message_id: &str) {
        for entry in self.declaring(Capability::OnMessageUnsent) {
            let result = entry
                .plugin
                .on_message_unsent(&entry.context, author_id, message_id)
                .await;
            entry.stats.record(result.is_err());
            if let Err(e) = result {
                warn!(plugin = entry.plugin.name(), error = %e, "on_message_unsent hook failed");
            }
        }
    }

    pub async fn dispatch_reaction_added(&self, author_id: &str, message_id: &str, reaction: &str) {
        for entry in self.declaring(Capability::OnReactionAdded) {
            let result = entry
                .plugin
                .on_reaction_added(&entry.context, author_id, message_id, reaction)
                .await;
            entry.stats.record(result.is_err());
            if let Err(e) = result {
                warn!(plugin = entry.plugin.name(), error = %e, "on_reaction_added hook failed");
            }
        }
    }

    pub async fn dispatch_reaction_removed(&self, author_id: &str, message_id: &str) {
        for entry in self.declaring(Capability::OnReactionRemoved) {
            let result = entry
                .plugin
                .on_reaction_removed(&entry.context, author_id, message_id)
                .await;
            entry.stats.record(result.is_err());
            if let Err(e) = result {
                warn!(plugin = entry.plugin.name(), error = %e, "on_reaction_removed hook failed");
            }
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use {anyhow::Result, async_trait::async_trait};

    use chronicle_store::MemoryStore;

    use {super::*, crate::testutil::NullClient};

    struct Recording {
        plugin_name: String,
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ChatPlugin for Recording {
        fn name(&self) -> &str {
            &self.plugin_name
        }

        fn capabilities(&self) -> &[Capability] {
            &[Capability::OnMessage, Capability::OnReactionAdded]
        }

        async fn on_message(
            &self,
            _cx: &PluginContext,
            _author: &User,
            message: &Message,
        ) -> Result<bool> {
            self.seen
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.plugin_name, message.id));
            Ok(true)
        }

        async fn on_reaction_added(
            &self,
            _cx: &PluginContext,
            author_id: &str,
            message_id: &str,
            _reaction: &str,
        ) -> Result<()> {
            self.seen
                .lock()
                .unwrap()
                .push(format!("{}:{author_id}@{message_id}", self.plugin_name));
            Ok(())
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl ChatPlugin for AlwaysFails {
        fn name(&self) -> &str {
            "broken"
        }

        fn capabilities(&self) -> &[Capability] {
            &[Capability::Init, Capability::OnMessage]
        }

        async fn init(&self, _cx: &PluginContext) -> Result<()> {
            anyhow::bail!("init exploded")
        }

        async fn on_message(
            &self,
            _cx: &PluginContext,
            _author: &User,
            _message: &Message,
        ) -> Result<bool> {
            anyhow::bail!("hook exploded")
        }
    }

    fn build(enabled: &[&str], available: Vec<Arc<dyn ChatPlugin>>) -> PluginRegistry {
        let outbound = Arc::new(Outbound::with_client(Arc::new(NullClient), "t1", false, true));
        let store: Arc<dyn MessageStore> = Arc::new(MemoryStore::new());
        let enabled: Vec<String> = enabled.iter().map(|s| (*s).to_string()).collect();
        PluginRegistry::build(&enabled, available, "t1", outbound, store)
    }

    #[tokio::test]
    async fn failing_plugin_does_not_block_the_next_one() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let registry = build(
            &["broken", "recorder"],
            vec![
                Arc::new(AlwaysFails),
                Arc::new(Recording {
                    plugin_name: "recorder".into(),
                    seen: Arc::clone(&seen),
                }),
            ],
        );

        let message = Message::new("m1", "t1", "u1", 10);
        registry
            .dispatch_message(&User::new("u1", "Alice"), &message)
            .await;

        assert_eq!(seen.lock().unwrap().as_slice(), ["recorder:m1"]);
        let broken = registry.stats("broken").unwrap();
        assert_eq!(broken.failures.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn dispatch_preserves_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let registry = build(
            &["second", "first"],
            vec![
                Arc::new(Recording {
                    plugin_name: "first".into(),
                    seen: Arc::clone(&seen),
                }),
                Arc::new(Recording {
                    plugin_name: "second".into(),
                    seen: Arc::clone(&seen),
                }),
            ],
        );
        assert_eq!(registry.names(), ["second", "first"]);

        let message = Message::new("m1", "t1", "u1", 10);
        registry
            .dispatch_message(&User::new("u1", "Alice"), &message)
            .await;
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            ["second:m1", "first:m1"]
        );
    }

    #[tokio::test]
    async fn undeclared_capability_is_never_invoked() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let registry = build(
            &["recorder"],
            vec![Arc::new(Recording {
                plugin_name: "recorder".into(),
                seen: Arc::clone(&seen),
            })],
        );

        // Recording declares no OnMessageUnsent capability.
        registry.dispatch_unsent("u1", "m1").await;
        assert!(seen.lock().unwrap().is_empty());

        registry.dispatch_reaction_added("u1", "m1", "❤").await;
        assert_eq!(seen.lock().unwrap().as_slice(), ["recorder:u1@m1"]);
    }

    #[tokio::test]
    async fn unknown_enabled_names_are_skipped() {
        let registry = build(&["ghost"], vec![]);
        assert!(registry.names().is_empty());
    }

    #[tokio::test]
    async fn failing_init_is_contained() {
        let registry = build(&["broken"], vec![Arc::new(AlwaysFails)]);
        registry.init_all().await;
        let stats = registry.stats("broken").unwrap();
        assert_eq!(stats.calls.load(Ordering::Relaxed), 1);
        assert_eq!(stats.failures.load(Ordering::Relaxed), 1);
    }
}
