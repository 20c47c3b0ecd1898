//! Process-level recovery loop: connect, catch up, listen; when the
//! connection stalls or dies, reconnect with jittered backoff.

use std::sync::Arc;

use {
    async_trait::async_trait,
    rand::Rng,
    tokio::time::Duration,
    tracing::{info, warn},
};

use {
    chronicle_platform::{Outbound, PlatformClient, PlatformListener, RetryPolicy},
    chronicle_plugins::PluginRegistry,
    chronicle_store::MessageStore,
};

use crate::{
    backfill::BackfillSynchronizer,
    error::Result,
    listener::EventListener,
    roster,
    router::EventRouter,
};

/// Produces a fresh authenticated connection for each cycle. The concrete
/// implementation owns session acquisition; the replay driver and the test
/// doubles are the in-tree ones.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
    ) -> chronicle_platform::Result<(Arc<dyn PlatformClient>, Box<dyn PlatformListener>)>;
}

#[derive(Debug, Clone, Copy)]
pub struct SupervisorOptions {
    pub watchdog_timeout: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub page_size: usize,
    pub retry: RetryPolicy,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            watchdog_timeout: Duration::from_secs(60),
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(300),
            page_size: 200,
            retry: RetryPolicy::default(),
        }
    }
}

pub struct Supervisor {
    connector: Box<dyn Connector>,
    store: Arc<dyn MessageStore>,
    plugins: Arc<PluginRegistry>,
    outbound: Arc<Outbound>,
    thread_id: String,
    self_user_id: String,
    options: SupervisorOptions,
}

impl Supervisor {
    #[must_use]
    pub fn new(
        connector: Box<dyn Connector>,
        store: Arc<dyn MessageStore>,
        plugins: Arc<PluginRegistry>,
        outbound: Arc<Outbound>,
        thread_id: impl Into<String>,
        self_user_id: impl Into<String>,
        options: SupervisorOptions,
    ) -> Self {
        Self {
            connector,
            store,
            plugins,
            outbound,
            thread_id: thread_id.into(),
            self_user_id: self_user_id.into(),
            options,
        }
    }

    /// Run cycles forever. Returns only on a non-recoverable error
    /// (permanent platform answer or a broken store).
    pub async fn run(&self) -> Result<()> {
        let mut backoff = self.options.initial_backoff;
        let mut plugins_initialized = false;

        loop {
            let cycle_started = std::time::Instant::now();
            match self.cycle(&mut plugins_initialized).await {
                Ok(()) => {
                    warn!("listener ended without an error, reconnecting");
                },
                Err(e) if e.is_recoverable() => {
                    warn!(error = %e, "connection lost");
                },
                Err(e) => return Err(e),
            }

            // A cycle that survived past the watchdog window was healthy;
            // start the backoff ladder over.
            if cycle_started.elapsed() >= self.options.watchdog_timeout {
                backoff = self.options.initial_backoff;
            }

            let delay = jittered(backoff);
            info!(delay_ms = delay.as_millis() as u64, "reconnecting after backoff");
            tokio::time::sleep(delay).await;
            backoff = (backoff * 2).min(self.options.max_backoff);
        }
    }

    /// One connection cycle: connect, reconcile the roster, backfill to
    /// quiescence, init plugins (first cycle only), then listen live.
    async fn cycle(&self, plugins_initialized: &mut bool) -> Result<()> {
        let (client, source) = self.connector.connect().await?;
        self.outbound.attach_client(Arc::clone(&client));

        roster::reconcile_roster(client.as_ref(), self.store.as_ref(), &self.thread_id).await?;

        let report = BackfillSynchronizer::new(
            Arc::clone(&client),
            Arc::clone(&self.store),
            &self.thread_id,
        )
        .with_page_size(self.options.page_size)
        .with_retry(self.options.retry)
        .synchronize()
        .await?;
        info!(
            pages = report.pages,
            stored_new = report.stored_new,
            "backfill finished"
        );

        if !*plugins_initialized {
            self.plugins.init_all().await;
            *plugins_initialized = true;
        }

        let router = Arc::new(EventRouter::new(
            client,
            Arc::clone(&self.store),
            Arc::clone(&self.plugins),
            &self.thread_id,
            &self.self_user_id,
        ));
        EventListener::new(source, router, self.options.watchdog_timeout)
            .run()
            .await
    }
}

fn jittered(base: Duration) -> Duration {
    let jitter_ms = rand::rng().random_range(0..=base.as_millis() as u64 / 4);
    base + Duration::from_millis(jitter_ms)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::Mutex,
    };

    use {
        chronicle_platform::{Error as PlatformError, MessageStub, PlatformEvent},
        chronicle_store::{MemoryStore, Message},
    };

    use {
        super::*,
        crate::testutil::{QueueListener, RecordingPlugin, ScriptedClient},
    };

    type Connection = (Arc<dyn PlatformClient>, Box<dyn PlatformListener>);

    struct QueueConnector {
        connections: Mutex<VecDeque<chronicle_platform::Result<Connection>>>,
    }

    impl QueueConnector {
        fn new(connections: Vec<chronicle_platform::Result<Connection>>) -> Self {
            Self {
                connections: Mutex::new(connections.into()),
            }
        }
    }

    #[async_trait]
    impl Connector for QueueConnector {
        async fn connect(&self) -> chronicle_platform::Result<Connection> {
            self.connections
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front()
                .unwrap_or_else(|| Err(PlatformError::permission_denied("no more connections")))
        }
    }

    fn fast_options() -> SupervisorOptions {
        SupervisorOptions {
            watchdog_timeout: Duration::from_secs(5),
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(4),
            page_size: 2,
            retry: RetryPolicy {
                max_retries: 1,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
            },
        }
    }

    fn live_event(id: &str) -> chronicle_platform::Result<PlatformEvent> {
        Ok(PlatformEvent::MessageCreated {
            stub: MessageStub {
                id: id.into(),
                thread_id: "group".into(),
                author_id: "alice".into(),
                created_at_ms: 100,
            },
        })
    }

    #[tokio::test]
    async fn reconnects_after_failures_and_inits_plugins_once() {
        // Cycle 1: one history page, one live event, then the stream dies.
        let client1 = Arc::new(ScriptedClient::default());
        client1.set_participants(&["alice"]);
        client1.push_page(vec![Message::new("h1", "group", "alice", 10)]);
        client1.insert_full(Message::new("m1", "group", "alice", 100));
        let listener1 = QueueListener::new(vec![live_event("m1")]);

        // Cycle 2: another live event, then closed again.
        let client2 = Arc::new(ScriptedClient::default());
        client2.set_participants(&["alice"]);
        client2.insert_full(Message::new("m2", "group", "alice", 200));
        let listener2 = QueueListener::new(vec![live_event("m2")]);

        // Cycle 3: the connector gives up for good.
        let connector = QueueConnector::new(vec![
            Ok((client1 as Arc<dyn PlatformClient>, Box::new(listener1) as _)),
            Ok((client2 as Arc<dyn PlatformClient>, Box::new(listener2) as _)),
        ]);

        let store = Arc::new(MemoryStore::new());
        let (plugin, seen) = RecordingPlugin::new("rec");
        let outbound = Arc::new(Outbound::new("group", false, true));
        let plugins = Arc::new(PluginRegistry::build(
            &["rec".into()],
            vec![plugin],
            "group",
            Arc::clone(&outbound),
            Arc::clone(&store) as Arc<dyn MessageStore>,
        ));

        let supervisor = Supervisor::new(
            Box::new(connector),
            Arc::clone(&store) as Arc<dyn MessageStore>,
            plugins,
            outbound,
            "group",
            "bot",
            fast_options(),
        );

        let err = supervisor.run().await.unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Platform(PlatformError::PermissionDenied { .. })
        ));

        // Roster, backfill and both live events made it into the store.
        assert!(store.get_user("alice").await.unwrap().is_some());
        assert!(store.get_message("h1").await.unwrap().is_some());
        assert!(store.get_message("m1").await.unwrap().is_some());
        assert!(store.get_message("m2").await.unwrap().is_some());

        // Plugins were initialised exactly once, across both cycles.
        let seen = seen.lock().unwrap();
        assert_eq!(
            seen.iter().filter(|entry| *entry == "init").count(),
            1,
            "init must run once per process, not per reconnect"
        );
        assert!(seen.contains(&"message:alice:m1".to_string()));
        assert!(seen.contains(&"message:alice:m2".to_string()));
    }

    #[tokio::test]
    async fn permanent_connect_error_propagates() {
        let connector = QueueConnector::new(vec![Err(PlatformError::permission_denied(
            "account banned",
        ))]);
        let store = Arc::new(MemoryStore::new());
        let outbound = Arc::new(Outbound::new("group", false, true));
        let plugins = Arc::new(PluginRegistry::build(
            &[],
            vec![],
            "group",
            Arc::clone(&outbound),
            Arc::clone(&store) as Arc<dyn MessageStore>,
        ));

        let supervisor = Supervisor::new(
            Box::new(connector),
            store as Arc<dyn MessageStore>,
            plugins,
            outbound,
            "group",
            "bot",
            fast_options(),
        );

        let err = supervisor.run().await.unwrap_err();
        assert!(!err.is_recoverable());
    }
}
