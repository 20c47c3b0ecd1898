//! Outbound handle plugins send through.
//!
//! Wraps the live client with the monitored thread id and two runtime
//! switches: `enabled` is the master kill-switch, `silent` suppresses text
//! sends but still allows reactions. A fresh deployment observes the thread
//! without talking until an operator arms it.
//!
//! The client slot is swappable: the supervisor attaches a fresh client on
//! every reconnect while plugins keep holding the same handle.

use std::sync::{
    Arc, RwLock,
    atomic::{AtomicBool, Ordering},
};

use tracing::info;

use crate::{
    client::PlatformClient,
    error::{Error, Result},
};

pub struct Outbound {
    client: RwLock<Option<Arc<dyn PlatformClient>>>,
    thread_id: String,
    enabled: AtomicBool,
    silent: AtomicBool,
}

impl Outbound {
    /// A handle with no client attached yet; sends fail with
    /// [`Error::Unavailable`] until [`Outbound::attach_client`] is called.
    #[must_use]
    pub fn new(thread_id: impl Into<String>, enabled: bool, silent: bool) -> Self {
        Self {
            client: RwLock::new(None),
            thread_id: thread_id.into(),
            enabled: AtomicBool::new(enabled),
            silent: AtomicBool::new(silent),
        }
    }

    #[must_use]
    pub fn with_client(
        client: Arc<dyn PlatformClient>,
        thread_id: impl Into<String>,
        enabled: bool,
        silent: bool,
    ) -> Self {
        let outbound = Self::new(thread_id, enabled, silent);
        outbound.attach_client(client);
        outbound
    }

    /// Swap in the client of the current connection cycle.
    pub fn attach_client(&self, client: Arc<dyn PlatformClient>) {
        let mut slot = self.client.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(client);
    }

    fn client(&self) -> Result<Arc<dyn PlatformClient>> {
        let slot = self.client.read().unwrap_or_else(|e| e.into_inner());
        slot.clone()
            .ok_or_else(|| Error::unavailable("no platform client attached"))
    }

    #[must_use]
    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn set_silent(&self, silent: bool) {
        self.silent.store(silent, Ordering::Relaxed);
    }

    fn text_allowed(&self) -> bool {
        if !self.enabled.load(Ordering::Relaxed) {
            info!("message not sent: outbound disabled");
            return false;
        }
        if self.silent.load(Ordering::Relaxed) {
            info!("message not sent: silent mode");
            return false;
        }
        true
    }

    /// Send a text message into the monitored thread.
    pub async fn send_text(&self, text: &str) -> Result<()> {
        if !self.text_allowed() {
            return Ok(());
        }
        self.client()?.send_text(&self.thread_id, text, None).await
    }

    /// Send a text reply to `reply_to` in the monitored thread.
    pub async fn send_reply(&self, reply_to: &str, text: &str) -> Result<()> {
        if !self.text_allowed() {
            return Ok(());
        }
        self.client()?
            .send_text(&self.thread_id, text, Some(reply_to))
            .await
    }

    /// React to a message. Allowed in silent mode.
    pub async fn react(&self, message_id: &str, reaction: &str) -> Result<()> {
        if !self.enabled.load(Ordering::Relaxed) {
            info!("reaction not sent: outbound disabled");
            return Ok(());
        }
        self.client()?.react(message_id, Some(reaction)).await
    }

    /// Remove our reaction from a message.
    pub async fn remove_reaction(&self, message_id: &str) -> Result<()> {
        if !self.enabled.load(Ordering::Relaxed) {
            info!("reaction not removed: outbound disabled");
            return Ok(());
        }
        self.client()?.react(message_id, None).await
    }
}
