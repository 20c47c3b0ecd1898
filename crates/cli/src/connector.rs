//! Connector backed by the JSONL replay driver.
//!
//! Production platform drivers live out of tree and plug in through the
//! same [`Connector`] trait; this build ships the offline one. A replay
//! session is served once: when the supervisor reconnects after the script
//! runs dry, the connector reports a non-recoverable condition so the
//! process exits instead of re-dispatching the same events forever.

use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;

use {
    chronicle_config::schema::ReplayConfig,
    chronicle_platform::{
        Error, PlatformClient, PlatformListener,
        replay::{ReplayClient, ReplayListener},
    },
    chronicle_sync::Connector,
};

pub struct ReplayConnector {
    archive: PathBuf,
    events: PathBuf,
    served: AtomicBool,
}

impl ReplayConnector {
    pub fn from_config(replay: &ReplayConfig) -> anyhow::Result<Self> {
        match (&replay.archive, &replay.events) {
            (Some(archive), Some(events)) => Ok(Self {
                archive: archive.clone(),
                events: events.clone(),
                served: AtomicBool::new(false),
            }),
            _ => anyhow::bail!(
                "no platform driver configured: set [replay] archive and events \
                 to run against recorded data"
            ),
        }
    }
}

#[async_trait]
impl Connector for ReplayConnector {
    async fn connect(
        &self,
    ) -> chronicle_platform::Result<(Arc<dyn PlatformClient>, Box<dyn PlatformListener>)> {
        if self.served.swap(true, Ordering::SeqCst) {
            return Err(Error::unavailable("replay input already consumed"));
        }
        let client = ReplayClient::from_archive(&self.archive).map_err(|e| match e {
            Error::Io(_) => Error::unavailable(format!(
                "replay archive unreadable: {}",
                self.archive.display()
            )),
            other => other,
        })?;
        let listener = ReplayListener::from_script(&self.events).map_err(|e| match e {
            Error::Io(_) => Error::unavailable(format!(
                "replay event script unreadable: {}",
                self.events.display()
            )),
            other => other,
        })?;
        Ok((Arc::new(client), Box::new(listener)))
    }
}
