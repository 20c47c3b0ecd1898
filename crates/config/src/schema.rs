use std::path::PathBuf;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

use crate::error::{Error, Result};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChronicleConfig {
    pub platform: PlatformConfig,
    pub watchdog: WatchdogConfig,
    pub reconnect: ReconnectConfig,
    pub store: StoreConfig,
    pub outbound: OutboundConfig,
    pub plugins: PluginsConfig,
    pub replay: ReplayConfig,
}

impl ChronicleConfig {
    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.platform.monitored_thread.is_empty() {
            return Err(Error::invalid(
                "platform.monitored_thread",
                "must name the monitored thread",
            ));
        }
        if self.platform.self_user_id.is_empty() {
            return Err(Error::invalid(
                "platform.self_user_id",
                "must name the bot's own account",
            ));
        }
        if self.platform.page_size == 0 {
            return Err(Error::invalid("platform.page_size", "must be at least 1"));
        }
        if self.watchdog.timeout_secs == 0 {
            return Err(Error::invalid("watchdog.timeout_secs", "must be at least 1"));
        }
        if self.reconnect.max_backoff_secs < self.reconnect.initial_backoff_secs {
            return Err(Error::invalid(
                "reconnect.max_backoff_secs",
                "must not be below the initial backoff",
            ));
        }
        Ok(())
    }
}

/// The monitored conversation and the session handed to the driver.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Thread id of the monitored group conversation.
    pub monitored_thread: String,

    /// The bot's own account id; its events are dropped to avoid loops.
    pub self_user_id: String,

    /// Opaque session token for the platform driver. Acquisition and
    /// refresh happen outside this process.
    #[serde(serialize_with = "serialize_secret")]
    pub session_token: Secret<String>,

    /// History page size for backfill.
    pub page_size: usize,
}

impl std::fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("monitored_thread", &self.monitored_thread)
            .field("self_user_id", &self.self_user_id)
            .field("session_token", &"[REDACTED]")
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            monitored_thread: String::new(),
            self_user_id: String::new(),
            session_token: Secret::new(String::new()),
            page_size: 200,
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Seconds of silence before the connection is declared stalled.
    pub timeout_secs: u64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    pub initial_backoff_secs: u64,
    pub max_backoff_secs: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_backoff_secs: 2,
            max_backoff_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub database_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://chronicle.db?mode=rwc".into(),
        }
    }
}

/// Send gating. A fresh deployment observes without talking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutboundConfig {
    pub enabled: bool,
    pub silent: bool,
}

impl Default for OutboundConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            silent: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    /// Plugins to enable, in dispatch order.
    pub enabled: Vec<String>,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            enabled: vec!["ping".into()],
        }
    }
}

/// Inputs for the JSONL replay driver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub archive: Option<PathBuf>,
    pub events: Option<PathBuf>,
}
