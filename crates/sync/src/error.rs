/// Crate-wide result type for sync operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The watchdog fired: no events within the timeout.
    #[error("connection stalled: no events within the watchdog timeout")]
    Stalled,

    #[error(transparent)]
    Platform(#[from] chronicle_platform::Error),

    /// A store mutation or query failed.
    #[error("store operation failed: {0:#}")]
    Store(anyhow::Error),
}

impl Error {
    /// Recoverable by tearing down the connection and reconnecting:
    /// a stall, a dead session/stream, or exhausted transient retries.
    /// Permanent platform answers and store failures are not.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Stalled => true,
            Self::Platform(e) => e.is_fatal() || e.is_transient(),
            Self::Store(_) => false,
        }
    }

    /// The session or stream itself is gone; the listener must stop.
    /// Anything else is permanent for a single event only.
    #[must_use]
    pub fn is_fatal_connection(&self) -> bool {
        matches!(self, Self::Platform(e) if e.is_fatal())
    }
}
