/// Crate-wide result type for platform operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed platform errors.
///
/// Callers branch on three classes: transient failures are retried with
/// backoff at the call site, fatal-connection failures tear down the
/// listener, and everything else is permanent for the single operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The platform asked us to slow down.
    #[error("platform rate limited")]
    RateLimited { retry_after_ms: Option<u64> },

    /// A request failed for a reason that may clear on retry.
    #[error("transient network failure: {message}")]
    Network { message: String },

    #[error("platform request timed out")]
    Timeout,

    /// The referenced message/thread/user does not exist.
    #[error("unknown platform id: {id}")]
    UnknownId { id: String },

    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    /// The operation cannot be served right now (e.g. no client attached).
    #[error("platform unavailable: {message}")]
    Unavailable { message: String },

    /// The authenticated session is no longer valid; reconnect required.
    #[error("platform session invalidated")]
    SessionInvalidated,

    /// The event stream ended; reconnect required.
    #[error("event stream closed")]
    StreamClosed,

    /// JSON (de)serialization failed.
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    #[must_use]
    pub fn network(message: impl std::fmt::Display) -> Self {
        Self::Network {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn unknown_id(id: impl std::fmt::Display) -> Self {
        Self::UnknownId { id: id.to_string() }
    }

    #[must_use]
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn permission_denied(message: impl std::fmt::Display) -> Self {
        Self::PermissionDenied {
            message: message.to_string(),
        }
    }

    /// Worth retrying with backoff.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Network { .. } | Self::Timeout
        )
    }

    /// Requires tearing down the connection and re-syncing.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SessionInvalidated | Self::StreamClosed)
    }
}
