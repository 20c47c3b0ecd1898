//! Boundary to the remote chat platform.
//!
//! The sync core consumes an already-authenticated session through the
//! [`PlatformClient`]/[`PlatformListener`] traits; concrete drivers live out
//! of tree. This crate carries the shared event model, the
//! transient/permanent/fatal error taxonomy, retry with backoff, the gated
//! outbound handle plugins send through, and a JSONL replay driver for
//! running the pipeline offline.

pub mod backoff;
pub mod client;
pub mod error;
pub mod events;
pub mod outbound;
pub mod replay;

pub use {
    backoff::{RetryPolicy, retry_transient},
    client::{PlatformClient, PlatformListener, UserProfile},
    error::{Error, Result},
    events::{MessageStub, PlatformEvent},
    outbound::Outbound,
};
