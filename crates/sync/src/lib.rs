//! The synchronization and dispatch core.
//!
//! Startup order: connect, reconcile the roster, run backfill to quiescence,
//! init plugins, then start the live listener. Each live event flows
//! listener → router → {store, plugins} and renews the watchdog; a stalled
//! or broken connection tears the cycle down and the supervisor reconnects
//! with jittered backoff.

pub mod backfill;
pub mod error;
pub mod listener;
pub mod roster;
pub mod router;
pub mod supervisor;
pub mod watchdog;

#[cfg(test)]
pub(crate) mod testutil;

pub use {
    backfill::{BackfillReport, BackfillSynchronizer},
    error::{Error, Result},
    listener::EventListener,
    router::{Disposition, EventRouter},
    supervisor::{Connector, Supervisor, SupervisorOptions},
    watchdog::Watchdog,
};
