//! Plugin system: capability declarations, the `ChatPlugin` trait, and the
//! registry that dispatches routed events to every enabled plugin while
//! isolating their failures from the ingestion pipeline.

pub mod bundled;
pub mod capability;
pub mod plugin;
pub mod registry;
pub mod state;

#[cfg(test)]
pub(crate) mod testutil;

pub use {
    capability::Capability,
    plugin::{ChatPlugin, PluginContext},
    registry::{DispatchStats, PluginRegistry},
    state::StateScope,
};
