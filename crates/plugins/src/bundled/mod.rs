//! Plugins compiled into the binary. Business-logic plugins live in their
//! own crates; this module carries the reference plugin used to smoke-test
//! dispatch end to end.

pub mod ping;

use std::sync::Arc;

use crate::plugin::ChatPlugin;

/// Every bundled plugin, in a stable order. The registry filters this by
/// the configured `enabled` list.
#[must_use]
pub fn catalog() -> Vec<Arc<dyn ChatPlugin>> {
    vec![Arc::new(ping::Ping) as Arc<dyn ChatPlugin>]
}
