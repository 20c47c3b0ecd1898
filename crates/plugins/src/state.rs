//! Per-plugin keyed state.
//!
//! Plugins get no module-level globals; the registry owns one shared map and
//! hands each plugin a scope that prefixes every key with the plugin name,
//! so no plugin can read or clobber another's state.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use serde_json::Value;

pub(crate) type SharedState = Arc<RwLock<HashMap<String, Value>>>;

/// A plugin-scoped view into the registry-owned state map.
#[derive(Clone)]
pub struct StateScope {
    plugin: String,
    inner: SharedState,
}

impl StateScope {
    pub(crate) fn new(plugin: impl Into<String>, inner: SharedState) -> Self {
        Self {
            plugin: plugin.into(),
            inner,
        }
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}.{key}", self.plugin)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.get(&self.scoped(key)).cloned()
    }

    pub fn set(&self, key: &str, value: Value) {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.insert(self.scoped(key), value);
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.remove(&self.scoped(key))
    }
}
