use std::fmt;

use serde::{Deserialize, Serialize};

/// Hooks a plugin may implement. Declared statically; the registry tests
/// membership before invoking, so "does this plugin handle reactions" is a
/// set lookup, never a call that might not be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Init,
    OnMessage,
    OnMessageUnsent,
    OnReactionAdded,
    OnReactionRemoved,
}

impl Capability {
    /// All variants, for iteration.
    pub const ALL: &'static [Capability] = &[
        Self::Init,
        Self::OnMessage,
        Self::OnMessageUnsent,
        Self::OnReactionAdded,
        Self::OnReactionRemoved,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
