use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle returned when a handler is registered with a hub.
///
/// Handles are allocated from a per-hub monotonic counter and are never
/// reused for the lifetime of that hub, so a stale handle can never remove
/// somebody else's registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerId(u64);

impl HandlerId {
    /// Wrap a raw counter value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw counter value, for logging.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}
