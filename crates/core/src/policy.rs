//! Failure policy applied when a handler fails during dispatch.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// FailurePolicy
// ---------------------------------------------------------------------------

/// What a hub does when one of its handlers returns an error or panics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure and keep delivering to the remaining handlers.
    #[default]
    Isolate,
    /// Abort the emit at the first failure and return it to the caller.
    Propagate,
}

impl FailurePolicy {
    /// Return the wire-format string for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Isolate => "isolate",
            Self::Propagate => "propagate",
        }
    }

    /// Parse from a wire-format string (case-insensitive, surrounding
    /// whitespace ignored).
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "isolate" => Ok(Self::Isolate),
            "propagate" => Ok(Self::Propagate),
            _ => Err(CoreError::Validation(format!(
                "Invalid failure_policy: '{s}'. Must be one of: isolate, propagate"
            ))),
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
