//! Hub configuration.

use herald_core::error::CoreError;
use herald_core::policy::FailurePolicy;
use serde::Deserialize;

/// Environment variable selecting the [`FailurePolicy`].
pub const FAILURE_POLICY_ENV: &str = "HERALD_FAILURE_POLICY";

/// Settings applied to every dispatch performed by a [`Hub`](crate::Hub).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct HubConfig {
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl HubConfig {
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Load configuration from the process environment.
    ///
    /// | Variable                | Default   | Values                  |
    /// |-------------------------|-----------|-------------------------|
    /// | `HERALD_FAILURE_POLICY` | `isolate` | `isolate`, `propagate`  |
    ///
    /// Callers that want `.env` support should run `dotenvy::dotenv()`
    /// first.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let failure_policy = match lookup(FAILURE_POLICY_ENV) {
            Some(raw) if !raw.trim().is_empty() => FailurePolicy::from_str(&raw)?,
            _ => FailurePolicy::default(),
        };
        Ok(Self { failure_policy })
    }
}
