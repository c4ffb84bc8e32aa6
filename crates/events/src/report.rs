//! Per-emit dispatch summaries.

use herald_core::types::HandlerId;
use serde::Serialize;

/// One handler invocation that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerFailure {
    pub handler_id: HandlerId,

    /// The handler's [`name`](crate::Handler::name).
    pub handler: String,

    /// The returned error message, or the panic message.
    pub message: String,

    /// True when the handler panicked rather than returning `Err`.
    pub panicked: bool,
}

/// Outcome of a single [`Hub::emit`](crate::Hub::emit) call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// The event name that was emitted.
    pub event: String,

    /// Number of handlers that returned `Ok`.
    pub delivered: usize,

    /// Handlers that failed, in invocation order.
    pub failures: Vec<HandlerFailure>,
}

impl DispatchReport {
    pub(crate) fn empty(event: &str) -> Self {
        Self {
            event: event.to_owned(),
            delivered: 0,
            failures: Vec::new(),
        }
    }

    /// Total number of handlers invoked.
    pub fn attempted(&self) -> usize {
        self.delivered + self.failures.len()
    }

    /// True when no handler failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
