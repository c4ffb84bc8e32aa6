use herald_core::error::CoreError;
use herald_core::types::HandlerId;

/// Errors surfaced by [`Hub`](crate::Hub) operations.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// A handler failed while the hub was configured with
    /// [`FailurePolicy::Propagate`](herald_core::policy::FailurePolicy::Propagate).
    #[error("Handler '{handler}' ({handler_id}) failed on '{event}': {message}")]
    HandlerFailed {
        event: String,
        handler_id: HandlerId,
        handler: String,
        message: String,
    },

    #[error("Invalid hub configuration: {0}")]
    Config(#[from] CoreError),
}
