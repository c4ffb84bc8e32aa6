//! Herald in-process notification hub.
//!
//! This crate provides the building blocks for synchronous, name-keyed
//! publish/subscribe inside a single process:
//!
//! - [`Hub`] — maps event names to ordered handler lists and dispatches
//!   payloads to them in registration order.
//! - [`Handler`] — the callback capability a hub stores; any
//!   `Fn(&P) -> Result<(), HandlerError>` closure qualifies.
//! - [`DispatchReport`] — per-emit summary of deliveries and failures.
//! - [`HubConfig`] — failure policy configuration, loadable from the
//!   environment.
//! - [`bridge`] — forwards hub notifications into a
//!   `tokio::sync::broadcast` channel for async consumers.

pub mod bridge;
pub mod config;
pub mod error;
pub mod handler;
pub mod hub;
pub mod report;

pub use config::HubConfig;
pub use error::HubError;
pub use handler::{Handler, HandlerError, HandlerResult};
pub use herald_core::policy::FailurePolicy;
pub use herald_core::types::HandlerId;
pub use hub::Hub;
pub use report::{DispatchReport, HandlerFailure};
