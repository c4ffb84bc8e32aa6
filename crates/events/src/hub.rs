//! Name-keyed, synchronous notification hub.
//!
//! [`Hub`] keeps one ordered handler list per event name and dispatches
//! payloads to every handler on that list, in registration order, on the
//! calling thread. It is designed to be shared via `Arc<Hub<P>>`.
//!
//! ```text
//!   emit("changed", &p)
//!        │  lock ─► snapshot list ─► unlock
//!        ├──────────► handler h1.handle(&p)
//!        ├──────────► handler h2.handle(&p)   (panic caught → failure)
//!        └──────────► handler hN.handle(&p)
//! ```
//!
//! Handlers never run while the lock is held, so they may subscribe,
//! unsubscribe or emit on the same hub.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use herald_core::policy::FailurePolicy;
use herald_core::types::HandlerId;

use crate::config::HubConfig;
use crate::error::HubError;
use crate::handler::Handler;
use crate::report::{DispatchReport, HandlerFailure};

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

struct Registration<P> {
    id: HandlerId,
    handler: Arc<dyn Handler<P>>,
    once: bool,
}

// Manual impl: cloning only bumps the `Arc`, `P` need not be `Clone`.
impl<P> Clone for Registration<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            handler: Arc::clone(&self.handler),
            once: self.once,
        }
    }
}

struct Registry<P> {
    next_id: u64,
    /// Never holds an empty list.
    lists: HashMap<String, Vec<Registration<P>>>,
}

// ---------------------------------------------------------------------------
// Hub
// ---------------------------------------------------------------------------

/// In-process publish/subscribe hub keyed by event name.
///
/// # Usage
///
/// ```rust
/// use herald_events::{Hub, HandlerResult};
///
/// let hub: Hub<String> = Hub::new();
/// let id = hub.subscribe("changed", |value: &String| -> HandlerResult {
///     println!("changed to {value}");
///     Ok(())
/// });
///
/// let report = hub.emit("changed", &"x".to_string()).unwrap();
/// assert_eq!(report.delivered, 1);
///
/// hub.unsubscribe("changed", id);
/// ```
pub struct Hub<P> {
    config: HubConfig,
    registry: Mutex<Registry<P>>,
}

impl<P: 'static> Hub<P> {
    /// Create a hub with the default configuration
    /// ([`FailurePolicy::Isolate`]).
    pub fn new() -> Self {
        Self::with_config(HubConfig::default())
    }

    pub fn with_config(config: HubConfig) -> Self {
        Self {
            config,
            registry: Mutex::new(Registry {
                next_id: 0,
                lists: HashMap::new(),
            }),
        }
    }

    /// Create a hub configured from the environment (see
    /// [`HubConfig::from_env`]).
    pub fn from_env() -> Result<Self, HubError> {
        Ok(Self::with_config(HubConfig::from_env()?))
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Register `handler` at the end of `event`'s list.
    ///
    /// Registering the same handler value twice yields two distinct handles
    /// and two deliveries per emit.
    pub fn subscribe<H>(&self, event: impl Into<String>, handler: H) -> HandlerId
    where
        H: Handler<P>,
    {
        self.register(event.into(), Arc::new(handler), false)
    }

    /// Register `handler` for a single delivery.
    ///
    /// The registration is claimed (removed from the list) immediately
    /// before the handler runs, so concurrent emits cannot both deliver to
    /// it. An emit that aborts before reaching it leaves it registered.
    pub fn subscribe_once<H>(&self, event: impl Into<String>, handler: H) -> HandlerId
    where
        H: Handler<P>,
    {
        self.register(event.into(), Arc::new(handler), true)
    }

    pub(crate) fn register(
        &self,
        event: String,
        handler: Arc<dyn Handler<P>>,
        once: bool,
    ) -> HandlerId {
        let mut registry = self.lock();
        registry.next_id += 1;
        let id = HandlerId::from_raw(registry.next_id);

        tracing::debug!(
            event = %event,
            handler_id = %id,
            handler = handler.name(),
            once,
            "Handler subscribed",
        );

        registry
            .lists
            .entry(event)
            .or_default()
            .push(Registration { id, handler, once });
        id
    }

    /// Remove the registration `id` from `event`'s list.
    ///
    /// Returns `false` (and does nothing) when no such registration exists.
    pub fn unsubscribe(&self, event: &str, id: HandlerId) -> bool {
        let mut registry = self.lock();
        let Some(list) = registry.lists.get_mut(event) else {
            return false;
        };
        let Some(pos) = list.iter().position(|r| r.id == id) else {
            return false;
        };

        list.remove(pos);
        if list.is_empty() {
            registry.lists.remove(event);
        }

        tracing::debug!(event, handler_id = %id, "Handler unsubscribed");
        true
    }

    /// Remove every registration for `event`, returning how many there were.
    pub fn clear(&self, event: &str) -> usize {
        let removed = self.lock().lists.remove(event).map_or(0, |list| list.len());
        if removed > 0 {
            tracing::debug!(event, removed, "Event handlers cleared");
        }
        removed
    }

    /// Remove every registration for every event.
    pub fn clear_all(&self) {
        let mut registry = self.lock();
        let events = registry.lists.len();
        registry.lists.clear();
        tracing::debug!(events, "All handlers cleared");
    }

    pub fn subscriber_count(&self, event: &str) -> usize {
        self.lock().lists.get(event).map_or(0, Vec::len)
    }

    pub fn has_subscribers(&self, event: &str) -> bool {
        self.lock().lists.contains_key(event)
    }

    /// Names with at least one registration, sorted.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().lists.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.lock().lists.is_empty()
    }

    /// Deliver `payload` to every handler registered for `event`, in
    /// registration order, on the calling thread.
    ///
    /// With no handlers this is a no-op returning an empty report. A handler
    /// that returns `Err` or panics is handled according to the configured
    /// [`FailurePolicy`]:
    ///
    /// - `Isolate`: the failure is logged and recorded in the report, and
    ///   delivery continues. Always returns `Ok`.
    /// - `Propagate`: delivery stops and [`HubError::HandlerFailed`] is
    ///   returned.
    pub fn emit(&self, event: &str, payload: &P) -> Result<DispatchReport, HubError> {
        let selected = self.select(event);
        let mut report = DispatchReport::empty(event);

        if selected.is_empty() {
            tracing::trace!(event, "No handlers registered");
            return Ok(report);
        }

        tracing::trace!(event, handlers = selected.len(), "Dispatching");

        for registration in &selected {
            if registration.once && !self.claim(event, registration.id) {
                continue;
            }

            let Some(failure) = invoke(registration, payload) else {
                report.delivered += 1;
                continue;
            };

            match self.config.failure_policy {
                FailurePolicy::Isolate => {
                    tracing::warn!(
                        event,
                        handler_id = %failure.handler_id,
                        handler = %failure.handler,
                        panicked = failure.panicked,
                        error = %failure.message,
                        "Handler failed; continuing delivery",
                    );
                    report.failures.push(failure);
                }
                FailurePolicy::Propagate => {
                    tracing::error!(
                        event,
                        handler_id = %failure.handler_id,
                        handler = %failure.handler,
                        panicked = failure.panicked,
                        error = %failure.message,
                        delivered = report.delivered,
                        "Handler failed; aborting delivery",
                    );
                    return Err(HubError::HandlerFailed {
                        event: event.to_owned(),
                        handler_id: failure.handler_id,
                        handler: failure.handler,
                        message: failure.message,
                    });
                }
            }
        }

        Ok(report)
    }

    /// Snapshot the list for `event`.
    fn select(&self, event: &str) -> Vec<Registration<P>> {
        self.lock().lists.get(event).cloned().unwrap_or_default()
    }

    /// Remove a once-registration ahead of its single delivery. Returns
    /// `false` when another emit claimed it first or it was unsubscribed.
    fn claim(&self, event: &str, id: HandlerId) -> bool {
        let mut registry = self.lock();
        let Some(list) = registry.lists.get_mut(event) else {
            return false;
        };
        let Some(pos) = list.iter().position(|r| r.id == id) else {
            return false;
        };

        list.remove(pos);
        if list.is_empty() {
            registry.lists.remove(event);
        }
        true
    }

    // Handlers never run under the lock, so a poisoned registry is still
    // consistent.
    fn lock(&self) -> MutexGuard<'_, Registry<P>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P: 'static> Default for Hub<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for Hub<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let handlers: usize = registry.lists.values().map(Vec::len).sum();
        f.debug_struct("Hub")
            .field("config", &self.config)
            .field("events", &registry.lists.len())
            .field("handlers", &handlers)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// Run one handler, catching panics. Returns `None` on success.
fn invoke<P: 'static>(registration: &Registration<P>, payload: &P) -> Option<HandlerFailure> {
    let handler = registration.handler.as_ref();
    let (message, panicked) =
        match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(payload))) {
            Ok(Ok(())) => return None,
            Ok(Err(err)) => (err.to_string(), false),
            Err(panic) => (panic_message(&*panic), true),
        };

    Some(HandlerFailure {
        handler_id: registration.id,
        handler: handler.name().to_owned(),
        message,
        panicked,
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_owned()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
