//! Bridge from the synchronous [`Hub`] to async consumers.
//!
//! [`BroadcastHandler`] forwards every payload it receives into a
//! `tokio::sync::broadcast` channel, so tasks can `recv().await` hub
//! notifications without registering a blocking callback.

use std::sync::Arc;

use herald_core::types::HandlerId;
use tokio::sync::broadcast;

use crate::handler::{Handler, HandlerResult};
use crate::hub::Hub;

/// Default buffer capacity for bridged channels.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Handler that re-publishes payloads on a broadcast channel.
///
/// When the buffer is full, the oldest un-consumed payloads are dropped and
/// slow receivers observe `RecvError::Lagged`.
pub struct BroadcastHandler<P> {
    sender: broadcast::Sender<P>,
}

impl<P: Clone + Send + 'static> BroadcastHandler<P> {
    /// Create a handler with its own channel. Capacity is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Wrap an existing sender, e.g. one shared with other producers.
    pub fn from_sender(sender: broadcast::Sender<P>) -> Self {
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<P> {
        self.sender.subscribe()
    }
}

impl<P: Clone + Send + 'static> Handler<P> for BroadcastHandler<P> {
    fn handle(&self, payload: &P) -> HandlerResult {
        // A SendError only means there are zero receivers right now.
        let _ = self.sender.send(payload.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "broadcast"
    }
}

impl<P: Clone + Send + 'static> Hub<P> {
    /// Subscribe a new broadcast channel to `event` and return its first
    /// receiver.
    ///
    /// Unsubscribing the returned id closes the channel once the hub drops
    /// its handler; receivers then observe `RecvError::Closed`.
    pub fn subscribe_channel(
        &self,
        event: impl Into<String>,
        capacity: usize,
    ) -> (HandlerId, broadcast::Receiver<P>) {
        let handler = BroadcastHandler::new(capacity);
        let receiver = handler.subscribe();
        let id = self.register(event.into(), Arc::new(handler), false);
        (id, receiver)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
