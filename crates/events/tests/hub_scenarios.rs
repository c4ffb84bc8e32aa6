//! Integration tests for the notification hub.
//!
//! Exercises the public API the way a caller outside the crate would:
//! observer-style ordered delivery, cancellation by handle, failure
//! policies loaded from configuration, and async consumption through the
//! broadcast bridge.

use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use herald_events::bridge::BroadcastHandler;
use herald_events::{
    FailurePolicy, Handler, HandlerError, HandlerResult, Hub, HubConfig, HubError,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// An observer that records every payload it sees under its own name.
struct Observer {
    name: &'static str,
    seen: Arc<Mutex<Vec<String>>>,
}

impl Handler<String> for Observer {
    fn handle(&self, payload: &String) -> HandlerResult {
        self.seen
            .lock()
            .map_err(|_| HandlerError::new("log poisoned"))?
            .push(format!("{}:{payload}", self.name));
        Ok(())
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// An observer that always rejects the payload.
struct Rejecting;

impl Handler<String> for Rejecting {
    fn handle(&self, payload: &String) -> HandlerResult {
        Err(HandlerError::new(format!("cannot handle '{payload}'")))
    }

    fn name(&self) -> &str {
        "rejecting"
    }
}

fn observer(name: &'static str, seen: &Arc<Mutex<Vec<String>>>) -> Observer {
    Observer {
        name,
        seen: Arc::clone(seen),
    }
}

// ---------------------------------------------------------------------------
// Test: observer scenarios
// ---------------------------------------------------------------------------

/// Subscribe A then B to "changed"; emitting "x" calls A("x") then B("x").
#[test]
fn observers_receive_payload_in_subscription_order() {
    let hub: Hub<String> = Hub::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    hub.subscribe("changed", observer("A", &seen));
    hub.subscribe("changed", observer("B", &seen));

    let report = hub
        .emit("changed", &"x".to_string())
        .expect("emit should succeed");

    assert_eq!(*seen.lock().unwrap(), vec!["A:x", "B:x"]);
    assert_eq!(report.event, "changed");
    assert_eq!(report.delivered, 2);
}

/// Subscribe A; unsubscribe A; emitting produces no calls.
#[test]
fn cancelled_observer_receives_nothing() {
    let hub: Hub<String> = Hub::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let a = hub.subscribe("changed", observer("A", &seen));

    hub.unsubscribe("changed", a);
    let report = hub
        .emit("changed", &"x".to_string())
        .expect("emit should succeed");

    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(report.attempted(), 0);
}

// ---------------------------------------------------------------------------
// Test: failure policy from configuration
// ---------------------------------------------------------------------------

/// The default configuration isolates failures and names the failing
/// handler in the report.
#[test]
fn default_config_isolates_failures() {
    let hub: Hub<String> = Hub::with_config(HubConfig::default());
    let seen = Arc::new(Mutex::new(Vec::new()));
    hub.subscribe("changed", Rejecting);
    hub.subscribe("changed", observer("B", &seen));

    let report = hub
        .emit("changed", &"x".to_string())
        .expect("isolate never fails");

    assert_eq!(*seen.lock().unwrap(), vec!["B:x"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].handler, "rejecting");
    assert_eq!(report.failures[0].message, "cannot handle 'x'");

    let json = serde_json::to_value(&report).expect("report should serialize");
    assert_eq!(json["failures"][0]["handler"], "rejecting");
}

/// With the propagate policy the first failure aborts the emit.
#[test]
fn propagate_config_aborts_delivery() {
    let config = HubConfig::default().with_failure_policy(FailurePolicy::Propagate);
    let hub: Hub<String> = Hub::with_config(config);
    let seen = Arc::new(Mutex::new(Vec::new()));
    hub.subscribe("changed", observer("A", &seen));
    let rejecting = hub.subscribe("changed", Rejecting);
    hub.subscribe("changed", observer("C", &seen));

    let err = hub.emit("changed", &"x".to_string()).unwrap_err();

    assert_eq!(*seen.lock().unwrap(), vec!["A:x"]);
    assert_matches!(
        err,
        HubError::HandlerFailed { ref handler, handler_id, .. }
            if handler == "rejecting" && handler_id == rejecting
    );
    assert!(err.to_string().contains("rejecting"));
}

// ---------------------------------------------------------------------------
// Test: async consumers
// ---------------------------------------------------------------------------

/// A task awaiting a bridged channel receives payloads emitted from a
/// blocking thread.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn bridged_channel_feeds_async_task() {
    let hub: Arc<Hub<String>> = Arc::new(Hub::new());
    let bridge = BroadcastHandler::new(8);
    let mut rx = bridge.subscribe();
    hub.subscribe("changed", bridge);

    let consumer = tokio::spawn(async move {
        let mut received = Vec::new();
        while received.len() < 3 {
            received.push(rx.recv().await.expect("channel should stay open"));
        }
        received
    });

    let producer = {
        let hub = Arc::clone(&hub);
        tokio::task::spawn_blocking(move || {
            for value in ["a", "b", "c"] {
                hub.emit("changed", &value.to_string())
                    .expect("emit should succeed");
            }
        })
    };

    producer.await.expect("producer should not panic");
    let received = consumer.await.expect("consumer should not panic");
    assert_eq!(received, vec!["a", "b", "c"]);
}
