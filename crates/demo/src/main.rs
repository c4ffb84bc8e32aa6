//! `herald-demo` -- walks through the notification hub end to end.
//!
//! Registers a few observers on a shared hub, emits JSON payloads from a
//! blocking thread, and consumes the same notifications from an async task
//! through the broadcast bridge.
//!
//! # Environment variables
//!
//! | Variable                | Required | Default   | Description                          |
//! |-------------------------|----------|-----------|--------------------------------------|
//! | `HERALD_FAILURE_POLICY` | no       | `isolate` | `isolate` or `propagate`             |
//! | `RUST_LOG`              | no       | see below | Standard `tracing` env filter        |

use std::sync::Arc;

use herald_events::bridge::DEFAULT_CAPACITY;
use herald_events::{DispatchReport, HandlerError, HandlerResult, Hub};
use serde_json::{json, Value};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EVENT_CHANGED: &str = "document.changed";
const EVENT_SAVED: &str = "document.saved";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "herald_demo=info,herald_events=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let hub: Arc<Hub<Value>> = Arc::new(Hub::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid hub configuration");
        std::process::exit(1);
    }));

    tracing::info!(
        failure_policy = %hub.config().failure_policy,
        "Starting herald-demo",
    );

    hub.subscribe(EVENT_CHANGED, |doc: &Value| -> HandlerResult {
        tracing::info!(title = %doc["title"], "Renderer refreshed");
        Ok(())
    });
    let audit = hub.subscribe(EVENT_CHANGED, |doc: &Value| -> HandlerResult {
        let revision = doc["revision"]
            .as_u64()
            .ok_or_else(|| HandlerError::new("payload has no revision"))?;
        tracing::info!(revision, "Audit entry written");
        Ok(())
    });
    hub.subscribe_once(EVENT_SAVED, |doc: &Value| -> HandlerResult {
        tracing::info!(title = %doc["title"], "First save, sending welcome tip");
        Ok(())
    });

    let (_, mut rx) = hub.subscribe_channel(EVENT_CHANGED, DEFAULT_CAPACITY);
    let consumer = tokio::spawn(async move {
        let mut count = 0usize;
        while let Ok(doc) = rx.recv().await {
            count += 1;
            tracing::info!(count, doc = %doc, "Async consumer received change");
        }
        count
    });

    let producer = {
        let hub = Arc::clone(&hub);
        tokio::task::spawn_blocking(move || {
            let payloads = [
                json!({ "title": "notes", "revision": 1 }),
                json!({ "title": "notes" }),
                json!({ "title": "notes", "revision": 3 }),
            ];
            for doc in &payloads {
                dispatch(&hub, EVENT_CHANGED, doc);
                // The once-observer only fires for the first save.
                dispatch(&hub, EVENT_SAVED, doc);
            }
        })
    };

    if let Err(e) = producer.await {
        tracing::error!(error = %e, "Producer task failed");
    }

    hub.unsubscribe(EVENT_CHANGED, audit);
    // Dropping the bridge handler closes the channel and ends the consumer.
    hub.clear_all();

    match consumer.await {
        Ok(count) => tracing::info!(count, hub = ?hub, "Demo finished"),
        Err(e) => tracing::error!(error = %e, "Consumer task failed"),
    }
}

/// Emit `doc` on `event` and log the outcome. Returns `None` when the
/// dispatch was aborted by a failing handler.
fn dispatch(hub: &Hub<Value>, event: &str, doc: &Value) -> Option<DispatchReport> {
    match hub.emit(event, doc) {
        Ok(report) => {
            tracing::info!(
                event,
                report = %serde_json::to_string(&report).unwrap_or_default(),
                "Event dispatched",
            );
            Some(report)
        }
        Err(e) => {
            tracing::error!(event, error = %e, "Event dispatch aborted");
            None
        }
    }
}
