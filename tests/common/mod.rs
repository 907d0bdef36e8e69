//! Shared helpers for integration tests.

pub mod mocks;

use std::sync::Arc;

use pushsync::store::{HotspotStore, IssueStore, TaintStore};
use pushsync::sync::EventDispatcher;

/// Initialize test logging once; later calls are no-ops.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Build one SSE frame for the given event type and payload.
#[allow(dead_code)]
pub fn frame(event_type: &str, data: &str) -> String {
    format!("event: {}\ndata: {}\n\n", event_type, data)
}

/// A dispatcher plus the stores it writes to.
#[allow(dead_code)]
pub struct Fixture {
    pub dispatcher: EventDispatcher,
    pub issues: Arc<IssueStore>,
    pub taint: Arc<TaintStore>,
    pub hotspots: Arc<HotspotStore>,
}

#[allow(dead_code)]
pub fn fixture() -> Fixture {
    let issues = Arc::new(IssueStore::new());
    let taint = Arc::new(TaintStore::new());
    let hotspots = Arc::new(HotspotStore::new());
    let dispatcher = EventDispatcher::new(
        Arc::clone(&issues),
        Arc::clone(&taint),
        Arc::clone(&hotspots),
    );
    Fixture {
        dispatcher,
        issues,
        taint,
        hotspots,
    }
}
