//! In-memory synchronized stores
//!
//! Shared state updated by the sync listener and read by the host
//! application. Each store is `Send + Sync` and exposes an explicit
//! `subscribe`/`unsubscribe` pair; change handlers run synchronously on
//! the updating thread, in subscription order, outside the data lock.

mod hotspots;
mod issues;
mod taint;

pub use hotspots::{Hotspot, HotspotStore, HotspotStoreChange};
pub use issues::{IssueStore, IssueStoreChange};
pub use taint::{TaintStore, TaintStoreChange, TaintVulnerability};

/// Handle returned by `subscribe`, accepted by `unsubscribe`.
pub type SubscriptionId = u64;
