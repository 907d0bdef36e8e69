//! Taint vulnerability store

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::events::{Flow, Location, TaintVulnerabilityRaisedPayload};

use super::SubscriptionId;

/// A taint vulnerability as tracked locally.
#[derive(Debug, Clone, PartialEq)]
pub struct TaintVulnerability {
    pub key: String,
    pub project_key: String,
    pub branch: Option<String>,
    pub creation_date: DateTime<Utc>,
    pub rule_key: String,
    pub severity: Option<String>,
    pub rule_type: Option<String>,
    pub main_location: Location,
    pub flows: Vec<Flow>,
}

impl From<TaintVulnerabilityRaisedPayload> for TaintVulnerability {
    fn from(payload: TaintVulnerabilityRaisedPayload) -> Self {
        Self {
            key: payload.key,
            project_key: payload.project_key,
            branch: payload.branch,
            creation_date: payload.creation_date,
            rule_key: payload.rule_key,
            severity: payload.severity,
            rule_type: payload.rule_type,
            main_location: payload.main_location,
            flows: payload.flows,
        }
    }
}

/// A change applied to the [`TaintStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaintStoreChange {
    Raised { key: String },
    Closed { key: String },
}

type Handler = Box<dyn Fn(&TaintStoreChange) + Send + Sync>;

/// Local mirror of the server's open taint vulnerabilities, keyed by
/// the server-assigned key. Re-raising an existing key replaces the
/// stored vulnerability.
#[derive(Default)]
pub struct TaintStore {
    vulnerabilities: Mutex<HashMap<String, TaintVulnerability>>,
    subscribers: Mutex<Vec<(SubscriptionId, Handler)>>,
    next_subscription: AtomicU64,
}

impl TaintStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a vulnerability.
    pub fn raise(&self, vulnerability: TaintVulnerability) {
        let key = vulnerability.key.clone();
        self.vulnerabilities
            .lock()
            .unwrap()
            .insert(key.clone(), vulnerability);
        self.notify(&TaintStoreChange::Raised { key });
    }

    /// Remove a vulnerability. Returns `false` when the key was not in
    /// the store; nothing is notified in that case.
    pub fn close(&self, key: &str) -> bool {
        let removed = self.vulnerabilities.lock().unwrap().remove(key).is_some();
        if removed {
            self.notify(&TaintStoreChange::Closed {
                key: key.to_string(),
            });
        }
        removed
    }

    pub fn get(&self, key: &str) -> Option<TaintVulnerability> {
        self.vulnerabilities.lock().unwrap().get(key).cloned()
    }

    /// Snapshot of all open vulnerabilities.
    pub fn all(&self) -> Vec<TaintVulnerability> {
        self.vulnerabilities.lock().unwrap().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.vulnerabilities.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a change handler. Handlers run synchronously on the
    /// updating thread, in subscription order.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&TaintStoreChange) + Send + Sync + 'static,
    {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .unwrap()
            .push((id, Box::new(handler)));
        id
    }

    /// Remove a previously registered handler.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock().unwrap();
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        subscribers.len() != before
    }

    // Handlers run outside the data lock so they may query the store.
    fn notify(&self, change: &TaintStoreChange) {
        let subscribers = self.subscribers.lock().unwrap();
        for (_, handler) in subscribers.iter() {
            handler(change);
        }
    }
}
