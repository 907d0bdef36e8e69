//! Security hotspot store

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::events::{Location, SecurityHotspotRaisedPayload};

use super::SubscriptionId;

/// A security hotspot as tracked locally.
#[derive(Debug, Clone, PartialEq)]
pub struct Hotspot {
    pub key: String,
    pub project_key: String,
    pub status: String,
    pub resolution: Option<String>,
    pub vulnerability_probability: Option<String>,
    pub rule_key: Option<String>,
    pub main_location: Location,
}

impl From<SecurityHotspotRaisedPayload> for Hotspot {
    fn from(payload: SecurityHotspotRaisedPayload) -> Self {
        Self {
            key: payload.key,
            project_key: payload.project_key,
            status: payload.status,
            resolution: None,
            vulnerability_probability: payload.vulnerability_probability,
            rule_key: payload.rule_key,
            main_location: payload.main_location,
        }
    }
}

/// A change applied to the [`HotspotStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotspotStoreChange {
    Raised { key: String },
    Changed { key: String },
    Closed { key: String },
}

type Handler = Box<dyn Fn(&HotspotStoreChange) + Send + Sync>;

/// Local mirror of the server's security hotspots, keyed by the
/// server-assigned key.
#[derive(Default)]
pub struct HotspotStore {
    hotspots: Mutex<HashMap<String, Hotspot>>,
    subscribers: Mutex<Vec<(SubscriptionId, Handler)>>,
    next_subscription: AtomicU64,
}

impl HotspotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a hotspot.
    pub fn raise(&self, hotspot: Hotspot) {
        let key = hotspot.key.clone();
        self.hotspots.lock().unwrap().insert(key.clone(), hotspot);
        self.notify(&HotspotStoreChange::Raised { key });
    }

    /// Update the status and resolution of a tracked hotspot. Returns
    /// `false` when the key is not in the store.
    pub fn change(&self, key: &str, status: &str, resolution: Option<String>) -> bool {
        let changed = {
            let mut hotspots = self.hotspots.lock().unwrap();
            match hotspots.get_mut(key) {
                Some(hotspot) => {
                    hotspot.status = status.to_string();
                    hotspot.resolution = resolution;
                    true
                }
                None => false,
            }
        };
        if changed {
            self.notify(&HotspotStoreChange::Changed {
                key: key.to_string(),
            });
        }
        changed
    }

    /// Remove a hotspot. Returns `false` when the key was not in the
    /// store; nothing is notified in that case.
    pub fn close(&self, key: &str) -> bool {
        let removed = self.hotspots.lock().unwrap().remove(key).is_some();
        if removed {
            self.notify(&HotspotStoreChange::Closed {
                key: key.to_string(),
            });
        }
        removed
    }

    pub fn get(&self, key: &str) -> Option<Hotspot> {
        self.hotspots.lock().unwrap().get(key).cloned()
    }

    /// Snapshot of all tracked hotspots.
    pub fn all(&self) -> Vec<Hotspot> {
        self.hotspots.lock().unwrap().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.hotspots.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a change handler. Handlers run synchronously on the
    /// updating thread, in subscription order.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&HotspotStoreChange) + Send + Sync + 'static,
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
    fn notify(&self, change: &HotspotStoreChange) {
        let subscribers = self.subscribers.lock().unwrap();
        for (_, handler) in subscribers.iter() {
            handler(change);
        }
    }
}
