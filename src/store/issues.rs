//! Server-resolved issue tracking

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use super::SubscriptionId;

/// A change applied to the [`IssueStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueStoreChange {
    /// Keys whose suppression state actually changed
    pub keys: Vec<String>,
    /// The new state: `true` when the keys became resolved
    pub resolved: bool,
}

type Handler = Box<dyn Fn(&IssueStoreChange) + Send + Sync>;

/// Tracks which issue keys the server currently reports as resolved.
///
/// Locally these keys are suppressed; a reopened issue drops back out
/// of the set. One grouped update per resolved-state, as delivered by
/// the dispatcher.
#[derive(Default)]
pub struct IssueStore {
    resolved: Mutex<HashSet<String>>,
    subscribers: Mutex<Vec<(SubscriptionId, Handler)>>,
    next_subscription: AtomicU64,
}

impl IssueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one grouped suppression update.
    ///
    /// Only keys whose state actually changed are reported to
    /// subscribers; a no-op update produces no notification.
    pub fn set_resolved(&self, keys: &[String], resolved: bool) {
        let mut changed = Vec::new();
        {
            let mut set = self.resolved.lock().unwrap();
            for key in keys {
                let applied = if resolved {
                    set.insert(key.clone())
                } else {
                    set.remove(key)
                };
                if applied {
                    changed.push(key.clone());
                }
            }
        }

        if !changed.is_empty() {
            self.notify(&IssueStoreChange {
                keys: changed,
                resolved,
            });
        }
    }

    /// Whether the server currently reports `key` as resolved.
    pub fn is_resolved(&self, key: &str) -> bool {
        self.resolved.lock().unwrap().contains(key)
    }

    /// Snapshot of all resolved keys, sorted for stable iteration.
    pub fn resolved_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.resolved.lock().unwrap().iter().cloned().collect();
        keys.sort();
        keys
    }

    /// Register a change handler. Handlers run synchronously on the
    /// updating thread, in subscription order.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&IssueStoreChange) + Send + Sync + 'static,
    {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .unwrap()
            .push((id, Box::new(handler)));
        id
    }

    /// Remove a previously registered handler. Returns `false` when the
    /// id is unknown or already removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock().unwrap();
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        subscribers.len() != before
    }

    // Handlers run outside the data lock so they may query the store.
    fn notify(&self, change: &IssueStoreChange) {
        let subscribers = self.subscribers.lock().unwrap();
        for (_, handler) in subscribers.iter() {
            handler(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn keys(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_set_resolved_and_query() {
        let store = IssueStore::new();
        store.set_resolved(&keys(&["a", "b"]), true);

        assert!(store.is_resolved("a"));
        assert!(store.is_resolved("b"));
        assert!(!store.is_resolved("c"));
        assert_eq!(store.resolved_keys(), keys(&["a", "b"]));
    }

    #[test]
    fn test_reopen_removes_keys() {
        let store = IssueStore::new();
        store.set_resolved(&keys(&["a", "b"]), true);
        store.set_resolved(&keys(&["a"]), false);

        assert!(!store.is_resolved("a"));
        assert!(store.is_resolved("b"));
    }

    #[test]
    fn test_subscribers_see_grouped_changes() {
        let store = IssueStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        store.subscribe(move |change| {
            seen_clone.lock().unwrap().push(change.clone());
        });

        store.set_resolved(&keys(&["a", "b"]), true);
        store.set_resolved(&keys(&["a"]), false);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].keys, keys(&["a", "b"]));
        assert!(seen[0].resolved);
        assert_eq!(seen[1].keys, keys(&["a"]));
        assert!(!seen[1].resolved);
    }

    #[test]
    fn test_noop_update_does_not_notify() {
        let store = IssueStore::new();
        let calls = Arc::new(Mutex::new(0u32));
        let calls_clone = Arc::clone(&calls);
        store.subscribe(move |_| {
            *calls_clone.lock().unwrap() += 1;
        });

        // "a" was never resolved, so reopening it changes nothing
        store.set_resolved(&keys(&["a"]), false);
        assert_eq!(*calls.lock().unwrap(), 0);

        // Resolving twice notifies once
        store.set_resolved(&keys(&["a"]), true);
        store.set_resolved(&keys(&["a"]), true);
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let store = IssueStore::new();
        let calls = Arc::new(Mutex::new(0u32));
        let calls_clone = Arc::clone(&calls);
        let id = store.subscribe(move |_| {
            *calls_clone.lock().unwrap() += 1;
        });

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));

        store.set_resolved(&keys(&["a"]), true);
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let store = IssueStore::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for label in ["first", "second", "third"] {
            let order_clone = Arc::clone(&order);
            store.subscribe(move |_| {
                order_clone.lock().unwrap().push(label);
            });
        }

        store.set_resolved(&keys(&["a"]), true);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_handler_may_query_the_store() {
        let store = Arc::new(IssueStore::new());
        let store_clone = Arc::clone(&store);
        let observed = Arc::new(Mutex::new(false));
        let observed_clone = Arc::clone(&observed);
        store.subscribe(move |change| {
            // Would deadlock if notify held the data lock
            *observed_clone.lock().unwrap() = store_clone.is_resolved(&change.keys[0]);
        });

        store.set_resolved(&keys(&["a"]), true);
        assert!(*observed.lock().unwrap());
    }
}
