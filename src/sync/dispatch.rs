//! Event-to-store translation

use std::sync::Arc;

use tracing::debug;

use crate::events::{decode_event, DecodeError, IssueChangedPayload, PushEvent};
use crate::sse::ServerEvent;
use crate::store::{Hotspot, HotspotStore, IssueStore, TaintStore, TaintVulnerability};

/// Routes each decoded push event to the store it affects.
///
/// Stores are shared with the host application behind `Arc`; the
/// dispatcher performs the translation, the stores notify their own
/// subscribers.
#[derive(Clone)]
pub struct EventDispatcher {
    issues: Arc<IssueStore>,
    taint: Arc<TaintStore>,
    hotspots: Arc<HotspotStore>,
}

impl EventDispatcher {
    pub fn new(
        issues: Arc<IssueStore>,
        taint: Arc<TaintStore>,
        hotspots: Arc<HotspotStore>,
    ) -> Self {
        Self {
            issues,
            taint,
            hotspots,
        }
    }

    /// Decode one server event and apply it to the stores.
    ///
    /// Unknown event types are logged and skipped. A decode failure is
    /// returned to the caller, which logs it and moves on to the next
    /// event; one bad event never poisons the session.
    pub fn dispatch(&self, event: &ServerEvent) -> Result<(), DecodeError> {
        match decode_event(event)? {
            PushEvent::IssueChanged(payload) => self.apply_issue_changed(payload),
            PushEvent::TaintVulnerabilityRaised(payload) => {
                debug!(key = %payload.key, "taint vulnerability raised");
                self.taint.raise(TaintVulnerability::from(payload));
            }
            PushEvent::TaintVulnerabilityClosed(payload) => {
                if !self.taint.close(&payload.key) {
                    debug!(key = %payload.key, "closed taint vulnerability was not tracked");
                }
            }
            PushEvent::SecurityHotspotRaised(payload) => {
                debug!(key = %payload.key, "security hotspot raised");
                self.hotspots.raise(Hotspot::from(payload));
            }
            PushEvent::SecurityHotspotChanged(payload) => {
                if !self
                    .hotspots
                    .change(&payload.key, &payload.status, payload.resolution)
                {
                    debug!(key = %payload.key, "changed security hotspot was not tracked");
                }
            }
            PushEvent::SecurityHotspotClosed(payload) => {
                if !self.hotspots.close(&payload.key) {
                    debug!(key = %payload.key, "closed security hotspot was not tracked");
                }
            }
            PushEvent::Unknown { event_type } => {
                debug!(%event_type, "ignoring unrecognized server event");
            }
        }
        Ok(())
    }

    /// Group issue keys by resolved-state and apply one store update
    /// per group.
    fn apply_issue_changed(&self, payload: IssueChangedPayload) {
        let (resolved, reopened): (Vec<_>, Vec<_>) =
            payload.issues.into_iter().partition(|issue| issue.resolved);

        if !resolved.is_empty() {
            let keys: Vec<String> = resolved.into_iter().map(|issue| issue.issue_key).collect();
            debug!(count = keys.len(), "suppressing resolved issues");
            self.issues.set_resolved(&keys, true);
        }
        if !reopened.is_empty() {
            let keys: Vec<String> = reopened.into_iter().map(|issue| issue.issue_key).collect();
            debug!(count = keys.len(), "reopening issues");
            self.issues.set_resolved(&keys, false);
        }
    }
}
