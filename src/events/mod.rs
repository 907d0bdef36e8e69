//! Typed push events
//!
//! Decodes a raw [`ServerEvent`] into a typed [`PushEvent`] by matching
//! the event type and deserializing the JSON payload. Unknown event
//! types decode to [`PushEvent::Unknown`] so a newer server does not
//! break older clients.

mod payloads;

pub use payloads::{
    ChangedIssue, Flow, IssueChangedPayload, Location, SecurityHotspotChangedPayload,
    SecurityHotspotClosedPayload, SecurityHotspotRaisedPayload, TaintVulnerabilityClosedPayload,
    TaintVulnerabilityRaisedPayload, TextRange,
};

use crate::sse::ServerEvent;

/// Event type for issue resolution changes.
pub const ISSUE_CHANGED: &str = "IssueChanged";
/// Event type for a newly reported taint vulnerability.
pub const TAINT_VULNERABILITY_RAISED: &str = "TaintVulnerabilityRaised";
/// Event type for a taint vulnerability closed on the server.
pub const TAINT_VULNERABILITY_CLOSED: &str = "TaintVulnerabilityClosed";
/// Event type for a newly reported security hotspot.
pub const SECURITY_HOTSPOT_RAISED: &str = "SecurityHotspotRaised";
/// Event type for a security hotspot status change.
pub const SECURITY_HOTSPOT_CHANGED: &str = "SecurityHotspotChanged";
/// Event type for a security hotspot closed on the server.
pub const SECURITY_HOTSPOT_CLOSED: &str = "SecurityHotspotClosed";

/// A push event decoded from the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    /// One or more issues changed resolution state
    IssueChanged(IssueChangedPayload),
    /// A taint vulnerability was raised
    TaintVulnerabilityRaised(TaintVulnerabilityRaisedPayload),
    /// A taint vulnerability was closed
    TaintVulnerabilityClosed(TaintVulnerabilityClosedPayload),
    /// A security hotspot was raised
    SecurityHotspotRaised(SecurityHotspotRaisedPayload),
    /// A security hotspot changed status or resolution
    SecurityHotspotChanged(SecurityHotspotChangedPayload),
    /// A security hotspot was closed
    SecurityHotspotClosed(SecurityHotspotClosedPayload),
    /// An event type this client does not recognize
    Unknown { event_type: String },
}

/// Errors that can occur while decoding an event payload.
#[derive(Debug)]
pub enum DecodeError {
    /// The payload was not valid JSON for the declared event type
    InvalidJson {
        event_type: String,
        source: serde_json::Error,
    },
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::InvalidJson { event_type, source } => {
                write!(f, "Invalid JSON for event '{}': {}", event_type, source)
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::InvalidJson { source, .. } => Some(source),
        }
    }
}

/// Decode a raw server event into a typed [`PushEvent`].
///
/// Unknown event types are not an error; they decode to
/// [`PushEvent::Unknown`] and the caller decides whether to log or
/// ignore them.
pub fn decode_event(event: &ServerEvent) -> Result<PushEvent, DecodeError> {
    fn decode<T: serde::de::DeserializeOwned>(event: &ServerEvent) -> Result<T, DecodeError> {
        serde_json::from_str(&event.data).map_err(|source| DecodeError::InvalidJson {
            event_type: event.event_type.clone(),
            source,
        })
    }

    match event.event_type.as_str() {
        ISSUE_CHANGED => decode(event).map(PushEvent::IssueChanged),
        TAINT_VULNERABILITY_RAISED => decode(event).map(PushEvent::TaintVulnerabilityRaised),
        TAINT_VULNERABILITY_CLOSED => decode(event).map(PushEvent::TaintVulnerabilityClosed),
        SECURITY_HOTSPOT_RAISED => decode(event).map(PushEvent::SecurityHotspotRaised),
        SECURITY_HOTSPOT_CHANGED => decode(event).map(PushEvent::SecurityHotspotChanged),
        SECURITY_HOTSPOT_CLOSED => decode(event).map(PushEvent::SecurityHotspotClosed),
        other => Ok(PushEvent::Unknown {
            event_type: other.to_string(),
        }),
    }
}
