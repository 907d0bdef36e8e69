//! Push event payload structs
//!
//! Deserialization targets for the JSON carried in each event's `data`
//! field. Field names follow the server's camelCase wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload of an `IssueChanged` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueChangedPayload {
    pub project_key: String,
    /// The issues affected by this change
    pub issues: Vec<ChangedIssue>,
    /// New user-assigned severity, when the change carries one
    #[serde(default)]
    pub user_severity: Option<String>,
    /// New user-assigned type, when the change carries one
    #[serde(default)]
    pub user_type: Option<String>,
}

/// One issue entry inside an `IssueChanged` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedIssue {
    pub issue_key: String,
    #[serde(default)]
    pub branch_name: Option<String>,
    /// Whether the issue is now resolved (suppressed) on the server
    #[serde(default)]
    pub resolved: bool,
}

/// Payload of a `TaintVulnerabilityRaised` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaintVulnerabilityRaisedPayload {
    pub key: String,
    pub project_key: String,
    #[serde(default)]
    pub branch: Option<String>,
    /// Server-side creation time, sent as epoch milliseconds
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub creation_date: DateTime<Utc>,
    pub rule_key: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default, rename = "type")]
    pub rule_type: Option<String>,
    pub main_location: Location,
    #[serde(default)]
    pub flows: Vec<Flow>,
}

/// Payload of a `TaintVulnerabilityClosed` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaintVulnerabilityClosedPayload {
    pub key: String,
    pub project_key: String,
}

/// Payload of a `SecurityHotspotRaised` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityHotspotRaisedPayload {
    pub key: String,
    pub project_key: String,
    pub status: String,
    #[serde(default)]
    pub vulnerability_probability: Option<String>,
    #[serde(default)]
    pub rule_key: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    pub main_location: Location,
}

/// Payload of a `SecurityHotspotChanged` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityHotspotChangedPayload {
    pub key: String,
    pub project_key: String,
    pub status: String,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
}

/// Payload of a `SecurityHotspotClosed` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityHotspotClosedPayload {
    pub key: String,
    pub project_key: String,
}

/// A code location reported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub file_path: String,
    pub message: String,
    /// Absent when the location covers the whole file
    #[serde(default)]
    pub text_range: Option<TextRange>,
}

/// One step of a taint flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub locations: Vec<Location>,
}

/// A text range within a file, with the server's line hash for
/// relocation after local edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRange {
    pub start_line: u32,
    pub start_line_offset: u32,
    pub end_line: u32,
    pub end_line_offset: u32,
    #[serde(default)]
    pub hash: Option<String>,
}
