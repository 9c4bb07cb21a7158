use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Changelog field name carrying workflow transitions.
pub const STATUS_FIELD: &str = "status";

/// One field change recorded at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub timestamp: DateTime<FixedOffset>,
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_status: Option<String>,
}

impl StatusEvent {
    pub fn is_status_change(&self) -> bool {
        self.field == STATUS_FIELD
    }
}

/// A single issue with its fully resolved changelog, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub key: String,
    pub created_at: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<StatusEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
}

impl IssueRecord {
    /// Project prefix of the issue key (`ABC` for `ABC-123`).
    pub fn project_key(&self) -> &str {
        self.key
            .rsplit_once('-')
            .map_or(self.key.as_str(), |(project, _)| project)
    }
}
