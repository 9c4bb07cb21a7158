use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};
use crate::metrics::parse::parse_timestamp;
use crate::model::{IssueRecord, StatusEvent};

/// Issue payload as returned by `GET /rest/api/3/issue/{key}?expand=changelog`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawIssue {
    pub key: String,
    #[serde(default)]
    pub fields: RawFields,
    #[serde(default)]
    pub changelog: RawChangelog,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<RawUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuetype: Option<RawIssueType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawIssueType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawChangelog {
    #[serde(default)]
    pub histories: Vec<RawHistory>,
}

/// One changelog entry; every item in it shares the entry's timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHistory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default)]
    pub items: Vec<RawItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    pub field: String,
    #[serde(default, rename = "fromString")]
    pub from_name: Option<String>,
    #[serde(default, rename = "toString")]
    pub to_name: Option<String>,
}

impl TryFrom<RawIssue> for IssueRecord {
    type Error = FlowError;

    fn try_from(raw: RawIssue) -> Result<Self> {
        let created = raw
            .fields
            .created
            .as_deref()
            .ok_or_else(|| FlowError::MissingField(format!("{}: fields.created", raw.key)))?;
        let created_at = parse_timestamp(created)?;

        let mut events = Vec::new();
        for (index, history) in raw.changelog.histories.into_iter().enumerate() {
            let created = history.created.as_deref().ok_or_else(|| {
                FlowError::MissingField(format!(
                    "{}: changelog.histories[{index}].created",
                    raw.key
                ))
            })?;
            let timestamp = parse_timestamp(created)?;

            events.extend(history.items.into_iter().map(|item| StatusEvent {
                timestamp,
                field: item.field,
                from_status: item.from_name,
                to_status: item.to_name,
            }));
        }

        Ok(IssueRecord {
            key: raw.key,
            created_at,
            events,
            assignee: raw.fields.assignee.and_then(|user| user.display_name),
            issue_type: raw.fields.issuetype.and_then(|kind| kind.name),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IssueDocument {
    Search { issues: Vec<RawIssue> },
    Many(Vec<RawIssue>),
    Single(Box<RawIssue>),
}

/// Parse a JSON document holding one issue, an array of issues, or a search
/// response with an `issues` array.
pub fn parse_document(raw: &str) -> Result<Vec<RawIssue>> {
    let document: IssueDocument = serde_json::from_str(raw)?;
    Ok(match document {
        IssueDocument::Search { issues } | IssueDocument::Many(issues) => issues,
        IssueDocument::Single(issue) => vec![*issue],
    })
}
