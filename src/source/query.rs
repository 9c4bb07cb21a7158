use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use serde::{Deserialize, Serialize};

use crate::config::StatusRule;
use crate::metrics::derive::completion_instant;
use crate::metrics::model::TimeWindow;
use crate::model::IssueRecord;

/// Issue selection applied before metrics are computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IssueQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
    /// Inclusive bounds on the creation instant.
    #[serde(default)]
    pub created: TimeWindow,
    /// Keep only issues whose first Done transition falls in the last N days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_within_days: Option<i64>,
}

impl IssueQuery {
    pub fn normalize(&mut self) {
        for value in [&mut self.project, &mut self.assignee, &mut self.issue_type] {
            *value = value
                .take()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty());
        }
    }

    pub fn select(
        &self,
        mut issues: Vec<IssueRecord>,
        done: &StatusRule,
        as_of: DateTime<Utc>,
    ) -> Vec<IssueRecord> {
        if let Some(ref project) = self.project {
            issues.retain(|issue| issue.project_key() == project.as_str());
        }

        if let Some(ref assignee) = self.assignee {
            issues.retain(|issue| issue.assignee.as_deref() == Some(assignee.as_str()));
        }

        if let Some(ref issue_type) = self.issue_type {
            issues.retain(|issue| issue.issue_type.as_deref() == Some(issue_type.as_str()));
        }

        if !self.created.is_unbounded() {
            issues.retain(|issue| self.created.contains(&issue.created_at));
        }

        if let Some(days) = self.completed_within_days {
            // A look-back reaching past the calendar range leaves the lower bound open.
            let since = Duration::try_days(days).and_then(|span| as_of.checked_sub_signed(span));
            if since.is_none() {
                debug!(days, "look-back exceeds calendar range; lower bound open");
            }
            issues.retain(|issue| {
                completion_instant(issue, done).is_some_and(|completed_at| {
                    let completed_at = completed_at.with_timezone(&Utc);
                    since.is_none_or(|since| completed_at > since) && completed_at <= as_of
                })
            });
        }

        issues
    }
}
