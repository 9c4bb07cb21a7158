use std::path::Path;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tracing::info;

use crate::config::WorkflowConfig;
use crate::error::{FlowError, Result};
use crate::metrics::{
    FilteredRequest, PeriodSelection, TimeWindow, compute_filtered_summary,
    compute_project_summary, compute_ticket_metrics,
};
use crate::output::{self, Format};
use crate::source::{IssueQuery, IssueSource};

/// Which side of a window a date-only bound sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundSide {
    Start,
    End,
}

/// Parse a CLI date bound.
///
/// Accepts RFC 3339 instants as-is. Naive date-times and plain dates are placed in
/// `offset`; a plain date covers the whole day (midnight for a start bound, the
/// last microsecond of the day for an end bound).
pub fn parse_bound(
    value: &str,
    offset: FixedOffset,
    side: BoundSide,
) -> Result<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant);
    }

    let naive = if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        naive
    } else {
        let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| FlowError::InvalidDate(value.to_string()))?;
        let naive = match side {
            BoundSide::Start => date.and_hms_opt(0, 0, 0),
            BoundSide::End => date.and_hms_micro_opt(23, 59, 59, 999_999),
        };
        naive.ok_or_else(|| FlowError::InvalidDate(value.to_string()))?
    };

    offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| FlowError::InvalidDate(value.to_string()))
}

pub fn window_from_args(
    start: Option<&str>,
    end: Option<&str>,
    workflow: &WorkflowConfig,
) -> Result<TimeWindow> {
    let offset = workflow.offset()?;
    Ok(TimeWindow {
        start: start
            .map(|value| parse_bound(value, offset, BoundSide::Start))
            .transpose()?,
        end: end
            .map(|value| parse_bound(value, offset, BoundSide::End))
            .transpose()?,
    })
}

pub fn ticket(
    source_path: &Path,
    key: &str,
    workflow: &WorkflowConfig,
    as_of: DateTime<Utc>,
    format: Format,
) -> Result<()> {
    let source = IssueSource::open(source_path)?;
    let issue = source.read(key.trim())?;

    info!(ticket = %issue.key, events = issue.events.len(), "computing ticket metrics");
    let metrics = compute_ticket_metrics(&issue, workflow, as_of);
    output::print_ticket(&metrics, format)
}

/// Tickets of `project` completed within the last `days` days.
pub fn project(
    source_path: &Path,
    project: &str,
    days: u32,
    workflow: &WorkflowConfig,
    as_of: DateTime<Utc>,
    format: Format,
) -> Result<()> {
    let source = IssueSource::open(source_path)?;

    let mut query = IssueQuery {
        project: Some(project.to_string()),
        completed_within_days: Some(i64::from(days)),
        ..IssueQuery::default()
    };
    query.normalize();

    let issues = query.select(source.list_all()?, &workflow.statuses.done, as_of);
    info!(project, days, issues = issues.len(), "computing project metrics");

    let report = compute_project_summary(&issues, workflow, as_of);
    output::print_project(&report, format)
}

#[derive(Debug, Clone, Default)]
pub struct FilteredArgs {
    pub project: String,
    pub assignee: Option<String>,
    pub issue_type: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub period: PeriodSelection,
}

/// Tickets of a project narrowed by assignee, type and creation window, with an
/// optional breakdown of completions inside the same window.
pub fn filtered(
    source_path: &Path,
    args: FilteredArgs,
    workflow: &WorkflowConfig,
    as_of: DateTime<Utc>,
    format: Format,
) -> Result<()> {
    let window = window_from_args(args.start.as_deref(), args.end.as_deref(), workflow)?;
    let source = IssueSource::open(source_path)?;

    let mut query = IssueQuery {
        project: Some(args.project),
        assignee: args.assignee,
        issue_type: args.issue_type,
        created: window,
        completed_within_days: None,
    };
    query.normalize();

    let issues = query.select(source.list_all()?, &workflow.statuses.done, as_of);
    info!(
        project = query.project.as_deref().unwrap_or("-"),
        period = %args.period,
        issues = issues.len(),
        "computing filtered metrics"
    );

    let request = FilteredRequest {
        assignee: query.assignee.clone(),
        window,
        period: args.period,
    };
    let report = compute_filtered_summary(&issues, workflow, &request, as_of);
    output::print_filtered(&report, format)
}
