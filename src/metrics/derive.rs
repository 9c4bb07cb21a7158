use chrono::{DateTime, Duration, FixedOffset, Utc};
use tracing::debug;

use crate::config::{StatusRule, WorkflowConfig};
use crate::metrics::model::{IssueMetrics, ReviewTime};
use crate::model::{IssueRecord, StatusEvent};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Total time spent in the status described by `rule`.
///
/// Rules:
/// - Events are stable-sorted by timestamp; same-instant items keep source order.
/// - Entering the status opens an interval unless one is already open.
/// - Leaving the status closes the open interval and adds its length.
/// - An interval still open after the last event runs until `as_of`.
pub fn time_in_status(
    events: &[StatusEvent],
    rule: &StatusRule,
    as_of: DateTime<Utc>,
) -> Duration {
    let mut ordered: Vec<&StatusEvent> = events.iter().collect();
    ordered.sort_by_key(|event| event.timestamp);

    let mut total = Duration::zero();
    let mut interval_start: Option<DateTime<FixedOffset>> = None;

    for event in ordered.into_iter().filter(|event| event.is_status_change()) {
        if rule.matches(event.to_status.as_deref()) {
            if interval_start.is_none() {
                debug!(status = %rule.name, at = %event.timestamp, "entered status");
                interval_start = Some(event.timestamp);
            }
        } else if rule.matches(event.from_status.as_deref()) {
            if let Some(start) = interval_start.take() {
                let elapsed = event.timestamp.signed_duration_since(start);
                debug!(
                    status = %rule.name,
                    to = event.to_status.as_deref().unwrap_or("-"),
                    hours = elapsed_hours(elapsed),
                    "left status"
                );
                total += elapsed;
            }
        }
    }

    if let Some(start) = interval_start {
        let elapsed = as_of.signed_duration_since(start.with_timezone(&Utc));
        debug!(
            status = %rule.name,
            since = %start,
            hours = elapsed_hours(elapsed),
            "still in status"
        );
        total += elapsed;
    }

    total
}

/// Fractional seconds at microsecond precision.
///
/// Spans too long for a microsecond count fall back to milliseconds.
pub fn elapsed_seconds(duration: Duration) -> f64 {
    match duration.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0,
        None => duration.num_milliseconds() as f64 / 1000.0,
    }
}

pub fn elapsed_hours(duration: Duration) -> f64 {
    elapsed_seconds(duration) / SECONDS_PER_HOUR
}

/// Hours spent in progress, counting an open visit up to `as_of`.
pub fn compute_time_in_progress(
    issue: &IssueRecord,
    rule: &StatusRule,
    as_of: DateTime<Utc>,
) -> f64 {
    elapsed_hours(time_in_status(&issue.events, rule, as_of))
}

/// Time spent in review, in hours from one hour up and in minutes below that.
pub fn compute_time_in_review(
    issue: &IssueRecord,
    rule: &StatusRule,
    as_of: DateTime<Utc>,
) -> ReviewTime {
    ReviewTime::from_seconds(elapsed_seconds(time_in_status(&issue.events, rule, as_of)))
}

/// Timestamp of the first transition into the terminal status, in source order.
pub fn completion_instant(
    issue: &IssueRecord,
    done: &StatusRule,
) -> Option<DateTime<FixedOffset>> {
    issue
        .events
        .iter()
        .find(|event| event.is_status_change() && done.matches(event.to_status.as_deref()))
        .map(|event| event.timestamp)
}

/// Hours from creation to completion; `None` while the issue is unfinished.
pub fn compute_lead_time(issue: &IssueRecord, done: &StatusRule) -> Option<f64> {
    completion_instant(issue, done)
        .map(|finished_at| elapsed_hours(finished_at.signed_duration_since(issue.created_at)))
}

pub fn compute_ticket_metrics(
    issue: &IssueRecord,
    workflow: &WorkflowConfig,
    as_of: DateTime<Utc>,
) -> IssueMetrics {
    let statuses = &workflow.statuses;
    IssueMetrics {
        ticket_key: issue.key.clone(),
        time_in_progress_hours: Some(compute_time_in_progress(
            issue,
            &statuses.in_progress,
            as_of,
        )),
        time_in_review_hours: Some(
            compute_time_in_review(issue, &statuses.in_review, as_of).as_hours(),
        ),
        lead_time_hours: compute_lead_time(issue, &statuses.done),
    }
}
