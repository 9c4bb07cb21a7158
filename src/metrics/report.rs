use chrono::{DateTime, Utc};

use crate::config::WorkflowConfig;
use crate::metrics::aggregate::{aggregate, aggregate_by_period};
use crate::metrics::derive::compute_ticket_metrics;
use crate::metrics::model::{
    DataQuality, FilteredReport, FilteredRequest, FilteredSummary, IssueMetrics, PeriodBreakdown,
    ProjectReport,
};
use crate::model::IssueRecord;

fn ticket_metrics(
    issues: &[IssueRecord],
    workflow: &WorkflowConfig,
    as_of: DateTime<Utc>,
) -> Vec<IssueMetrics> {
    issues
        .iter()
        .map(|issue| compute_ticket_metrics(issue, workflow, as_of))
        .collect()
}

/// Per-ticket metrics plus a whole-population summary.
pub fn compute_project_summary(
    issues: &[IssueRecord],
    workflow: &WorkflowConfig,
    as_of: DateTime<Utc>,
) -> ProjectReport {
    let tickets = ticket_metrics(issues, workflow, as_of);
    let summary = aggregate(&tickets);
    ProjectReport { tickets, summary }
}

/// Project summary that echoes the request filters and, unless the selection is
/// `all`, carries the ordered breakdown for the requested granularity.
pub fn compute_filtered_summary(
    issues: &[IssueRecord],
    workflow: &WorkflowConfig,
    request: &FilteredRequest,
    as_of: DateTime<Utc>,
) -> FilteredReport {
    let tickets = ticket_metrics(issues, workflow, as_of);
    let summary = FilteredSummary {
        assignee_name: request.assignee.clone(),
        start_date: request.window.start,
        end_date: request.window.end,
        stats: aggregate(&tickets),
    };

    let mut data_quality = DataQuality::default();
    let period_breakdown = request.period.granularity().map(|granularity| {
        let report = aggregate_by_period(issues, workflow, &request.window, as_of);
        data_quality = report.data_quality.clone();
        PeriodBreakdown {
            granularity,
            periods: report.into_periods(granularity),
        }
    });

    FilteredReport {
        tickets,
        summary,
        period_breakdown,
        data_quality,
    }
}
