use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, FixedOffset, Utc};

use crate::config::WorkflowConfig;
use crate::metrics::derive::{completion_instant, compute_ticket_metrics};
use crate::metrics::model::{
    DataQuality, Granularity, IssueMetrics, PeriodReport, PeriodStats, PeriodSummary, TimeWindow,
};
use crate::model::IssueRecord;

const HOURS_PER_DAY: f64 = 24.0;

/// Bucket key for `instant`, using the wall clock of its recorded offset.
///
/// Weekly keys follow ISO 8601 week numbering, so the first days of January can
/// land in the previous ISO year (`2023-01-01` is `2022-W52`).
pub fn bucket_key(instant: &DateTime<FixedOffset>, granularity: Granularity) -> String {
    match granularity {
        Granularity::Yearly => instant.format("%Y").to_string(),
        Granularity::Monthly => instant.format("%Y-%m").to_string(),
        Granularity::Weekly => {
            let iso = instant.iso_week();
            format!("{:04}-W{:02}", iso.year(), iso.week())
        }
        Granularity::Daily => instant.format("%Y-%m-%d").to_string(),
    }
}

/// Mean of each duration metric over the issues that report a non-zero value.
///
/// `ticket_count` counts every issue, including those missing some metrics.
pub fn aggregate<'a>(metrics: impl IntoIterator<Item = &'a IssueMetrics>) -> PeriodStats {
    let mut ticket_count = 0;
    let mut progress = Vec::new();
    let mut review = Vec::new();
    let mut lead = Vec::new();

    for entry in metrics {
        ticket_count += 1;
        push_present(&mut progress, entry.time_in_progress_hours);
        push_present(&mut review, entry.time_in_review_hours);
        push_present(&mut lead, entry.lead_time_hours);
    }

    if ticket_count == 0 {
        return PeriodStats::default();
    }

    let avg_progress = mean(&progress);
    let avg_review = mean(&review);
    let avg_lead = mean(&lead);

    PeriodStats {
        ticket_count,
        avg_time_in_progress_hours: round2(avg_progress),
        avg_time_in_review_hours: round2(avg_review),
        avg_lead_time_hours: round2(avg_lead),
        avg_time_in_progress_days: round2(avg_progress / HOURS_PER_DAY),
        avg_time_in_review_days: round2(avg_review / HOURS_PER_DAY),
        avg_lead_time_days: round2(avg_lead / HOURS_PER_DAY),
    }
}

/// Aggregate completed issues into yearly, monthly, weekly and daily buckets.
///
/// Each issue lands in exactly one bucket per granularity, keyed by its
/// completion instant. Unfinished issues and completions outside `window` are
/// skipped and tallied in the report's data quality.
pub fn aggregate_by_period(
    issues: &[IssueRecord],
    workflow: &WorkflowConfig,
    window: &TimeWindow,
    as_of: DateTime<Utc>,
) -> PeriodReport {
    let mut data_quality = DataQuality::default();
    let mut buckets = PeriodBuckets::default();

    for issue in issues {
        let metrics = compute_ticket_metrics(issue, workflow, as_of);
        let completed_at = completion_instant(issue, &workflow.statuses.done);

        let Some(completed_at) = completed_at.filter(|_| metrics.lead_time_hours.is_some())
        else {
            data_quality.incomplete_issues += 1;
            continue;
        };

        if !window.contains(&completed_at) {
            data_quality.outside_window += 1;
            continue;
        }

        buckets.insert(&completed_at, metrics);
    }

    tracing::debug!(
        incomplete = data_quality.incomplete_issues,
        outside_window = data_quality.outside_window,
        "bucketed completed issues"
    );

    PeriodReport {
        yearly: buckets.summarize(Granularity::Yearly),
        monthly: buckets.summarize(Granularity::Monthly),
        weekly: buckets.summarize(Granularity::Weekly),
        daily: buckets.summarize(Granularity::Daily),
        data_quality,
    }
}

#[derive(Debug, Default)]
struct PeriodBuckets {
    yearly: BTreeMap<String, Vec<IssueMetrics>>,
    monthly: BTreeMap<String, Vec<IssueMetrics>>,
    weekly: BTreeMap<String, Vec<IssueMetrics>>,
    daily: BTreeMap<String, Vec<IssueMetrics>>,
}

impl PeriodBuckets {
    fn by_granularity(&self, granularity: Granularity) -> &BTreeMap<String, Vec<IssueMetrics>> {
        match granularity {
            Granularity::Yearly => &self.yearly,
            Granularity::Monthly => &self.monthly,
            Granularity::Weekly => &self.weekly,
            Granularity::Daily => &self.daily,
        }
    }

    fn by_granularity_mut(
        &mut self,
        granularity: Granularity,
    ) -> &mut BTreeMap<String, Vec<IssueMetrics>> {
        match granularity {
            Granularity::Yearly => &mut self.yearly,
            Granularity::Monthly => &mut self.monthly,
            Granularity::Weekly => &mut self.weekly,
            Granularity::Daily => &mut self.daily,
        }
    }

    fn insert(&mut self, completed_at: &DateTime<FixedOffset>, metrics: IssueMetrics) {
        for granularity in Granularity::ALL {
            self.by_granularity_mut(granularity)
                .entry(bucket_key(completed_at, granularity))
                .or_default()
                .push(metrics.clone());
        }
    }

    // BTreeMap iteration is key-ordered, which is chronological for every key format.
    fn summarize(&self, granularity: Granularity) -> Vec<PeriodSummary> {
        self.by_granularity(granularity)
            .iter()
            .map(|(period, members)| PeriodSummary {
                period: period.clone(),
                stats: aggregate(members),
            })
            .collect()
    }
}

fn push_present(values: &mut Vec<f64>, value: Option<f64>) {
    if let Some(value) = value.filter(|value| *value != 0.0) {
        values.push(value);
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
