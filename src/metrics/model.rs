use chrono::{DateTime, FixedOffset};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

fn is_zero(value: &usize) -> bool {
    *value == 0
}

/// Bucket width for period breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[clap(rename_all = "snake_case")]
pub enum Granularity {
    Yearly,
    Monthly,
    Weekly,
    Daily,
}

impl Granularity {
    pub const ALL: [Granularity; 4] = [Self::Yearly, Self::Monthly, Self::Weekly, Self::Daily];
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yearly => write!(f, "yearly"),
            Self::Monthly => write!(f, "monthly"),
            Self::Weekly => write!(f, "weekly"),
            Self::Daily => write!(f, "daily"),
        }
    }
}

/// Which breakdown a filtered summary should carry; `All` means none.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[clap(rename_all = "snake_case")]
pub enum PeriodSelection {
    Yearly,
    Monthly,
    Weekly,
    Daily,
    #[default]
    All,
}

impl PeriodSelection {
    pub fn granularity(self) -> Option<Granularity> {
        match self {
            Self::Yearly => Some(Granularity::Yearly),
            Self::Monthly => Some(Granularity::Monthly),
            Self::Weekly => Some(Granularity::Weekly),
            Self::Daily => Some(Granularity::Daily),
            Self::All => None,
        }
    }
}

impl std::fmt::Display for PeriodSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.granularity() {
            Some(granularity) => granularity.fmt(f),
            None => write!(f, "all"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Hours,
    Minutes,
}

/// Time in review, expressed in hours once it reaches an hour and in minutes below that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewTime {
    pub amount: f64,
    pub unit: TimeUnit,
}

impl ReviewTime {
    pub fn from_seconds(seconds: f64) -> Self {
        if seconds >= 3600.0 {
            Self {
                amount: seconds / 3600.0,
                unit: TimeUnit::Hours,
            }
        } else {
            Self {
                amount: seconds / 60.0,
                unit: TimeUnit::Minutes,
            }
        }
    }

    pub fn as_hours(&self) -> f64 {
        match self.unit {
            TimeUnit::Hours => self.amount,
            TimeUnit::Minutes => self.amount / 60.0,
        }
    }
}

/// Per-issue timing metrics. Review time is normalized to hours here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueMetrics {
    pub ticket_key: String,
    pub time_in_progress_hours: Option<f64>,
    pub time_in_review_hours: Option<f64>,
    pub lead_time_hours: Option<f64>,
}

/// Arithmetic-mean rollup over a group of issues.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    pub ticket_count: usize,
    pub avg_time_in_progress_hours: f64,
    pub avg_time_in_review_hours: f64,
    pub avg_lead_time_hours: f64,
    pub avg_time_in_progress_days: f64,
    pub avg_time_in_review_days: f64,
    pub avg_lead_time_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub period: String,
    #[serde(flatten)]
    pub stats: PeriodStats,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQuality {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub incomplete_issues: usize,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub outside_window: usize,
}

impl DataQuality {
    pub fn is_empty(&self) -> bool {
        self.incomplete_issues == 0 && self.outside_window == 0
    }
}

/// Period breakdown across all four granularities, each ordered by key.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodReport {
    #[serde(default)]
    pub yearly: Vec<PeriodSummary>,
    #[serde(default)]
    pub monthly: Vec<PeriodSummary>,
    #[serde(default)]
    pub weekly: Vec<PeriodSummary>,
    #[serde(default)]
    pub daily: Vec<PeriodSummary>,
    #[serde(default, skip_serializing_if = "DataQuality::is_empty")]
    pub data_quality: DataQuality,
}

impl PeriodReport {
    pub fn into_periods(self, granularity: Granularity) -> Vec<PeriodSummary> {
        match granularity {
            Granularity::Yearly => self.yearly,
            Granularity::Monthly => self.monthly,
            Granularity::Weekly => self.weekly,
            Granularity::Daily => self.daily,
        }
    }
}

/// Inclusive completion window; open on either side when a bound is absent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<FixedOffset>>,
}

impl TimeWindow {
    pub fn contains(&self, instant: &DateTime<FixedOffset>) -> bool {
        self.start.is_none_or(|start| *instant >= start)
            && self.end.is_none_or(|end| *instant <= end)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default)]
    pub window: TimeWindow,
    #[serde(default)]
    pub period: PeriodSelection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectReport {
    pub tickets: Vec<IssueMetrics>,
    pub summary: PeriodStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredSummary {
    pub assignee_name: Option<String>,
    pub start_date: Option<DateTime<FixedOffset>>,
    pub end_date: Option<DateTime<FixedOffset>>,
    #[serde(flatten)]
    pub stats: PeriodStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodBreakdown {
    pub granularity: Granularity,
    pub periods: Vec<PeriodSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredReport {
    pub tickets: Vec<IssueMetrics>,
    pub summary: FilteredSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_breakdown: Option<PeriodBreakdown>,
    #[serde(default, skip_serializing_if = "DataQuality::is_empty")]
    pub data_quality: DataQuality,
}
