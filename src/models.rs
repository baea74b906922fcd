use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ─── Goals ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalCategory {
    Tech,
    Fitness,
    Personal,
    Finance,
}

impl GoalCategory {
    pub const ALL: [GoalCategory; 4] = [Self::Tech, Self::Fitness, Self::Personal, Self::Finance];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tech => "Tech",
            Self::Fitness => "Fitness",
            Self::Personal => "Personal",
            Self::Finance => "Finance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In-Progress")]
    InProgress,
    Halted,
    Completed,
}

impl GoalStatus {
    pub const ALL: [GoalStatus; 4] = [Self::NotStarted, Self::InProgress, Self::Halted, Self::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In-Progress",
            Self::Halted => "Halted",
            Self::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub goal_name: String,
    pub category: GoalCategory,
    pub progress_value: u8,
    pub status: GoalStatus,
}

// ─── Metrics ────────────────────────────────────────────────────────────────

pub const DEFAULT_METRIC_TYPES: [&str; 5] = ["Bodyweight", "Bench Press", "Squat", "Savings", "Books Read"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricObservation {
    pub date: DateTime<Utc>,
    pub metric: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    pub count: usize,
    pub first: TrendPoint,
    pub latest: TrendPoint,
    pub change: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendView {
    pub metric: String,
    pub title: String,
    pub points: Vec<TrendPoint>,
    pub summary: Option<TrendSummary>,
}

// ─── Views ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    Dashboard,
    UpdateTasks,
    LogMetrics,
}

impl View {
    pub const ALL: [View; 3] = [Self::Dashboard, Self::UpdateTasks, Self::LogMetrics];

    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard & Trends",
            Self::UpdateTasks => "Update Tasks",
            Self::LogMetrics => "Log Fitness/Finance",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEntry {
    pub view: View,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalCard {
    pub goal_name: String,
    pub category: GoalCategory,
    pub progress_value: u8,
    pub status: GoalStatus,
    pub caption: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalGrid {
    pub columns: Vec<Vec<GoalCard>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub goals: GoalGrid,
    pub goals_notice: Option<String>,
    pub metric_names: Vec<String>,
    pub selected_metric: Option<String>,
    pub trend: Option<TrendView>,
    pub trends_notice: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormOptions {
    pub categories: Vec<GoalCategory>,
    pub statuses: Vec<GoalStatus>,
    pub metric_types: Vec<String>,
}

// ─── Form payloads ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveGoalPayload {
    pub goal_name: String,
    pub category: GoalCategory,
    pub progress: i64,
    pub status: GoalStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMetricPayload {
    pub metric_type: String,
    pub value: f64,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanResponse {
    pub success: bool,
}
