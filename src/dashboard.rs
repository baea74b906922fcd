use crate::config::{DashboardConfig, DashboardSettings};
use crate::db::{self, DocumentBackend};
use crate::errors::{AppError, AppResult};
use crate::models::{
    DashboardView, FormOptions, GoalCard, GoalCategory, GoalGrid, GoalStatus, LogMetricPayload, NavigationEntry,
    SaveGoalPayload, SubmissionReceipt, View,
};
use crate::redaction::redact_str;
use crate::stores::{GoalStore, MetricStore};
use crate::trends;
use chrono::{NaiveDate, NaiveTime, Utc};
use std::sync::Arc;

const NO_GOALS_NOTICE: &str = "No tasks in database. Go to 'Update Tasks' to add your goals.";
const NO_HISTORY_NOTICE: &str = "No history data yet. Log your first metric in the sidebar.";

pub struct DashboardController {
    goals: GoalStore,
    metrics: MetricStore,
    settings: DashboardSettings,
}

impl DashboardController {
    pub fn new(backend: Arc<dyn DocumentBackend>, settings: DashboardSettings) -> Self {
        Self {
            goals: GoalStore::new(backend.clone()),
            metrics: MetricStore::new(backend),
            settings,
        }
    }

    pub fn with_backend(backend: Arc<dyn DocumentBackend>, settings: DashboardSettings) -> AppResult<Self> {
        backend.ping()?;
        Ok(Self::new(backend, settings))
    }

    pub fn bootstrap(config: &DashboardConfig) -> AppResult<Self> {
        let backend = db::connect(&config.store_uri, &config.settings.database_name)?;
        Ok(Self::new(backend, config.settings.clone()))
    }

    pub fn navigation() -> Vec<NavigationEntry> {
        View::ALL
            .iter()
            .map(|view| NavigationEntry {
                view: *view,
                label: view.label().to_string(),
            })
            .collect()
    }

    pub fn render_dashboard(&self, selected_metric: Option<&str>) -> AppResult<DashboardView> {
        let goals = self.goals.list_goals()?;
        let observations = self.metrics.list_observations()?;

        let column_count = self.settings.grid_columns.max(1);
        let mut columns: Vec<Vec<GoalCard>> = vec![Vec::new(); column_count];
        for (index, goal) in goals.iter().enumerate() {
            columns[index % column_count].push(GoalCard {
                goal_name: goal.goal_name.clone(),
                category: goal.category,
                progress_value: goal.progress_value,
                status: goal.status,
                caption: format!("Status: {} | {}%", goal.status.as_str(), goal.progress_value),
            });
        }

        let metric_names = trends::distinct_metric_names(&observations);
        let selected = selected_metric
            .and_then(|requested| metric_names.iter().find(|name| name.as_str() == requested))
            .or_else(|| metric_names.first())
            .cloned();
        let trend = selected
            .as_deref()
            .map(|metric| trends::build_trend(&observations, metric));

        tracing::debug!(
            goals = goals.len(),
            observations = observations.len(),
            selected_metric = selected.as_deref().unwrap_or(""),
            "dashboard rendered"
        );

        Ok(DashboardView {
            goals_notice: goals.is_empty().then(|| NO_GOALS_NOTICE.to_string()),
            goals: GoalGrid { columns },
            trends_notice: observations.is_empty().then(|| NO_HISTORY_NOTICE.to_string()),
            metric_names,
            selected_metric: selected,
            trend,
        })
    }

    pub fn save_goal(&self, payload: SaveGoalPayload) -> AppResult<SubmissionReceipt> {
        let name = payload.goal_name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Goal name cannot be empty".to_string()));
        }
        // The form sends a 0-100 slider value.
        let progress = payload.progress.clamp(0, 100) as u8;

        let goal = self
            .goals
            .upsert_goal(name, payload.category, progress, payload.status)?;
        Ok(SubmissionReceipt {
            message: format!("Updated {}!", goal.goal_name),
        })
    }

    pub fn log_metric(&self, payload: LogMetricPayload) -> AppResult<SubmissionReceipt> {
        self.log_metric_on(payload, Utc::now().date_naive())
    }

    fn log_metric_on(&self, payload: LogMetricPayload, today: NaiveDate) -> AppResult<SubmissionReceipt> {
        let metric = payload.metric_type.trim();
        if metric.is_empty() {
            return Err(AppError::Validation("Metric type cannot be empty".to_string()));
        }
        if !payload.value.is_finite() {
            return Err(AppError::Validation(format!(
                "Metric value must be a finite number, got {}",
                payload.value
            )));
        }

        let date = payload.date.unwrap_or(today).and_time(NaiveTime::MIN).and_utc();
        let observation = self.metrics.append_observation(metric, payload.value, date)?;
        Ok(SubmissionReceipt {
            message: format!("Logged {} for {}!", observation.value, observation.metric),
        })
    }

    pub fn form_options(&self) -> AppResult<FormOptions> {
        let mut metric_types = self.settings.metric_types.clone();
        for name in trends::distinct_metric_names(&self.metrics.list_observations()?) {
            if !metric_types.contains(&name) {
                metric_types.push(name);
            }
        }
        Ok(FormOptions {
            categories: GoalCategory::ALL.to_vec(),
            statuses: GoalStatus::ALL.to_vec(),
            metric_types,
        })
    }
}

pub enum DashboardState {
    Ready(DashboardController),
    Halted { message: String },
}

impl DashboardState {
    pub fn from_bootstrap(result: AppResult<DashboardController>) -> Self {
        match result {
            Ok(controller) => Self::Ready(controller),
            Err(error) => {
                let message = format!(
                    "Store connection failed. Check your secrets! ({})",
                    redact_str(&error.to_string())
                );
                tracing::error!(error = %message, "dashboard halted at startup");
                Self::Halted { message }
            }
        }
    }

    pub fn start(config: AppResult<DashboardConfig>) -> Self {
        Self::from_bootstrap(config.and_then(|config| DashboardController::bootstrap(&config)))
    }

    pub fn controller(&self) -> AppResult<&DashboardController> {
        match self {
            Self::Ready(controller) => Ok(controller),
            Self::Halted { message } => Err(AppError::StorageUnavailable(message.clone())),
        }
    }

    pub fn halted_message(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Halted { message } => Some(message),
        }
    }
}
