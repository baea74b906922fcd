use crate::db::documents::{decode_history, decode_task, HistoryDocument, TaskDocument};
use crate::db::DocumentBackend;
use crate::errors::{AppError, AppResult};
use crate::models::{Goal, GoalCategory, GoalStatus, MetricObservation};
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct GoalStore {
    backend: Arc<dyn DocumentBackend>,
}

impl GoalStore {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    pub fn upsert_goal(
        &self,
        name: &str,
        category: GoalCategory,
        progress: u8,
        status: GoalStatus,
    ) -> AppResult<Goal> {
        let goal = Goal {
            goal_name: name.to_string(),
            category,
            progress_value: progress,
            status,
        };
        self.backend.upsert_task(&TaskDocument::from(&goal))?;
        tracing::info!(
            goal = %goal.goal_name,
            category = category.as_str(),
            progress = progress,
            status = status.as_str(),
            "goal saved"
        );
        Ok(goal)
    }

    pub fn list_goals(&self) -> AppResult<Vec<Goal>> {
        let documents = self.backend.find_tasks()?;
        let goals = documents.into_iter().map(decode_task).collect::<AppResult<Vec<_>>>()?;
        tracing::debug!(count = goals.len(), "goals loaded");
        Ok(goals)
    }
}

#[derive(Clone)]
pub struct MetricStore {
    backend: Arc<dyn DocumentBackend>,
}

impl MetricStore {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    pub fn append_observation(&self, metric: &str, value: f64, date: DateTime<Utc>) -> AppResult<MetricObservation> {
        // serde_json writes NaN and infinities as null, which no reader can decode.
        if !value.is_finite() {
            return Err(AppError::Validation(format!(
                "Metric value must be a finite number, got {}",
                value
            )));
        }
        let observation = MetricObservation {
            date,
            metric: metric.to_string(),
            value,
        };
        self.backend.insert_history(&HistoryDocument::from(&observation))?;
        tracing::info!(metric = %observation.metric, value = value, date = %date, "observation appended");
        Ok(observation)
    }

    pub fn list_observations(&self) -> AppResult<Vec<MetricObservation>> {
        let documents = self.backend.find_history()?;
        let observations = documents
            .into_iter()
            .map(decode_history)
            .collect::<AppResult<Vec<_>>>()?;
        tracing::debug!(count = observations.len(), "observations loaded");
        Ok(observations)
    }
}
