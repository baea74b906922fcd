//! Wire shapes of the `tasks` and `history` collections.
//!
//! Stored documents carry no enforced schema, so every document read back from a
//! backend is checked against a JSON schema and then decoded into a typed record.

use crate::errors::{AppError, AppResult};
use crate::models::{Goal, GoalCategory, GoalStatus, MetricObservation};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const TASKS_COLLECTION: &str = "tasks";
pub const HISTORY_COLLECTION: &str = "history";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDocument {
    pub goal_name: String,
    pub category: GoalCategory,
    pub progress_value: i64,
    pub status: GoalStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryDocument {
    pub date: DateTime<Utc>,
    pub metric: String,
    pub value: f64,
}

impl From<&Goal> for TaskDocument {
    fn from(goal: &Goal) -> Self {
        Self {
            goal_name: goal.goal_name.clone(),
            category: goal.category,
            progress_value: i64::from(goal.progress_value),
            status: goal.status,
        }
    }
}

impl From<&MetricObservation> for HistoryDocument {
    fn from(observation: &MetricObservation) -> Self {
        Self {
            date: observation.date,
            metric: observation.metric.clone(),
            value: observation.value,
        }
    }
}

static TASK_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::json!({
        "type": "object",
        "properties": {
            "goal_name": { "type": "string", "minLength": 1 },
            "category": { "enum": GoalCategory::ALL.iter().map(|c| c.as_str()).collect::<Vec<_>>() },
            "progress_value": { "type": "integer", "minimum": 0, "maximum": 100 },
            "status": { "enum": GoalStatus::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>() }
        },
        "required": ["goal_name", "category", "progress_value", "status"]
    })
});

static HISTORY_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::json!({
        "type": "object",
        "properties": {
            "date": { "type": "string", "minLength": 1 },
            "metric": { "type": "string", "minLength": 1 },
            "value": { "type": "number" }
        },
        "required": ["date", "metric", "value"]
    })
});

static TASK_VALIDATOR: Lazy<jsonschema::JSONSchema> =
    Lazy::new(|| jsonschema::JSONSchema::compile(&TASK_SCHEMA).expect("valid tasks schema"));

static HISTORY_VALIDATOR: Lazy<jsonschema::JSONSchema> =
    Lazy::new(|| jsonschema::JSONSchema::compile(&HISTORY_SCHEMA).expect("valid history schema"));

pub fn decode_task(raw: Value) -> AppResult<Goal> {
    check_schema(TASKS_COLLECTION, &TASK_VALIDATOR, &raw)?;
    let document: TaskDocument = serde_json::from_value(raw)
        .map_err(|error| AppError::Decode(format!("{}: {}", TASKS_COLLECTION, error)))?;
    let progress_value = u8::try_from(document.progress_value).map_err(|_| {
        AppError::Decode(format!(
            "{}: progress_value {} out of range",
            TASKS_COLLECTION, document.progress_value
        ))
    })?;
    Ok(Goal {
        goal_name: document.goal_name,
        category: document.category,
        progress_value,
        status: document.status,
    })
}

pub fn decode_history(raw: Value) -> AppResult<MetricObservation> {
    check_schema(HISTORY_COLLECTION, &HISTORY_VALIDATOR, &raw)?;
    let document: HistoryDocument = serde_json::from_value(raw)
        .map_err(|error| AppError::Decode(format!("{}: {}", HISTORY_COLLECTION, error)))?;
    Ok(MetricObservation {
        date: document.date,
        metric: document.metric,
        value: document.value,
    })
}

fn check_schema(collection: &str, validator: &jsonschema::JSONSchema, raw: &Value) -> AppResult<()> {
    let errors: Vec<String> = validator
        .validate(raw)
        .err()
        .map(|errors| {
            errors
                .map(|error| {
                    let path = error.instance_path.to_string();
                    if path.is_empty() {
                        error.to_string()
                    } else {
                        format!("{}: {}", path, error)
                    }
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Decode(format!(
            "{} document did not match schema: {}",
            collection,
            errors.join("; ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_history, decode_task, HistoryDocument, HISTORY_VALIDATOR, TASK_VALIDATOR};
    use crate::errors::AppError;
    use crate::models::{GoalCategory, GoalStatus};
    use chrono::{TimeZone, Utc};

    #[test]
    fn decodes_task_with_extra_fields() {
        let goal = decode_task(serde_json::json!({
            "_id": { "$oid": "65a1b2c3d4e5f60718293a4b" },
            "goal_name": "Learn Rust",
            "category": "Tech",
            "progress_value": 45,
            "status": "In-Progress"
        }))
        .expect("decode task");
        assert_eq!(goal.goal_name, "Learn Rust");
        assert_eq!(goal.category, GoalCategory::Tech);
        assert_eq!(goal.progress_value, 45);
        assert_eq!(goal.status, GoalStatus::InProgress);
    }

    #[test]
    fn missing_field_is_a_decode_error() {
        let error = decode_task(serde_json::json!({
            "goal_name": "Run a marathon",
            "category": "Fitness",
            "status": "Halted"
        }))
        .expect_err("missing progress");
        assert!(matches!(error, AppError::Decode(ref message) if message.contains("progress_value")));
    }

    #[test]
    fn out_of_range_progress_is_rejected() {
        let error = decode_task(serde_json::json!({
            "goal_name": "Save",
            "category": "Finance",
            "progress_value": 140,
            "status": "Completed"
        }))
        .expect_err("progress too high");
        assert!(matches!(error, AppError::Decode(_)));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let error = decode_task(serde_json::json!({
            "goal_name": "Read",
            "category": "Personal",
            "progress_value": 3,
            "status": "Someday"
        }))
        .expect_err("unknown status");
        assert!(matches!(error, AppError::Decode(_)));
    }

    #[test]
    fn decodes_history_with_integer_value() {
        let observation = decode_history(serde_json::json!({
            "date": "2026-01-02T00:00:00Z",
            "metric": "Books Read",
            "value": 3
        }))
        .expect("decode history");
        assert_eq!(observation.value, 3.0);
        assert_eq!(observation.date, Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn malformed_date_is_a_decode_error() {
        let error = decode_history(serde_json::json!({
            "date": "yesterday",
            "metric": "Squat",
            "value": 225.0
        }))
        .expect_err("bad date");
        assert!(matches!(error, AppError::Decode(_)));
    }

    #[test]
    fn history_document_serializes_rfc3339_date() {
        let document = HistoryDocument {
            date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            metric: "Bodyweight".to_string(),
            value: 180.5,
        };
        let encoded = serde_json::to_value(&document).expect("encode");
        assert_eq!(encoded["date"], serde_json::json!("2026-01-01T00:00:00Z"));
    }

    #[test]
    fn compiled_validators_are_reused_across_documents() {
        assert!(TASK_VALIDATOR.is_valid(&serde_json::json!({
            "goal_name": "Learn Rust",
            "category": "Tech",
            "progress_value": 0,
            "status": "Not Started"
        })));
        assert!(!HISTORY_VALIDATOR.is_valid(&serde_json::json!({ "metric": "Squat" })));

        for day in 1..=28 {
            let observation = decode_history(serde_json::json!({
                "date": format!("2026-02-{:02}T00:00:00Z", day),
                "metric": "Squat",
                "value": 200 + day
            }))
            .expect("decode history");
            assert_eq!(observation.value, f64::from(200 + day));
        }
        let error = decode_history(serde_json::json!({ "metric": "Squat", "value": null }))
            .expect_err("null value");
        assert!(matches!(error, AppError::Decode(ref message) if message.contains("schema")));
    }
}
