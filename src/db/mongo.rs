//! MongoDB document store, reached through the driver's blocking API.

use crate::db::documents::{HistoryDocument, TaskDocument, HISTORY_COLLECTION, TASKS_COLLECTION};
use crate::db::DocumentBackend;
use crate::errors::{AppError, AppResult};
use crate::redaction::redact_str;
use bson::{doc, Bson, Document};
use chrono::SecondsFormat;
use mongodb::sync::{Client, Collection, Database};
use serde_json::Value;

pub struct MongoBackend {
    database: Database,
}

impl MongoBackend {
    pub fn connect(uri: &str, db_name: &str) -> AppResult<Self> {
        let client = Client::with_uri_str(with_selection_timeout(uri)).map_err(|error| {
            AppError::StorageUnavailable(format!(
                "Failed to connect to MongoDB: {}",
                redact_str(&error.to_string())
            ))
        })?;

        Ok(Self {
            database: client.database(db_name),
        })
    }

    fn tasks(&self) -> Collection<Document> {
        self.database.collection::<Document>(TASKS_COLLECTION)
    }

    fn history(&self) -> Collection<Document> {
        self.database.collection::<Document>(HISTORY_COLLECTION)
    }

    fn read_all(collection: Collection<Document>) -> AppResult<Vec<Value>> {
        let cursor = collection.find(doc! {}).run()?;
        let mut result = Vec::new();
        for document in cursor {
            result.push(document_to_json(document?));
        }
        Ok(result)
    }
}

impl DocumentBackend for MongoBackend {
    fn kind(&self) -> &'static str {
        "mongodb"
    }

    fn ping(&self) -> AppResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .run()
            .map_err(|error| {
                AppError::StorageUnavailable(format!("MongoDB ping failed: {}", redact_str(&error.to_string())))
            })?;
        Ok(())
    }

    fn upsert_task(&self, document: &TaskDocument) -> AppResult<()> {
        self.tasks()
            .update_one(
                doc! { "goal_name": document.goal_name.as_str() },
                doc! {
                    "$set": {
                        "category": document.category.as_str(),
                        "progress_value": document.progress_value,
                        "status": document.status.as_str(),
                    }
                },
            )
            .upsert(true)
            .run()?;
        Ok(())
    }

    fn find_tasks(&self) -> AppResult<Vec<Value>> {
        Self::read_all(self.tasks())
    }

    fn insert_history(&self, document: &HistoryDocument) -> AppResult<()> {
        self.history()
            .insert_one(doc! {
                "date": bson::DateTime::from_chrono(document.date),
                "metric": document.metric.as_str(),
                "value": document.value,
            })
            .run()?;
        Ok(())
    }

    fn find_history(&self) -> AppResult<Vec<Value>> {
        Self::read_all(self.history())
    }
}

// An unreachable server must not hang startup.
fn with_selection_timeout(uri: &str) -> String {
    if uri.contains("serverSelectionTimeoutMS") {
        return uri.to_string();
    }
    let separator = if uri.contains('?') {
        "&"
    } else if uri.trim_start_matches("mongodb+srv://").trim_start_matches("mongodb://").contains('/') {
        "?"
    } else {
        "/?"
    };
    format!("{}{}serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri, separator)
}

fn document_to_json(document: Document) -> Value {
    let mut map = serde_json::Map::new();
    for (key, value) in document {
        if key == "_id" {
            continue;
        }
        map.insert(key, bson_to_json(value));
    }
    Value::Object(map)
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::DateTime(date) => Value::String(date.to_chrono().to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        other => other.into_relaxed_extjson(),
    }
}

#[cfg(test)]
mod tests {
    use super::{document_to_json, with_selection_timeout};
    use crate::db::documents::{decode_history, decode_task};
    use bson::{doc, oid::ObjectId};
    use chrono::{TimeZone, Utc};

    #[test]
    fn appends_timeouts_to_bare_host() {
        assert_eq!(
            with_selection_timeout("mongodb://localhost:27017"),
            "mongodb://localhost:27017/?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000"
        );
    }

    #[test]
    fn appends_timeouts_to_existing_query() {
        assert_eq!(
            with_selection_timeout("mongodb+srv://cluster0.example.net/?retryWrites=true"),
            "mongodb+srv://cluster0.example.net/?retryWrites=true&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000"
        );
    }

    #[test]
    fn respects_explicit_timeout() {
        let uri = "mongodb://db/?serverSelectionTimeoutMS=100";
        assert_eq!(with_selection_timeout(uri), uri);
    }

    #[test]
    fn bson_history_document_decodes() {
        let date = Utc.with_ymd_and_hms(2026, 1, 3, 0, 0, 0).unwrap();
        let raw = document_to_json(doc! {
            "_id": ObjectId::new(),
            "date": bson::DateTime::from_chrono(date),
            "metric": "Bodyweight",
            "value": 179.0,
        });
        assert!(raw.get("_id").is_none());

        let observation = decode_history(raw).expect("decode");
        assert_eq!(observation.date, date);
        assert_eq!(observation.metric, "Bodyweight");
        assert_eq!(observation.value, 179.0);
    }

    #[test]
    fn bson_task_with_int32_progress_decodes() {
        let raw = document_to_json(doc! {
            "_id": ObjectId::new(),
            "goal_name": "Learn Rust",
            "category": "Tech",
            "progress_value": 45_i32,
            "status": "In-Progress",
        });
        let goal = decode_task(raw).expect("decode");
        assert_eq!(goal.progress_value, 45);
    }
}
