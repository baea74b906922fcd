pub mod documents;
pub mod mongo;
pub mod sqlite;

use crate::db::documents::{HistoryDocument, TaskDocument};
use crate::errors::{AppError, AppResult};
use crate::redaction::redact_str;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

pub use mongo::MongoBackend;
pub use sqlite::SqliteBackend;

pub trait DocumentBackend: Send + Sync {
    fn kind(&self) -> &'static str;
    fn ping(&self) -> AppResult<()>;
    fn upsert_task(&self, document: &TaskDocument) -> AppResult<()>;
    fn find_tasks(&self) -> AppResult<Vec<Value>>;
    fn insert_history(&self, document: &HistoryDocument) -> AppResult<()>;
    fn find_history(&self) -> AppResult<Vec<Value>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocator {
    Mongo(String),
    SqliteFile(PathBuf),
    SqliteMemory,
}

impl StoreLocator {
    pub fn parse(uri: &str) -> AppResult<Self> {
        let trimmed = uri.trim();
        if trimmed.is_empty() {
            return Err(AppError::StorageUnavailable(
                "store connection string is empty".to_string(),
            ));
        }
        if trimmed.starts_with("mongodb://") || trimmed.starts_with("mongodb+srv://") {
            return Ok(Self::Mongo(trimmed.to_string()));
        }
        if trimmed == "sqlite::memory:" {
            return Ok(Self::SqliteMemory);
        }
        if let Some(path) = trimmed.strip_prefix("sqlite://") {
            if path.is_empty() {
                return Err(AppError::StorageUnavailable(
                    "sqlite connection string has no path".to_string(),
                ));
            }
            return Ok(Self::SqliteFile(PathBuf::from(path)));
        }
        Err(AppError::StorageUnavailable(format!(
            "unsupported store connection string '{}'",
            redact_str(trimmed)
        )))
    }
}

pub fn connect(uri: &str, database_name: &str) -> AppResult<Arc<dyn DocumentBackend>> {
    let locator = StoreLocator::parse(uri)?;
    tracing::info!(store = %redact_str(uri.trim()), database = database_name, "connecting to document store");

    let backend: Arc<dyn DocumentBackend> = match locator {
        StoreLocator::Mongo(uri) => Arc::new(MongoBackend::connect(&uri, database_name)?),
        StoreLocator::SqliteFile(path) => Arc::new(SqliteBackend::open(&path)?),
        StoreLocator::SqliteMemory => Arc::new(SqliteBackend::open_in_memory()?),
    };

    backend.ping().map_err(|error| match error {
        AppError::StorageUnavailable(message) => AppError::StorageUnavailable(message),
        other => AppError::StorageUnavailable(other.to_string()),
    })?;

    tracing::info!(backend = backend.kind(), "document store reachable");
    Ok(backend)
}
