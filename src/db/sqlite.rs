use crate::db::documents::{HistoryDocument, TaskDocument};
use crate::db::DocumentBackend;
use crate::errors::{AppError, AppResult};
use chrono::Utc;
use rusqlite::{params, Connection};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

const SCHEMA_SQL: &str = include_str!("schema.sql");

#[derive(Debug)]
pub struct SqliteBackend {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl SqliteBackend {
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| {
                    AppError::StorageUnavailable(format!("cannot create {}: {}", parent.display(), err))
                })?;
            }
        }
        let conn = Connection::open(path)
            .map_err(|err| AppError::StorageUnavailable(format!("cannot open {}: {}", path.display(), err)))?;
        Self::from_connection(conn, Some(path.to_path_buf()))
    }

    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory().map_err(|err| AppError::StorageUnavailable(err.to_string()))?;
        Self::from_connection(conn, None)
    }

    fn from_connection(conn: Connection, db_path: Option<PathBuf>) -> AppResult<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))
    }

    fn read_documents(&self, query: &str) -> AppResult<Vec<Value>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(query)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut result = Vec::new();
        for row in rows {
            result.push(serde_json::from_str::<Value>(&row?)?);
        }
        Ok(result)
    }
}

impl DocumentBackend for SqliteBackend {
    fn kind(&self) -> &'static str {
        "sqlite"
    }

    fn ping(&self) -> AppResult<()> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    fn upsert_task(&self, document: &TaskDocument) -> AppResult<()> {
        let body = serde_json::to_string(document)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO tasks (goal_name, document_json, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(goal_name) DO UPDATE SET
               document_json = excluded.document_json,
               updated_at = excluded.updated_at",
            params![document.goal_name, body, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn find_tasks(&self) -> AppResult<Vec<Value>> {
        self.read_documents("SELECT document_json FROM tasks ORDER BY rowid ASC")
    }

    fn insert_history(&self, document: &HistoryDocument) -> AppResult<()> {
        let body = serde_json::to_string(document)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO history (document_json, created_at) VALUES (?1, ?2)",
            params![body, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn find_history(&self) -> AppResult<Vec<Value>> {
        self.read_documents("SELECT document_json FROM history ORDER BY id ASC")
    }
}
