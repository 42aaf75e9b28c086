//! SQLite persistence layer for the timer configuration and cycle progress.

use crate::models::{CycleProgress, TimerConfiguration};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_KEY: &str = "timer_config";
const PROGRESS_KEY: &str = "cycle_progress";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to create database directory {0}")]
    DirectoryCreation(PathBuf),
}

/// Durable home of the timer configuration.
pub trait ConfigStore {
    /// Loads the configuration, returning defaults if none was saved.
    fn load_config(&self) -> Result<TimerConfiguration, DatabaseError>;
    fn save_config(&self, config: &TimerConfiguration) -> Result<(), DatabaseError>;
}

/// Durable home of the cycle counters.
pub trait ProgressStore {
    /// Loads the counters, returning zeroes if none were saved.
    fn load_progress(&self) -> Result<CycleProgress, DatabaseError>;
    fn save_progress(&self, progress: &CycleProgress) -> Result<(), DatabaseError>;
}

/// Everything the engine persists.
pub trait Store: ConfigStore + ProgressStore {}

impl<T: ConfigStore + ProgressStore> Store for T {}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens the database at `path`, creating it and its tables if needed.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|_| DatabaseError::DirectoryCreation(parent.to_path_buf()))?;
            }
        }

        let conn = Connection::open(path)?;
        Self::initialize_tables(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing).
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_tables(&conn)?;
        Ok(Self { conn })
    }

    fn initialize_tables(conn: &Connection) -> Result<(), DatabaseError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
        "#,
        )?;
        Ok(())
    }

    /// Default database location in the platform data directory.
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("com", "pomocycle", "Pomocycle")
            .map(|dirs| dirs.data_dir().join("pomocycle.db"))
            .unwrap_or_else(|| PathBuf::from("pomocycle.db"))
    }

    fn read_record<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DatabaseError> {
        let json: Option<String> = self
            .conn
            .query_row("SELECT value FROM records WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;

        match json {
            Some(j) => Ok(Some(serde_json::from_str(&j)?)),
            None => Ok(None),
        }
    }

    fn write_record<T: Serialize>(&self, key: &str, value: &T) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO records (key, value) VALUES (?, ?)",
            params![key, json],
        )?;
        Ok(())
    }
}

impl ConfigStore for Database {
    fn load_config(&self) -> Result<TimerConfiguration, DatabaseError> {
        Ok(self.read_record(CONFIG_KEY)?.unwrap_or_default())
    }

    fn save_config(&self, config: &TimerConfiguration) -> Result<(), DatabaseError> {
        self.write_record(CONFIG_KEY, config)
    }
}

impl ProgressStore for Database {
    fn load_progress(&self) -> Result<CycleProgress, DatabaseError> {
        Ok(self.read_record(PROGRESS_KEY)?.unwrap_or_default())
    }

    fn save_progress(&self, progress: &CycleProgress) -> Result<(), DatabaseError> {
        self.write_record(PROGRESS_KEY, progress)
    }
}
