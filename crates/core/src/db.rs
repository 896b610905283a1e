// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed integration field storage.
//!
//! [`SqliteFieldStorage`] persists mapping rows as plain string key-value
//! pairs, one row per (reference, system, field).

use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::mapping::FieldStorage;

/// SQL schema for the mapping database.
pub const SCHEMA: &str = r#"
-- One row per remote identifying field of a local entity
CREATE TABLE IF NOT EXISTS integration_fields (
    reference TEXT NOT NULL,     -- local reference (e.g., "PROD-2", "PROD-2-1")
    system TEXT NOT NULL,        -- rally|pivotal_tracker|redmine_issues|jira
    field TEXT NOT NULL,         -- id|key|formatted_id|name|url
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (reference, system, field)
);

CREATE INDEX IF NOT EXISTS idx_fields_system ON integration_fields(system);
"#;

/// Field storage over a SQLite connection.
pub struct SqliteFieldStorage {
    conn: Mutex<Connection>,
}

impl SqliteFieldStorage {
    /// Open a database at the given path, creating the schema if needed.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteFieldStorage {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteFieldStorage {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::CorruptedData("database lock poisoned".into()))
    }

    /// Every reference that has at least one field for the system.
    pub fn references(&self, system: &str) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT reference FROM integration_fields
             WHERE system = ?1 ORDER BY reference",
        )?;
        let rows = stmt
            .query_map([system], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(rows)
    }
}

impl FieldStorage for SqliteFieldStorage {
    fn load_fields(&self, reference: &str, system: &str) -> Result<Vec<(String, String)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT field, value FROM integration_fields
             WHERE reference = ?1 AND system = ?2 ORDER BY field",
        )?;
        let rows = stmt
            .query_map(params![reference, system], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<std::result::Result<Vec<(String, String)>, _>>()?;
        Ok(rows)
    }

    fn store_field(&self, reference: &str, system: &str, field: &str, value: &str) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO integration_fields (reference, system, field, value, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (reference, system, field)
             DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![reference, system, field, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
