// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed record store.
//!
//! [`SqliteStore`] keeps one row per appointment keyed by `id`, with columns
//! mirroring the wire record. Rows come back sorted by `date` ascending.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;

use crate::error::{Error, Result};
use crate::record::Record;
use crate::store::{RecordStore, StoreChange};

/// SQL schema for the appointment store.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS appointments (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    practitioner_id TEXT NOT NULL,
    service TEXT NOT NULL,
    date TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'Booked'
);

CREATE INDEX IF NOT EXISTS idx_appointments_date ON appointments(date);
"#;

/// Capacity of the change feed before slow subscribers start lagging.
const CHANGE_FEED_CAPACITY: usize = 256;

const SELECT_COLUMNS: &str = "SELECT id, user_id, practitioner_id, service, date, status
     FROM appointments";

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid value '{value}' in column '{column}'"
            ))),
        )
    })
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::CorruptedData(format!(
                    "invalid timestamp '{value}' in column '{column}'"
                ))),
            )
        })
}

/// Format a timestamp so that text order matches time order.
fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn row_to_record(row: &Row<'_>) -> std::result::Result<Record, rusqlite::Error> {
    let date_str: String = row.get(4)?;
    let status_str: String = row.get(5)?;
    Ok(Record {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        subject_id: row.get(2)?,
        label: row.get(3)?,
        occurs_at: parse_timestamp(&date_str, "date")?,
        state: parse_db(&status_str, "status")?,
    })
}

/// Run schema creation on a database connection.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

fn write_row(conn: &Connection, sql: &str, record: &Record) -> Result<usize> {
    Ok(conn.execute(
        sql,
        params![
            record.id,
            record.owner_id,
            record.subject_id,
            record.label,
            format_timestamp(&record.occurs_at),
            record.state.as_str(),
        ],
    )?)
}

const INSERT_SQL: &str = "INSERT INTO appointments (id, user_id, practitioner_id, service, date, status)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

const UPDATE_SQL: &str = "UPDATE appointments
     SET user_id = ?2, practitioner_id = ?3, service = ?4, date = ?5, status = ?6
     WHERE id = ?1";

const UPSERT_SQL: &str = "INSERT INTO appointments (id, user_id, practitioner_id, service, date, status)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
     ON CONFLICT(id) DO UPDATE SET
         user_id = excluded.user_id,
         practitioner_id = excluded.practitioner_id,
         service = excluded.service,
         date = excluded.date,
         status = excluded.status";

/// SQLite store with a change-notification feed.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    changes: broadcast::Sender<StoreChange>,
}

impl SqliteStore {
    /// Open a store at the given path, creating and migrating if needed.
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
        Self::from_connection(conn)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        run_migrations(&conn)?;
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Ok(SqliteStore {
            conn: Mutex::new(conn),
            changes,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Store("connection lock poisoned".to_string()))
    }

    fn notify(&self, change: StoreChange) {
        // No subscribers is fine
        let _ = self.changes.send(change);
    }

    fn exists(conn: &Connection, id: &str) -> Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM appointments WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

impl RecordStore for SqliteStore {
    fn all(&self) -> Result<Vec<Record>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY date ASC, rowid ASC"))?;
        let records = stmt
            .query_map([], row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn get(&self, id: &str) -> Result<Record> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                row_to_record,
            )
            .optional()?;
        record.ok_or_else(|| Error::NotFound(id.to_string()))
    }

    fn contains(&self, id: &str) -> Result<bool> {
        let conn = self.lock()?;
        Self::exists(&conn, id)
    }

    fn insert(&self, record: &Record) -> Result<()> {
        {
            let conn = self.lock()?;
            if Self::exists(&conn, &record.id)? {
                return Err(Error::Duplicate(record.id.clone()));
            }
            write_row(&conn, INSERT_SQL, record)?;
        }
        self.notify(StoreChange::Upserted(record.id.clone()));
        Ok(())
    }

    fn update(&self, record: &Record) -> Result<()> {
        let affected = {
            let conn = self.lock()?;
            write_row(&conn, UPDATE_SQL, record)?
        };
        if affected == 0 {
            return Err(Error::NotFound(record.id.clone()));
        }
        self.notify(StoreChange::Upserted(record.id.clone()));
        Ok(())
    }

    fn upsert(&self, record: &Record) -> Result<()> {
        {
            let conn = self.lock()?;
            write_row(&conn, UPSERT_SQL, record)?;
        }
        self.notify(StoreChange::Upserted(record.id.clone()));
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let affected = {
            let conn = self.lock()?;
            conn.execute("DELETE FROM appointments WHERE id = ?1", params![id])?
        };
        if affected == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        self.notify(StoreChange::Deleted(id.to_string()));
        Ok(())
    }

    fn replace_all(&self, records: &[Record]) -> Result<()> {
        {
            let mut conn = self.lock()?;
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM appointments", [])?;
            for record in records {
                write_row(&tx, UPSERT_SQL, record)?;
            }
            tx.commit()?;
        }
        self.notify(StoreChange::Replaced);
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM appointments", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
