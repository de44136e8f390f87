//! Database migrations for studylog.
//!
//! Each migration is a function that upgrades the schema by one version.
//! Migrations are run automatically when the database is opened.

use rusqlite::Connection;

use crate::error::StudyError;

/// Current schema version.
const CURRENT_VERSION: i32 = 1;

/// Get the current schema version from the database.
///
/// Returns 0 if no version has been set (new database).
pub fn get_version(conn: &Connection) -> Result<i32, StudyError> {
    let version: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| StudyError::Database(format!("Failed to get schema version: {e}")))?;

    Ok(version)
}

/// Set the schema version in the database.
fn set_version(conn: &Connection, version: i32) -> Result<(), StudyError> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .map_err(|e| StudyError::Database(format!("Failed to set schema version: {e}")))
}

/// Run all pending migrations.
pub fn run(conn: &Connection) -> Result<(), StudyError> {
    let current = get_version(conn)?;

    if current >= CURRENT_VERSION {
        return Ok(());
    }

    for version in (current + 1)..=CURRENT_VERSION {
        run_migration(conn, version)?;
        set_version(conn, version)?;
    }

    Ok(())
}

/// Run a specific migration.
fn run_migration(conn: &Connection, version: i32) -> Result<(), StudyError> {
    match version {
        1 => migrate_v1(conn),
        _ => Err(StudyError::Database(format!(
            "Unknown migration version: {version}"
        ))),
    }
}

/// Migration v1: Initial schema.
///
/// `voice_logs` is append-only: one row per closed voice interval. Rows are
/// only ever removed by the per-user daily reset or the end-of-day purge.
fn migrate_v1(conn: &Connection) -> Result<(), StudyError> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS voice_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            username TEXT NOT NULL,
            channel_name TEXT NOT NULL,
            join_time TEXT NOT NULL,
            leave_time TEXT NOT NULL,
            start_date TEXT NOT NULL,
            duration INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_voice_logs_user_date
        ON voice_logs(user_id, start_date);
        ",
    )
    .map_err(|e| StudyError::Database(format!("Migration v1 failed: {e}")))
}
