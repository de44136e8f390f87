//! Interval record storage.
//!
//! Persists closed voice intervals to the local database and answers daily
//! aggregate queries. Daily filtering uses the explicit `start_date` column,
//! the UTC calendar date of the interval start.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Row};

use super::record::{DailyTotal, IntervalRecord, MemberTotal};
use crate::error::StudyError;
use crate::presence::{Member, UserId};
use crate::storage::Database;

/// Storage for interval records.
pub struct DurationStore {
    db: Database,
}

impl DurationStore {
    /// Create storage with an existing database connection.
    pub fn with_database(db: Database) -> Self {
        Self { db }
    }

    /// The underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Append one interval for `member` covering `[start, end)`.
    ///
    /// The stored duration is the whole number of seconds, rounded down.
    pub fn record_interval(
        &self,
        member: &Member,
        channel: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<IntervalRecord, StudyError> {
        let mut record = IntervalRecord::new(member, channel, start, end);
        self.insert(&mut record)?;
        Ok(record)
    }

    /// Insert a new record, filling in its ID.
    fn insert(&self, record: &mut IntervalRecord) -> Result<(), StudyError> {
        let conn = self.db.connection();

        conn.execute(
            r"INSERT INTO voice_logs
              (user_id, username, channel_name, join_time, leave_time, start_date, duration)
              VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                to_i64(record.user_id)?,
                record.display_name,
                record.channel_name,
                record.start_time.to_rfc3339(),
                record.end_time.to_rfc3339(),
                date_key(record.report_day()),
                record.duration_seconds,
            ],
        )
        .map_err(|e| StudyError::Database(format!("Failed to insert interval: {e}")))?;

        record.id = Some(conn.last_insert_rowid());
        Ok(())
    }

    /// Total time for `user_id` on `day`.
    pub fn daily_total(&self, user_id: UserId, day: NaiveDate) -> Result<DailyTotal, StudyError> {
        let conn = self.db.connection();

        let seconds: i64 = conn
            .query_row(
                r"SELECT COALESCE(SUM(duration), 0)
                  FROM voice_logs
                  WHERE user_id = ?1 AND start_date = ?2",
                params![to_i64(user_id)?, date_key(day)],
                |row| row.get(0),
            )
            .map_err(|e| StudyError::Database(format!("Failed to query daily total: {e}")))?;

        Ok(DailyTotal::new(user_id, day, seconds))
    }

    /// Delete every record of `user_id` on `day`. Returns the number removed.
    pub fn reset_daily(&self, user_id: UserId, day: NaiveDate) -> Result<usize, StudyError> {
        let conn = self.db.connection();

        conn.execute(
            "DELETE FROM voice_logs WHERE user_id = ?1 AND start_date = ?2",
            params![to_i64(user_id)?, date_key(day)],
        )
        .map_err(|e| StudyError::Database(format!("Failed to reset daily records: {e}")))
    }

    /// Delete every record of every user. Returns the number removed.
    pub fn purge_all(&self) -> Result<usize, StudyError> {
        let conn = self.db.connection();

        conn.execute("DELETE FROM voice_logs", [])
            .map_err(|e| StudyError::Database(format!("Failed to purge records: {e}")))
    }

    /// List records, newest first, optionally filtered by user and day.
    pub fn records(
        &self,
        user_id: Option<UserId>,
        day: Option<NaiveDate>,
        limit: usize,
    ) -> Result<Vec<IntervalRecord>, StudyError> {
        let conn = self.db.connection();

        let mut stmt = conn
            .prepare(
                r"SELECT id, user_id, username, channel_name, join_time, leave_time, duration
                  FROM voice_logs
                  WHERE (?1 IS NULL OR user_id = ?1)
                    AND (?2 IS NULL OR start_date = ?2)
                  ORDER BY join_time DESC, id DESC
                  LIMIT ?3",
            )
            .map_err(|e| StudyError::Database(format!("Failed to prepare query: {e}")))?;

        let user = user_id.map(to_i64).transpose()?;
        let day = day.map(date_key);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = stmt
            .query_map(params![user, day, limit], |row| row_to_record(row))
            .map_err(|e| StudyError::Database(format!("Failed to query records: {e}")))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|e| StudyError::Database(e.to_string()))?);
        }

        Ok(records)
    }

    /// Per-user totals for everyone with records on `day`.
    ///
    /// The display name is the one on the user's most recent record.
    pub fn totals_for_day(&self, day: NaiveDate) -> Result<Vec<MemberTotal>, StudyError> {
        let conn = self.db.connection();

        let mut stmt = conn
            .prepare(
                r"SELECT user_id,
                         (SELECT v2.username FROM voice_logs v2
                          WHERE v2.user_id = v.user_id AND v2.start_date = v.start_date
                          ORDER BY v2.id DESC LIMIT 1),
                         SUM(duration)
                  FROM voice_logs v
                  WHERE start_date = ?1
                  GROUP BY user_id",
            )
            .map_err(|e| StudyError::Database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map([date_key(day)], |row| {
                let user_id: i64 = row.get(0)?;
                let name: String = row.get(1)?;
                let seconds: i64 = row.get(2)?;
                Ok((user_id, name, seconds))
            })
            .map_err(|e| StudyError::Database(format!("Failed to query totals: {e}")))?;

        let mut totals = Vec::new();
        for row in rows {
            let (user_id, name, seconds) = row.map_err(|e| StudyError::Database(e.to_string()))?;
            let user_id = to_user_id(user_id)?;
            totals.push(MemberTotal {
                member: Member::new(user_id, name),
                total: DailyTotal::new(user_id, day, seconds),
            });
        }

        totals.sort_by(|a, b| {
            a.member
                .display_name
                .to_lowercase()
                .cmp(&b.member.display_name.to_lowercase())
        });
        Ok(totals)
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<i64, StudyError> {
        self.db
            .connection()
            .query_row("SELECT COUNT(*) FROM voice_logs", [], |row| row.get(0))
            .map_err(|e| StudyError::Database(format!("Failed to count records: {e}")))
    }
}

/// Convert a database row to an `IntervalRecord`.
fn row_to_record(row: &Row<'_>) -> Result<IntervalRecord, rusqlite::Error> {
    let id: i64 = row.get(0)?;
    let user_id: i64 = row.get(1)?;
    let display_name: String = row.get(2)?;
    let channel_name: String = row.get(3)?;
    let start_str: String = row.get(4)?;
    let end_str: String = row.get(5)?;
    let duration_seconds: i64 = row.get(6)?;

    Ok(IntervalRecord {
        id: Some(id),
        user_id: u64::try_from(user_id).map_err(|e| conversion_error(1, e))?,
        display_name,
        channel_name,
        start_time: parse_timestamp(&start_str).map_err(|e| conversion_error(4, e))?,
        end_time: parse_timestamp(&end_str).map_err(|e| conversion_error(5, e))?,
        duration_seconds,
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|t| t.with_timezone(&Utc))
}

fn conversion_error(
    column: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
}

fn date_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

fn to_i64(value: UserId) -> Result<i64, StudyError> {
    i64::try_from(value)
        .map_err(|_| StudyError::Database(format!("user id {value} exceeds SQLite INTEGER range")))
}

fn to_user_id(value: i64) -> Result<UserId, StudyError> {
    u64::try_from(value)
        .map_err(|_| StudyError::Database(format!("stored user id {value} is negative")))
}
