//! Interval records and daily totals.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{elapsed_seconds, format_hms, report_day};
use crate::presence::{Member, UserId};

/// One closed stretch of voice time.
///
/// Written when a member leaves, is paused, or when an open session is cut
/// at the end of the day. Never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalRecord {
    /// Database ID (None if not persisted)
    pub id: Option<i64>,
    /// Platform user ID
    pub user_id: UserId,
    /// Display name at the time of writing
    pub display_name: String,
    /// Voice channel the interval ended in
    pub channel_name: String,
    /// Start of the interval
    pub start_time: DateTime<Utc>,
    /// End of the interval
    pub end_time: DateTime<Utc>,
    /// Whole seconds between start and end, rounded down
    pub duration_seconds: i64,
}

impl IntervalRecord {
    /// Build an unsaved record for `member` covering `[start, end)`.
    #[must_use]
    pub fn new(
        member: &Member,
        channel_name: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            user_id: member.id,
            display_name: member.display_name.clone(),
            channel_name: channel_name.into(),
            start_time,
            end_time,
            duration_seconds: elapsed_seconds(start_time, end_time),
        }
    }

    /// The report day this record counts towards.
    #[must_use]
    pub fn report_day(&self) -> NaiveDate {
        report_day(self.start_time)
    }
}

/// A member's accumulated time for one report day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotal {
    /// Platform user ID
    pub user_id: UserId,
    /// Report day (UTC calendar date of interval starts)
    pub day: NaiveDate,
    /// Total seconds
    pub seconds: i64,
    /// Total as `HH:MM:SS`
    pub hms: String,
}

impl DailyTotal {
    /// Create a total, deriving the formatted form.
    #[must_use]
    pub fn new(user_id: UserId, day: NaiveDate, seconds: i64) -> Self {
        Self {
            user_id,
            day,
            seconds,
            hms: format_hms(seconds),
        }
    }
}

/// One line of a daily summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberTotal {
    /// Member the total belongs to
    pub member: Member,
    /// Their total for the day
    pub total: DailyTotal,
}
