//! Date and time helpers shared by the store, the tracker and the reporter.
//!
//! Two notions of "day" exist side by side:
//! - the *report day* used for daily totals is the UTC calendar date of an
//!   interval's start time;
//! - the *reporting boundary* that triggers the end-of-day summary is local
//!   time at a fixed UTC offset.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};

/// Seconds in an hour.
const HOUR: i64 = 3600;

/// Format a number of seconds as `HH:MM:SS`.
///
/// Hours are not wrapped at 24, so a 30 hour total prints as `30:00:00`.
/// Negative inputs are treated as zero.
#[must_use]
pub fn format_hms(total_seconds: i64) -> String {
    let total_seconds = total_seconds.max(0);
    let hours = total_seconds / HOUR;
    let minutes = (total_seconds % HOUR) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Whole seconds between `start` and `end`, rounded down and never negative.
#[must_use]
pub fn elapsed_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    end.signed_duration_since(start).num_seconds().max(0)
}

/// The report day an instant belongs to (its UTC calendar date).
#[must_use]
pub fn report_day(at: DateTime<Utc>) -> NaiveDate {
    at.date_naive()
}

/// Build the fixed reporting offset from whole hours east of UTC.
///
/// Returns `None` outside the range chrono accepts (±23 hours).
#[must_use]
pub fn reporting_offset(hours: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(hours.checked_mul(3600)?)
}

/// Parse a `HH:MM:SS` time of day.
#[must_use]
pub fn parse_time_of_day(input: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M:%S").ok()
}

/// Parse a report day given on the command line.
///
/// Accepts `today`, `yesterday` (relative to `now` in UTC) and ISO dates
/// like `2024-12-15`.
#[must_use]
pub fn parse_report_day(input: &str, now: DateTime<Utc>) -> Option<NaiveDate> {
    let today = report_day(now);
    match input.trim().to_lowercase().as_str() {
        "today" | "t" => Some(today),
        "yesterday" | "y" => Some(today - Duration::days(1)),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d").ok(),
    }
}
