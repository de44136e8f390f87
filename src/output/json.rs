//! JSON output formatting for studylog.
//!
//! Live notifications are one compact object per line; one-shot command
//! output is pretty-printed.

use chrono::NaiveDate;
use serde_json::json;

use crate::error::StudyError;
use crate::features::durations::{IntervalRecord, MemberTotal};
use crate::features::reporter::DailySummary;
use crate::features::sessions::SessionEvent;

/// Format a session event as a single JSON line
///
/// # Errors
///
/// Returns `StudyError::Json` if serialization fails.
pub fn format_event_json(event: &SessionEvent) -> Result<String, StudyError> {
    Ok(serde_json::to_string(event)?)
}

/// Format the end-of-day summary as a single JSON line
///
/// # Errors
///
/// Returns `StudyError::Json` if serialization fails.
pub fn format_summary_json(summary: &DailySummary) -> Result<String, StudyError> {
    let output = json!({
        "event": "daily_summary",
        "date": summary.date,
        "lines": summary.lines,
    });
    Ok(serde_json::to_string(&output)?)
}

/// Format a rejected command as a single JSON line
///
/// # Errors
///
/// Returns `StudyError::Json` if serialization fails.
pub fn format_rejection_json(error: &StudyError) -> Result<String, StudyError> {
    let output = json!({
        "event": "rejected",
        "message": error.to_string(),
    });
    Ok(serde_json::to_string(&output)?)
}

/// Format stored totals for one day
///
/// # Errors
///
/// Returns `StudyError::Json` if serialization fails.
pub fn format_totals_json(day: NaiveDate, lines: &[MemberTotal]) -> Result<String, StudyError> {
    let output = json!({
        "day": day,
        "count": lines.len(),
        "totals": lines,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format interval records
///
/// # Errors
///
/// Returns `StudyError::Json` if serialization fails.
pub fn format_records_json(records: &[IntervalRecord]) -> Result<String, StudyError> {
    let output = json!({
        "count": records.len(),
        "records": records,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::durations::DailyTotal;
    use crate::presence::Member;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_event_is_tagged() {
        let event = SessionEvent::Paused {
            member: Member::new(1, "Alice"),
            session_seconds: 30,
            delta_seconds: 30,
            continued: false,
        };
        let output = format_event_json(&event).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert!(!output.contains('\n'));
        assert_eq!(parsed["event"], "paused");
        assert_eq!(parsed["session_seconds"], 30);
        assert_eq!(parsed["member"]["display_name"], "Alice");
    }

    #[test]
    fn test_summary_json() {
        let summary = DailySummary {
            date: day(),
            lines: vec![MemberTotal {
                member: Member::new(1, "Alice"),
                total: DailyTotal::new(1, day(), 90),
            }],
        };
        let parsed: serde_json::Value =
            serde_json::from_str(&format_summary_json(&summary).unwrap()).unwrap();

        assert_eq!(parsed["event"], "daily_summary");
        assert_eq!(parsed["date"], "2024-03-01");
        assert_eq!(parsed["lines"][0]["total"]["hms"], "00:01:30");
    }

    #[test]
    fn test_rejection_json() {
        let output = format_rejection_json(&StudyError::NotActive("Bob".to_string())).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["event"], "rejected");
        assert_eq!(parsed["message"], "Bob is not studying right now");
    }

    #[test]
    fn test_empty_records() {
        let parsed: serde_json::Value =
            serde_json::from_str(&format_records_json(&[]).unwrap()).unwrap();
        assert_eq!(parsed["count"], 0);
    }
}
