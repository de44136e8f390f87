//! Output formatting for studylog.
//!
//! This module renders tracker events, daily summaries and stored records
//! either as chat-style text or as JSON.

mod json;
mod pretty;

use chrono::NaiveDate;

use crate::cli::args::OutputFormat;
use crate::error::StudyError;
use crate::features::durations::{IntervalRecord, MemberTotal};
use crate::features::reporter::DailySummary;
use crate::features::sessions::SessionEvent;

pub use json::*;
pub use pretty::*;

/// Format a session event based on output format
///
/// # Errors
///
/// Returns `StudyError::Json` if JSON serialization fails.
pub fn format_event(event: &SessionEvent, format: OutputFormat) -> Result<String, StudyError> {
    match format {
        OutputFormat::Pretty => Ok(format_event_pretty(event)),
        OutputFormat::Json => format_event_json(event),
    }
}

/// Format a daily summary based on output format
///
/// # Errors
///
/// Returns `StudyError::Json` if JSON serialization fails.
pub fn format_summary(summary: &DailySummary, format: OutputFormat) -> Result<String, StudyError> {
    match format {
        OutputFormat::Pretty => Ok(format_summary_pretty(summary)),
        OutputFormat::Json => format_summary_json(summary),
    }
}

/// Format a rejected command based on output format
///
/// # Errors
///
/// Returns `StudyError::Json` if JSON serialization fails.
pub fn format_rejection(error: &StudyError, format: OutputFormat) -> Result<String, StudyError> {
    match format {
        OutputFormat::Pretty => Ok(format_rejection_pretty(error)),
        OutputFormat::Json => format_rejection_json(error),
    }
}

/// Format stored totals for one day based on output format
///
/// # Errors
///
/// Returns `StudyError::Json` if JSON serialization fails.
pub fn format_totals(
    day: NaiveDate,
    lines: &[MemberTotal],
    format: OutputFormat,
) -> Result<String, StudyError> {
    match format {
        OutputFormat::Pretty => Ok(format_totals_pretty(day, lines)),
        OutputFormat::Json => format_totals_json(day, lines),
    }
}

/// Format interval records based on output format
///
/// # Errors
///
/// Returns `StudyError::Json` if JSON serialization fails.
pub fn format_records(records: &[IntervalRecord], format: OutputFormat) -> Result<String, StudyError> {
    match format {
        OutputFormat::Pretty => Ok(format_records_pretty(records)),
        OutputFormat::Json => format_records_json(records),
    }
}
