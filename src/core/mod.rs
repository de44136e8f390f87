//! Core abstractions for studylog.
//!
//! This module provides the clock seam and date/time utilities used across
//! features.

mod clock;
mod datetime;

pub use clock::{Clock, ManualClock, SystemClock};
pub use datetime::{
    elapsed_seconds, format_hms, parse_report_day, parse_time_of_day, report_day,
    reporting_offset,
};
