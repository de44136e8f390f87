//! End-of-day summary and reset.
//!
//! [`DailyReporter`] holds the fire-once-per-date latch; [`run`] drives it
//! from a cancellable tokio interval.

pub mod daily;
pub mod runner;

pub use daily::{DailyReporter, DailySummary};
pub use runner::run;
