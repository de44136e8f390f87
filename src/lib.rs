//! studylog - voice-channel study session tracker
//!
//! This crate follows members through voice-channel presence events,
//! records every stretch of study time in a local SQLite log, answers
//! daily-total queries, and closes each day with a summary and reset.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod features;
pub mod output;
pub mod presence;
pub mod storage;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::StudyError;
pub use features::durations::DurationStore;
pub use features::reporter::DailyReporter;
pub use features::sessions::SessionTracker;
