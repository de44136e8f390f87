//! Command-line interface for studylog.

pub mod args;
pub mod commands;
