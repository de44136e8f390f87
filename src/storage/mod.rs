//! Storage layer for studylog.
//!
//! This module provides SQLite-based persistence for the interval log.

mod database;
mod migrations;

pub use database::Database;
