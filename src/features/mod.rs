//! Study tracking features.
//!
//! - `durations`: the persisted interval log and daily totals
//! - `sessions`: the join/leave/pause/resume state machine
//! - `reporter`: the end-of-day summary and reset

pub mod durations;
pub mod reporter;
pub mod sessions;
