//! In-memory session state.
//!
//! Two tables keyed by user:
//! - active sessions: the open interval a member is currently accruing;
//! - paused accumulators: seconds already flushed to the log by pauses in
//!   the current session, waiting to be reported at the final leave.
//!
//! Nothing here touches storage. The tracker decides when a transition is
//! allowed and persists first; this module only applies the result.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::presence::UserId;

/// An open interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSession {
    /// When the interval started.
    pub start_time: DateTime<Utc>,
    /// Voice channel the member is currently in.
    pub channel: String,
}

/// Where a member stands with respect to tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not tracked at all.
    Idle,
    /// Accruing time in an open interval.
    Active,
    /// Paused, with flushed time waiting to be reported.
    Paused,
    /// Resumed after a pause: accruing again, with earlier time accumulated.
    Resumed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Active => write!(f, "Active"),
            Self::Paused => write!(f, "Paused"),
            Self::Resumed => write!(f, "Resumed"),
        }
    }
}

/// The active-session and paused-accumulator tables.
#[derive(Debug, Default)]
pub struct SessionTable {
    active: HashMap<UserId, ActiveSession>,
    paused: HashMap<UserId, i64>,
}

impl SessionTable {
    /// Create empty tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The member's open interval, if any.
    #[must_use]
    pub fn active(&self, user_id: UserId) -> Option<&ActiveSession> {
        self.active.get(&user_id)
    }

    /// Seconds accumulated by pauses in the member's current session.
    #[must_use]
    pub fn paused_seconds(&self, user_id: UserId) -> Option<i64> {
        self.paused.get(&user_id).copied()
    }

    /// Classify a member.
    #[must_use]
    pub fn state(&self, user_id: UserId) -> SessionState {
        match (self.active.contains_key(&user_id), self.paused.contains_key(&user_id)) {
            (false, false) => SessionState::Idle,
            (true, false) => SessionState::Active,
            (false, true) => SessionState::Paused,
            (true, true) => SessionState::Resumed,
        }
    }

    /// Open an interval unless one is already open.
    ///
    /// Returns `false` and leaves the existing interval alone if the member
    /// is already active.
    pub fn start(&mut self, user_id: UserId, channel: &str, now: DateTime<Utc>) -> bool {
        if self.active.contains_key(&user_id) {
            return false;
        }
        self.active.insert(
            user_id,
            ActiveSession {
                start_time: now,
                channel: channel.to_string(),
            },
        );
        true
    }

    /// Close the member's open interval.
    pub fn end(&mut self, user_id: UserId) -> Option<ActiveSession> {
        self.active.remove(&user_id)
    }

    /// Follow a member to another channel. Start time is unchanged.
    ///
    /// Returns `false` if the member has no open interval.
    pub fn set_channel(&mut self, user_id: UserId, channel: &str) -> bool {
        match self.active.get_mut(&user_id) {
            Some(session) => {
                session.channel = channel.to_string();
                true
            }
            None => false,
        }
    }

    /// Add flushed seconds to the member's accumulator, creating it if
    /// needed. Returns the new accumulated value.
    pub fn add_paused(&mut self, user_id: UserId, seconds: i64) -> i64 {
        let accumulated = self.paused.entry(user_id).or_insert(0);
        *accumulated += seconds;
        *accumulated
    }

    /// Remove and return the member's accumulator.
    pub fn take_paused(&mut self, user_id: UserId) -> Option<i64> {
        self.paused.remove(&user_id)
    }

    /// Restart every open interval at `now`. Returns how many were open.
    pub fn restart_all(&mut self, now: DateTime<Utc>) -> usize {
        for session in self.active.values_mut() {
            session.start_time = now;
        }
        self.active.len()
    }

    /// Drop every accumulator. Returns how many there were.
    pub fn clear_paused(&mut self) -> usize {
        let count = self.paused.len();
        self.paused.clear();
        count
    }

    /// Number of open intervals.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of accumulators.
    #[must_use]
    pub fn paused_count(&self) -> usize {
        self.paused.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut table = SessionTable::new();
        assert!(table.start(1, "Study Room", t0()));
        assert!(!table.start(1, "Other Room", t0() + Duration::minutes(5)));

        let session = table.active(1).unwrap();
        assert_eq!(session.start_time, t0());
        assert_eq!(session.channel, "Study Room");
        assert_eq!(table.active_count(), 1);
    }

    #[test]
    fn test_set_channel_keeps_start() {
        let mut table = SessionTable::new();
        table.start(1, "Study Room", t0());

        assert!(table.set_channel(1, "Quiet Room"));
        assert!(!table.set_channel(2, "Quiet Room"));

        let session = table.active(1).unwrap();
        assert_eq!(session.channel, "Quiet Room");
        assert_eq!(session.start_time, t0());
    }

    #[test]
    fn test_paused_accumulates() {
        let mut table = SessionTable::new();
        assert_eq!(table.add_paused(1, 30), 30);
        assert_eq!(table.add_paused(1, 45), 75);
        assert_eq!(table.paused_seconds(1), Some(75));
        assert_eq!(table.take_paused(1), Some(75));
        assert_eq!(table.paused_seconds(1), None);
    }

    #[test]
    fn test_state_classification() {
        let mut table = SessionTable::new();
        assert_eq!(table.state(1), SessionState::Idle);

        table.start(1, "Study Room", t0());
        assert_eq!(table.state(1), SessionState::Active);

        table.end(1);
        table.add_paused(1, 10);
        assert_eq!(table.state(1), SessionState::Paused);

        table.start(1, "Study Room", t0());
        assert_eq!(table.state(1), SessionState::Resumed);
    }

    #[test]
    fn test_restart_all_and_clear_paused() {
        let mut table = SessionTable::new();
        table.start(1, "A", t0());
        table.start(2, "B", t0() + Duration::minutes(10));
        table.add_paused(3, 120);

        let later = t0() + Duration::hours(5);
        assert_eq!(table.restart_all(later), 2);
        assert_eq!(table.active(1).unwrap().start_time, later);
        assert_eq!(table.active(2).unwrap().start_time, later);

        assert_eq!(table.clear_paused(), 1);
        assert_eq!(table.paused_count(), 0);
    }
}
