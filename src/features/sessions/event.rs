//! What the tracker reports after each transition.
//!
//! Events carry values only (names, seconds, totals). Turning them into
//! chat messages is the output layer's job.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::features::durations::{DailyTotal, MemberTotal};
use crate::presence::Member;

/// Outcome of a tracker transition or query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A member joined voice and is being tracked.
    Started {
        member: Member,
        channel: String,
        today: DailyTotal,
    },
    /// A member left voice and their session closed.
    Ended {
        member: Member,
        /// Session time, including any time accumulated before pauses.
        session_seconds: i64,
        /// Time since the last resume, when the session had been paused.
        resumed_seconds: Option<i64>,
        today: DailyTotal,
    },
    /// A tracked member switched channels.
    Moved {
        member: Member,
        from: String,
        to: String,
    },
    /// A member's session was paused.
    Paused {
        member: Member,
        /// Accumulated session time after this pause.
        session_seconds: i64,
        /// Time added by this pause.
        delta_seconds: i64,
        /// Whether an earlier pause in the same session contributed.
        continued: bool,
    },
    /// A paused member is being tracked again.
    Resumed {
        member: Member,
        channel: String,
        /// Session time accumulated so far.
        session_seconds: i64,
    },
    /// One member's total for today.
    Total { line: MemberTotal },
    /// Every roster member's total for today.
    Roster { day: NaiveDate, lines: Vec<MemberTotal> },
    /// A member's records for today were cleared.
    Reset { member: Member, today: DailyTotal },
}

impl SessionEvent {
    /// Short name for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::Ended { .. } => "ended",
            Self::Moved { .. } => "moved",
            Self::Paused { .. } => "paused",
            Self::Resumed { .. } => "resumed",
            Self::Total { .. } => "total",
            Self::Roster { .. } => "roster",
            Self::Reset { .. } => "reset",
        }
    }
}
