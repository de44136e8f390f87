//! JSON-lines presence events.
//!
//! `studylog serve` reads one event per line, standing in for a chat
//! platform gateway:
//!
//! ```text
//! {"type":"join","user_id":1,"display_name":"Alice","channel":"Study Room"}
//! {"type":"move","user_id":1,"from":"Study Room","to":"Quiet Room"}
//! {"type":"leave","user_id":1,"display_name":"Alice"}
//! {"type":"message","author_id":2,"text":"!pause <@1>"}
//! ```
//!
//! `at` (RFC 3339) is optional on every event; without it the tracker's
//! clock supplies the time. Blank lines and lines starting with `#` are
//! skipped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::directory::UserId;
use crate::error::StudyError;

/// A presence or chat event delivered by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PresenceEvent {
    /// A member connected to a voice channel from no channel.
    Join {
        user_id: UserId,
        display_name: String,
        channel: String,
        #[serde(default)]
        bot: bool,
        #[serde(default)]
        at: Option<DateTime<Utc>>,
    },
    /// A member disconnected from voice.
    Leave {
        user_id: UserId,
        display_name: String,
        #[serde(default)]
        at: Option<DateTime<Utc>>,
    },
    /// A member switched voice channels without disconnecting.
    Move {
        user_id: UserId,
        from: String,
        to: String,
        #[serde(default)]
        at: Option<DateTime<Utc>>,
    },
    /// A chat message, possibly containing a command.
    Message {
        author_id: UserId,
        text: String,
        #[serde(default)]
        at: Option<DateTime<Utc>>,
    },
}

impl PresenceEvent {
    /// When the event happened, if the line said so.
    #[must_use]
    pub const fn at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Join { at, .. }
            | Self::Leave { at, .. }
            | Self::Move { at, .. }
            | Self::Message { at, .. } => *at,
        }
    }
}

/// Parse one line of the event stream.
///
/// # Errors
///
/// Returns `StudyError::Parse` if the line is not a valid event.
pub fn parse_event_line(line: &str) -> Result<Option<PresenceEvent>, StudyError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| StudyError::Parse(format!("invalid event '{line}': {e}")))
}
