//! The boundary with the chat platform.
//!
//! Provides:
//! - The member directory (who exists, who is in voice)
//! - JSON-lines presence events consumed by `studylog serve`
//! - Chat command parsing

mod command;
mod directory;
mod event;

pub use command::{parse_command, ChatCommand, Target};
pub use directory::{Directory, Member, UserId};
pub use event::{parse_event_line, PresenceEvent};
