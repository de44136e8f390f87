//! Chat command parsing.
//!
//! Commands are prefixed with `!` and target members by mention:
//!
//! ```text
//! !pause <@123>      !일시정지 <@123>
//! !resume <@123>     !재시작 <@123>
//! !today [<@123>]    !오늘공부시간 [<@123>]
//! !reset <@123>      !초기화 <@123>
//! ```
//!
//! A bare numeric user ID is accepted in place of a mention. Any other text
//! after the command is an unresolved target and gets rejected.

use once_cell::sync::Lazy;
use regex::Regex;

use super::directory::UserId;
use crate::error::StudyError;

static COMMAND_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^!(\S+)(?:\s+(.*))?$").unwrap_or_else(|e| panic!("Invalid command regex: {e}"))
});

static MENTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:<@!?(\d+)>|(\d+))").unwrap_or_else(|e| panic!("Invalid mention regex: {e}"))
});

/// Who a command is aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Nothing followed the command name.
    Missing,
    /// A mention or bare user ID.
    User(UserId),
    /// Text followed the command but named nobody.
    Unresolved(String),
}

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Pause a member's session.
    Pause(Target),
    /// Resume a member's paused session.
    Resume(Target),
    /// Show today's total for one member, or the whole roster.
    Today(Target),
    /// Clear a member's records for today.
    Reset(Target),
}

impl ChatCommand {
    /// Example invocation, used when a required target is missing.
    #[must_use]
    pub const fn usage(&self) -> &'static str {
        match self {
            Self::Pause(_) => "!pause @member",
            Self::Resume(_) => "!resume @member",
            Self::Today(_) => "!today [@member]",
            Self::Reset(_) => "!reset @member",
        }
    }

    const fn raw_target(&self) -> &Target {
        match self {
            Self::Pause(target) | Self::Resume(target) | Self::Today(target) | Self::Reset(target) => {
                target
            }
        }
    }

    /// The user this command targets. `None` only for a bare `!today`.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::UnknownTarget` if the target is required but
    /// missing, or if the text after the command is not a mention.
    pub fn target(&self) -> Result<Option<UserId>, StudyError> {
        match self.raw_target() {
            Target::User(id) => Ok(Some(*id)),
            Target::Missing if matches!(self, Self::Today(_)) => Ok(None),
            Target::Missing => Err(StudyError::UnknownTarget(format!(
                "no member given, try {}",
                self.usage()
            ))),
            Target::Unresolved(text) => Err(StudyError::UnknownTarget(text.clone())),
        }
    }
}

/// Parse a chat message into a command.
///
/// Returns `None` for ordinary chat and unknown commands.
#[must_use]
pub fn parse_command(text: &str) -> Option<ChatCommand> {
    let caps = COMMAND_PATTERN.captures(text.trim())?;
    let name = caps.get(1)?.as_str().to_lowercase();
    let target = match caps.get(2).map(|rest| rest.as_str().trim()) {
        None | Some("") => Target::Missing,
        Some(rest) => parse_mention(rest)
            .map_or_else(|| Target::Unresolved(rest.to_string()), Target::User),
    };

    let command = match name.as_str() {
        "pause" | "일시정지" => ChatCommand::Pause(target),
        "resume" | "재시작" => ChatCommand::Resume(target),
        "today" | "오늘공부시간" => ChatCommand::Today(target),
        "reset" | "초기화" => ChatCommand::Reset(target),
        _ => return None,
    };

    Some(command)
}

fn parse_mention(text: &str) -> Option<UserId> {
    let caps = MENTION_PATTERN.captures(text)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .and_then(|m| m.as_str().parse().ok())
}
