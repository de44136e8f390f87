//! Known members and where they currently are.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Platform user identifier.
pub type UserId = u64;

/// A member of the study server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Platform user ID.
    pub id: UserId,
    /// Name shown in notifications.
    pub display_name: String,
    /// Automated accounts are left out of roster reports.
    #[serde(default)]
    pub bot: bool,
}

impl Member {
    /// Create a human member.
    #[must_use]
    pub fn new(id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            bot: false,
        }
    }

    /// Create an automated member.
    #[must_use]
    pub fn bot(id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            bot: true,
            ..Self::new(id, display_name)
        }
    }
}

/// Directory of members and their current voice channel.
///
/// Seeded from the configured roster and kept current from presence events.
#[derive(Debug, Default)]
pub struct Directory {
    members: HashMap<UserId, Member>,
    voice: HashMap<UserId, String>,
}

impl Directory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory from a roster.
    #[must_use]
    pub fn with_roster(roster: impl IntoIterator<Item = Member>) -> Self {
        let mut directory = Self::new();
        for member in roster {
            directory.observe(member);
        }
        directory
    }

    /// Record a member, refreshing the display name if it changed.
    ///
    /// A bot flag, once set, is kept: presence events for known bots do not
    /// always carry it.
    pub fn observe(&mut self, member: Member) {
        match self.members.get_mut(&member.id) {
            Some(existing) => {
                existing.display_name = member.display_name;
                existing.bot |= member.bot;
            }
            None => {
                self.members.insert(member.id, member);
            }
        }
    }

    /// Look up a member.
    #[must_use]
    pub fn member(&self, id: UserId) -> Option<&Member> {
        self.members.get(&id)
    }

    /// Mark a member as present in `channel`.
    pub fn connect(&mut self, id: UserId, channel: impl Into<String>) {
        self.voice.insert(id, channel.into());
    }

    /// Mark a member as no longer in any voice channel.
    pub fn disconnect(&mut self, id: UserId) {
        self.voice.remove(&id);
    }

    /// The voice channel a member is in, if any.
    #[must_use]
    pub fn voice_channel(&self, id: UserId) -> Option<&str> {
        self.voice.get(&id).map(String::as_str)
    }

    /// Human members ordered by display name.
    #[must_use]
    pub fn roster(&self) -> Vec<&Member> {
        let mut members: Vec<&Member> = self.members.values().filter(|m| !m.bot).collect();
        members.sort_by(|a, b| {
            a.display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_skips_bots_and_sorts() {
        let directory = Directory::with_roster([
            Member::new(3, "carol"),
            Member::bot(9, "StudyBot"),
            Member::new(1, "Alice"),
            Member::new(2, "Bob"),
        ]);

        let names: Vec<&str> = directory
            .roster()
            .iter()
            .map(|m| m.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["Alice", "Bob", "carol"]);
        assert!(directory.member(9).is_some_and(|m| m.bot));
    }

    #[test]
    fn test_observe_updates_name_and_keeps_bot_flag() {
        let mut directory = Directory::with_roster([Member::bot(9, "StudyBot")]);
        directory.observe(Member::new(9, "Study Bot v2"));

        let member = directory.member(9).unwrap();
        assert_eq!(member.display_name, "Study Bot v2");
        assert!(member.bot);
    }

    #[test]
    fn test_voice_tracking() {
        let mut directory = Directory::new();
        assert!(directory.voice_channel(1).is_none());

        directory.connect(1, "Study Room");
        assert_eq!(directory.voice_channel(1), Some("Study Room"));

        directory.connect(1, "Quiet Room");
        assert_eq!(directory.voice_channel(1), Some("Quiet Room"));

        directory.disconnect(1);
        assert!(directory.voice_channel(1).is_none());
    }
}
