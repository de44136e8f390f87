//! Error types for studylog.

use thiserror::Error;

/// Errors produced by the session tracker, the duration store and the CLI.
///
/// The first group are command rejections: they are reported back to whoever
/// issued the command and leave all tracking state untouched.
#[derive(Debug, Error)]
pub enum StudyError {
    /// Pause requested for a user with no open session.
    #[error("{0} is not studying right now")]
    NotActive(String),

    /// Resume requested for a user with no paused session.
    #[error("{0} is not paused")]
    NotPaused(String),

    /// Resume requested while the user is not in any voice channel.
    #[error("{0} is not connected to a voice channel; join one and resume again")]
    NotConnected(String),

    /// Resume requested while the user already has an open session.
    #[error("{0} is already studying")]
    AlreadyActive(String),

    /// A command did not name a member the directory knows about.
    #[error("unknown target: {0}")]
    UnknownTarget(String),

    /// Storage failure.
    #[error("database error: {0}")]
    Database(String),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Input that could not be understood (event lines, dates, command text).
    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl StudyError {
    /// Whether this error is a command rejection rather than a failure.
    ///
    /// Rejections go back to the command issuer as a normal response.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::NotActive(_)
                | Self::NotPaused(_)
                | Self::NotConnected(_)
                | Self::AlreadyActive(_)
                | Self::UnknownTarget(_)
        )
    }
}

impl From<rusqlite::Error> for StudyError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.to_string())
    }
}
