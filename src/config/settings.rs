//! Configuration settings for studylog.
//!
//! Settings are loaded from `~/.studylog/config.yaml`. Every section is
//! optional; missing fields fall back to their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{FixedOffset, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::cli::args::OutputFormat;
use crate::config::Paths;
use crate::core::{parse_time_of_day, reporting_offset};
use crate::error::StudyError;
use crate::presence::Member;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Storage settings.
    pub storage: StorageConfig,
    /// End-of-day reporter settings.
    pub reporter: ReporterConfig,
    /// Members known before any presence event arrives.
    pub roster: Vec<Member>,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format.
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    /// Color output setting.
    #[serde(default = "default_color")]
    pub color: ColorSetting,
}

/// Color output setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorSetting {
    /// Auto-detect based on terminal.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

/// Storage settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file; defaults to `studylog.db` in the data directory.
    pub database: Option<PathBuf>,
}

/// End-of-day reporter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Run the reporter while serving.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between boundary checks.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Fixed reporting timezone, in whole hours east of UTC.
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,
    /// Local time of day at which the summary fires, `HH:MM:SS`.
    #[serde(default = "default_boundary")]
    pub boundary: String,
}

// Default value functions for serde
const fn default_output_format() -> OutputFormat {
    OutputFormat::Pretty
}

const fn default_color() -> ColorSetting {
    ColorSetting::Auto
}

const fn default_true() -> bool {
    true
}

const fn default_poll_interval() -> u64 {
    1
}

const fn default_utc_offset() -> i32 {
    9
}

fn default_boundary() -> String {
    "23:59:59".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            color: default_color(),
        }
    }
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            poll_interval_secs: default_poll_interval(),
            utc_offset_hours: default_utc_offset(),
            boundary: default_boundary(),
        }
    }
}

impl ReporterConfig {
    /// The reporting timezone.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset is outside ±23 hours.
    pub fn offset(&self) -> Result<FixedOffset, StudyError> {
        reporting_offset(self.utc_offset_hours).ok_or_else(|| {
            StudyError::Config(format!(
                "reporter.utc_offset_hours must be within -23..=23, got {}",
                self.utc_offset_hours
            ))
        })
    }

    /// The local time of day that triggers the summary.
    ///
    /// # Errors
    ///
    /// Returns an error if `boundary` is not a valid `HH:MM:SS` time.
    pub fn boundary_time(&self) -> Result<NaiveTime, StudyError> {
        parse_time_of_day(&self.boundary).ok_or_else(|| {
            StudyError::Config(format!(
                "reporter.boundary must be HH:MM:SS, got '{}'",
                self.boundary
            ))
        })
    }

    /// Interval between boundary checks, at least one second.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

impl Config {
    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load_from_path(path: &Path) -> Result<Self, StudyError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            StudyError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            StudyError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Database file to open, honoring `storage.database`.
    #[must_use]
    pub fn database_path(&self, paths: &Paths) -> PathBuf {
        self.storage
            .database
            .clone()
            .unwrap_or_else(|| paths.database.clone())
    }
}
