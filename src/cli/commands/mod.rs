//! Command implementations for studylog.
//!
//! This module contains the implementation of all CLI commands. Each
//! command returns the text to print; `serve` prints as it goes and returns
//! nothing.

mod completions;
mod history;
mod serve;

pub use completions::completions;
pub use history::history;
pub use serve::{serve, Notification};

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::cli::args::OutputFormat;
use crate::config::{Config, Paths};
use crate::core::{report_day, Clock};
use crate::error::StudyError;
use crate::features::durations::DurationStore;
use crate::features::reporter::DailySummary;
use crate::features::sessions::{SessionEvent, SessionTracker};
use crate::output::{format_event, format_summary, format_totals};
use crate::presence::Directory;
use crate::storage::Database;

/// Everything a command needs: where the data lives, the loaded settings
/// and how to render results.
#[derive(Debug, Clone)]
pub struct Context {
    /// Data directory.
    pub paths: Paths,
    /// Loaded configuration.
    pub config: Config,
    /// Output format for this run.
    pub format: OutputFormat,
}

impl Context {
    /// Resolve the data directory and load its configuration.
    ///
    /// An explicit `output` wins over `general.default_output`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or the
    /// config file cannot be parsed.
    pub fn load(home: Option<PathBuf>, output: Option<OutputFormat>) -> Result<Self, StudyError> {
        let paths = match home {
            Some(root) => Paths::with_root(root),
            None => Paths::new()?,
        };
        let config = Config::load_from_path(&paths.config_file)?;
        let format = output.unwrap_or(config.general.default_output);

        Ok(Self {
            paths,
            config,
            format,
        })
    }

    /// Open the duration store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_store(&self) -> Result<DurationStore, StudyError> {
        self.paths.ensure_dirs()?;
        let db = Database::open_at(&self.config.database_path(&self.paths))?;
        Ok(DurationStore::with_database(db))
    }

    /// Build a tracker over the store, seeded with the configured roster and
    /// everyone who has recorded time on the report day of `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or queried.
    pub fn tracker(
        &self,
        clock: Arc<dyn Clock>,
        now: DateTime<Utc>,
    ) -> Result<SessionTracker, StudyError> {
        let store = self.open_store()?;
        let mut directory = Directory::with_roster(self.config.roster.iter().cloned());
        for line in store.totals_for_day(report_day(now))? {
            if directory.member(line.member.id).is_none() {
                directory.observe(line.member);
            }
        }
        Ok(SessionTracker::new(store, directory, clock))
    }
}

/// Execute today command
///
/// # Errors
///
/// Returns an error if the store cannot be read or the member is unknown.
pub fn today(ctx: &Context, clock: Arc<dyn Clock>, user: Option<u64>) -> Result<String, StudyError> {
    let now = clock.now();
    let tracker = ctx.tracker(clock, now)?;

    match tracker.show_daily_at(user, now)? {
        SessionEvent::Roster { day, lines } => format_totals(day, &lines, ctx.format),
        event => format_event(&event, ctx.format),
    }
}

/// Execute reset command
///
/// # Errors
///
/// Returns an error if the store cannot be written or the member is unknown.
pub fn reset(ctx: &Context, clock: Arc<dyn Clock>, user_id: u64) -> Result<String, StudyError> {
    let now = clock.now();
    let tracker = ctx.tracker(clock, now)?;
    let event = tracker.reset_at(Some(user_id), now)?;
    format_event(&event, ctx.format)
}

/// Execute summary command
///
/// Renders what the end-of-day report would say right now. Nothing is
/// purged.
///
/// # Errors
///
/// Returns an error if the store cannot be read or the reporter settings
/// are invalid.
pub fn summary(ctx: &Context, clock: Arc<dyn Clock>) -> Result<String, StudyError> {
    let now = clock.now();
    let offset = ctx.config.reporter.offset()?;
    let tracker = ctx.tracker(clock, now)?;

    let lines = match tracker.show_daily_at(None, now)? {
        SessionEvent::Roster { lines, .. } => lines,
        _ => Vec::new(),
    };
    let summary = DailySummary {
        date: now.with_timezone(&offset).date_naive(),
        lines,
    };
    format_summary(&summary, ctx.format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    use crate::core::ManualClock;
    use crate::presence::Member;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    fn create_context(dir: &TempDir) -> Context {
        let config = Config {
            roster: vec![Member::new(1, "Alice"), Member::bot(9, "StudyBot")],
            ..Config::default()
        };
        Context {
            paths: Paths::with_root(dir.path().to_path_buf()),
            config,
            format: OutputFormat::Pretty,
        }
    }

    fn seed(ctx: &Context) {
        let store = ctx.open_store().unwrap();
        store
            .record_interval(&Member::new(2, "Bob"), "A", t0(), t0() + Duration::minutes(30))
            .unwrap();
    }

    #[test]
    fn test_context_load_prefers_flag() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.yaml"),
            "general:\n  default_output: json\n",
        )
        .unwrap();

        let ctx = Context::load(Some(dir.path().to_path_buf()), None).unwrap();
        assert_eq!(ctx.format, OutputFormat::Json);

        let ctx = Context::load(Some(dir.path().to_path_buf()), Some(OutputFormat::Pretty)).unwrap();
        assert_eq!(ctx.format, OutputFormat::Pretty);
    }

    #[test]
    fn test_today_lists_roster_and_stored_members() {
        let dir = TempDir::new().unwrap();
        let ctx = create_context(&dir);
        seed(&ctx);

        let clock = Arc::new(ManualClock::new(t0() + Duration::hours(1)));
        let output = today(&ctx, clock, None).unwrap();

        assert!(output.contains("- Alice : 00:00:00"));
        assert!(output.contains("- Bob : 00:30:00"));
        assert!(!output.contains("StudyBot"));
    }

    #[test]
    fn test_today_single_member() {
        let dir = TempDir::new().unwrap();
        let ctx = create_context(&dir);
        seed(&ctx);

        let clock = Arc::new(ManualClock::new(t0() + Duration::hours(1)));
        assert_eq!(today(&ctx, clock.clone(), Some(2)).unwrap(), "- Bob : 00:30:00");
        assert!(matches!(
            today(&ctx, clock, Some(404)).unwrap_err(),
            StudyError::UnknownTarget(_)
        ));
    }

    #[test]
    fn test_reset_clears_member() {
        let dir = TempDir::new().unwrap();
        let ctx = create_context(&dir);
        seed(&ctx);

        let clock = Arc::new(ManualClock::new(t0() + Duration::hours(1)));
        let output = reset(&ctx, clock, 2).unwrap();
        assert!(output.contains("- Bob : 00:00:00"));

        let day = report_day(t0());
        assert_eq!(ctx.open_store().unwrap().daily_total(2, day).unwrap().seconds, 0);
    }

    #[test]
    fn test_summary_uses_local_date_and_keeps_records() {
        let dir = TempDir::new().unwrap();
        let ctx = create_context(&dir);
        seed(&ctx);

        // 10:00 UTC on the 1st is 19:00 on the 1st in UTC+9.
        let clock = Arc::new(ManualClock::new(t0()));
        let output = summary(&ctx, clock).unwrap();

        assert!(output.contains("[2024.03.01]"));
        assert!(output.contains("- Bob : 00:30:00"));
        assert_eq!(ctx.open_store().unwrap().count().unwrap(), 1);
    }
}
