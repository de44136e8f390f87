//! The end-of-day latch.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ReporterConfig;
use crate::core::report_day;
use crate::error::StudyError;
use crate::features::durations::MemberTotal;
use crate::features::sessions::SessionTracker;

/// The report emitted once per local day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    /// Local calendar date the summary closes.
    pub date: NaiveDate,
    /// One line per roster member.
    pub lines: Vec<MemberTotal>,
}

/// Decides when the day ends and closes it on the tracker.
///
/// Fires at most once per local date: the first check at or past the
/// boundary fires and latches the date; later checks on the same date do
/// nothing. If checks jump across local midnight without ever landing in
/// the boundary window, the skipped date fires on the first check after.
#[derive(Debug, Clone)]
pub struct DailyReporter {
    offset: FixedOffset,
    boundary: NaiveTime,
    last_fired: Option<NaiveDate>,
    last_seen: Option<NaiveDateTime>,
}

impl DailyReporter {
    /// Create a reporter firing at `boundary` local time in `offset`.
    #[must_use]
    pub const fn new(offset: FixedOffset, boundary: NaiveTime) -> Self {
        Self {
            offset,
            boundary,
            last_fired: None,
            last_seen: None,
        }
    }

    /// Create a reporter from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset or boundary is invalid.
    pub fn from_config(config: &ReporterConfig) -> Result<Self, StudyError> {
        Ok(Self::new(config.offset()?, config.boundary_time()?))
    }

    /// The last local date a summary fired for.
    #[must_use]
    pub const fn last_fired(&self) -> Option<NaiveDate> {
        self.last_fired
    }

    fn local(&self, now: DateTime<Utc>) -> NaiveDateTime {
        now.with_timezone(&self.offset).naive_local()
    }

    /// The report day whose records a summary for local `date` covers.
    ///
    /// Taken at the boundary instant of `date`, not at the time the check
    /// runs, so a late catch-up still totals the missed day.
    fn report_day_for(&self, date: NaiveDate, now: DateTime<Utc>) -> NaiveDate {
        self.offset
            .from_local_datetime(&date.and_time(self.boundary))
            .single()
            .map_or_else(|| report_day(now), |at| report_day(at.with_timezone(&Utc)))
    }

    /// The local date that should fire at `local`, if any.
    fn due(&self, local: NaiveDateTime) -> Option<NaiveDate> {
        if let Some(previous) = self.last_seen {
            let missed = previous.date();
            if missed < local.date() && self.last_fired.map_or(true, |d| d < missed) {
                return Some(missed);
            }
        }

        let today = local.date();
        if local.time() >= self.boundary && self.last_fired != Some(today) {
            return Some(today);
        }
        None
    }

    /// Observe `now` and close the day on `tracker` if it is time.
    ///
    /// A failed close leaves the latch open so the next check retries.
    ///
    /// # Errors
    ///
    /// Returns an error if the tracker could not read totals or purge the
    /// log.
    pub fn check(
        &mut self,
        tracker: &SessionTracker,
        now: DateTime<Utc>,
    ) -> Result<Option<DailySummary>, StudyError> {
        let local = self.local(now);

        let Some(date) = self.due(local) else {
            self.last_seen = Some(local);
            return Ok(None);
        };

        let lines = tracker.close_day(self.report_day_for(date, now), now)?;
        self.last_fired = Some(date);
        self.last_seen = Some(local);
        info!(%date, members = lines.len(), "daily summary fired");

        Ok(Some(DailySummary { date, lines }))
    }
}
