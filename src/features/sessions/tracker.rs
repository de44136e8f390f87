//! The session tracker.
//!
//! Applies presence signals and targeted commands to the session tables,
//! persisting every closed interval through the duration store. All
//! mutation happens under one lock, and each transition reads the clock
//! once.
//!
//! A transition that writes a record does so before touching memory, so a
//! failed write leaves the tables exactly as they were.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use super::event::SessionEvent;
use super::state::{ActiveSession, SessionState, SessionTable};
use crate::core::{report_day, Clock};
use crate::error::StudyError;
use crate::features::durations::{DailyTotal, DurationStore, MemberTotal};
use crate::presence::{Directory, Member, UserId};

struct TrackerState {
    sessions: SessionTable,
    store: DurationStore,
    directory: Directory,
}

impl TrackerState {
    fn lookup(&self, user_id: Option<UserId>) -> Result<Member, StudyError> {
        let id = user_id.ok_or_else(|| StudyError::UnknownTarget("no member given".to_string()))?;
        self.directory
            .member(id)
            .cloned()
            .ok_or_else(|| StudyError::UnknownTarget(id.to_string()))
    }

    fn today(&self, user_id: UserId, day: NaiveDate) -> Result<DailyTotal, StudyError> {
        self.store.daily_total(user_id, day)
    }

    /// Totals for every human roster member, plus anyone with records today
    /// the directory has not seen since startup.
    fn roster_totals(&self, day: NaiveDate) -> Result<Vec<MemberTotal>, StudyError> {
        let mut lines = Vec::new();
        for member in self.directory.roster() {
            lines.push(MemberTotal {
                member: member.clone(),
                total: self.store.daily_total(member.id, day)?,
            });
        }

        for stored in self.store.totals_for_day(day)? {
            let known = self.directory.member(stored.member.id);
            if known.is_none() {
                lines.push(stored);
            }
        }

        lines.sort_by(|a, b| {
            a.member
                .display_name
                .to_lowercase()
                .cmp(&b.member.display_name.to_lowercase())
                .then(a.member.id.cmp(&b.member.id))
        });
        Ok(lines)
    }
}

/// Tracks study sessions for every member.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct SessionTracker {
    inner: Arc<Mutex<TrackerState>>,
    clock: Arc<dyn Clock>,
}

impl SessionTracker {
    /// Create a tracker over `store` with the members in `directory`.
    pub fn new(store: DurationStore, directory: Directory, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TrackerState {
                sessions: SessionTable::new(),
                store,
                directory,
            })),
            clock,
        }
    }

    /// Current time from the tracker's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// A member entered voice from no channel.
    ///
    /// Starts a session unless one is already open, and always reports the
    /// member's total for today. A join while a session is open changes
    /// nothing; presence stays with the open session's channel.
    pub fn join(
        &self,
        member: Member,
        channel: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionEvent, StudyError> {
        let mut state = self.lock();
        let today = state.today(member.id, report_day(now))?;

        state.directory.observe(member.clone());
        let channel = match state.sessions.active(member.id) {
            Some(open) => {
                debug!(user = member.id, ignored = channel, "join while already active");
                open.channel.clone()
            }
            None => {
                state.sessions.start(member.id, channel, now);
                state.directory.connect(member.id, channel);
                debug!(user = member.id, channel, "session started");
                channel.to_string()
            }
        };

        Ok(SessionEvent::Started {
            member,
            channel,
            today,
        })
    }

    /// A member left voice entirely.
    ///
    /// Returns `None` when the member was not being tracked. The member is
    /// marked disconnected even if closing the session fails.
    pub fn leave(
        &self,
        member: Member,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionEvent>, StudyError> {
        let mut state = self.lock();
        state.directory.observe(member.clone());
        state.directory.disconnect(member.id);

        let active = state.sessions.active(member.id).cloned();
        if active.is_none() && state.sessions.paused_seconds(member.id).is_none() {
            debug!(user = member.id, "leave for untracked member");
            return Ok(None);
        }

        let day = report_day(now);
        let before = state.today(member.id, day)?;

        let Some(session) = active else {
            let accumulated = state.sessions.take_paused(member.id).unwrap_or_default();
            debug!(user = member.id, accumulated, "paused session ended");
            return Ok(Some(SessionEvent::Ended {
                member,
                session_seconds: accumulated,
                resumed_seconds: None,
                today: before,
            }));
        };

        let record =
            state
                .store
                .record_interval(&member, &session.channel, session.start_time, now)?;
        state.sessions.end(member.id);
        let elapsed = record.duration_seconds;

        let (session_seconds, resumed_seconds) = match state.sessions.take_paused(member.id) {
            Some(accumulated) => (accumulated + elapsed, Some(elapsed)),
            None => (elapsed, None),
        };
        let today = if record.report_day() == day {
            DailyTotal::new(member.id, day, before.seconds + elapsed)
        } else {
            before
        };
        debug!(user = member.id, session_seconds, "session ended");

        Ok(Some(SessionEvent::Ended {
            member,
            session_seconds,
            resumed_seconds,
            today,
        }))
    }

    /// A member switched voice channels.
    ///
    /// Only the channel changes; elapsed time keeps accruing. Returns `None`
    /// when the member has no open session.
    pub fn move_channel(
        &self,
        user_id: UserId,
        from: &str,
        to: &str,
        now: DateTime<Utc>,
    ) -> Option<SessionEvent> {
        let mut state = self.lock();
        state.directory.connect(user_id, to);

        if !state.sessions.set_channel(user_id, to) {
            return None;
        }
        debug!(user = user_id, from, to, at = %now, "session moved");

        let member = state
            .directory
            .member(user_id)
            .cloned()
            .unwrap_or_else(|| Member::new(user_id, user_id.to_string()));
        Some(SessionEvent::Moved {
            member,
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    /// Pause a member's open session, flushing it to the log.
    pub fn pause(&self, target: Option<UserId>) -> Result<SessionEvent, StudyError> {
        self.pause_at(target, self.clock.now())
    }

    /// [`pause`](Self::pause) at an explicit instant.
    pub fn pause_at(
        &self,
        target: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<SessionEvent, StudyError> {
        let mut state = self.lock();
        let member = state.lookup(target)?;

        let session = state
            .sessions
            .active(member.id)
            .cloned()
            .ok_or_else(|| StudyError::NotActive(member.display_name.clone()))?;

        let record =
            state
                .store
                .record_interval(&member, &session.channel, session.start_time, now)?;
        state.sessions.end(member.id);

        let continued = state.sessions.paused_seconds(member.id).is_some();
        let delta_seconds = record.duration_seconds;
        let session_seconds = state.sessions.add_paused(member.id, delta_seconds);
        debug!(user = member.id, delta_seconds, session_seconds, "session paused");

        Ok(SessionEvent::Paused {
            member,
            session_seconds,
            delta_seconds,
            continued,
        })
    }

    /// Resume a paused member in the channel they are currently in.
    ///
    /// The accumulator stays in place until the member finally leaves.
    pub fn resume(&self, target: Option<UserId>) -> Result<SessionEvent, StudyError> {
        self.resume_at(target, self.clock.now())
    }

    /// [`resume`](Self::resume) at an explicit instant.
    pub fn resume_at(
        &self,
        target: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<SessionEvent, StudyError> {
        let mut state = self.lock();
        let member = state.lookup(target)?;

        let accumulated = state
            .sessions
            .paused_seconds(member.id)
            .ok_or_else(|| StudyError::NotPaused(member.display_name.clone()))?;
        if state.sessions.active(member.id).is_some() {
            return Err(StudyError::AlreadyActive(member.display_name));
        }
        let channel = state
            .directory
            .voice_channel(member.id)
            .map(str::to_string)
            .ok_or_else(|| StudyError::NotConnected(member.display_name.clone()))?;

        state.sessions.start(member.id, &channel, now);
        debug!(user = member.id, channel = %channel, accumulated, "session resumed");

        Ok(SessionEvent::Resumed {
            member,
            channel,
            session_seconds: accumulated,
        })
    }

    /// Today's total for one member, or for the whole roster.
    pub fn show_daily(&self, target: Option<UserId>) -> Result<SessionEvent, StudyError> {
        self.show_daily_at(target, self.clock.now())
    }

    /// [`show_daily`](Self::show_daily) at an explicit instant.
    pub fn show_daily_at(
        &self,
        target: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<SessionEvent, StudyError> {
        let state = self.lock();
        let day = report_day(now);

        match target {
            Some(id) => {
                let member = state.lookup(Some(id))?;
                let total = state.today(member.id, day)?;
                Ok(SessionEvent::Total {
                    line: MemberTotal { member, total },
                })
            }
            None => Ok(SessionEvent::Roster {
                day,
                lines: state.roster_totals(day)?,
            }),
        }
    }

    /// Clear a member's records for today.
    ///
    /// Open sessions and accumulators are left alone.
    pub fn reset(&self, target: Option<UserId>) -> Result<SessionEvent, StudyError> {
        self.reset_at(target, self.clock.now())
    }

    /// [`reset`](Self::reset) at an explicit instant.
    pub fn reset_at(
        &self,
        target: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<SessionEvent, StudyError> {
        let state = self.lock();
        let member = state.lookup(target)?;
        let day = report_day(now);

        let removed = state.store.reset_daily(member.id, day)?;
        info!(user = member.id, removed, "daily records reset");

        Ok(SessionEvent::Reset {
            today: DailyTotal::new(member.id, day, 0),
            member,
        })
    }

    /// End the day: report every roster member's total for `day`, purge the
    /// log, restart open sessions at `now` and drop all accumulators.
    ///
    /// If the purge fails, nothing in memory changes.
    pub fn close_day(
        &self,
        day: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<MemberTotal>, StudyError> {
        let mut state = self.lock();
        let lines = state.roster_totals(day)?;

        let purged = state.store.purge_all().map_err(|e| {
            warn!(error = %e, "purge at day boundary failed");
            e
        })?;
        let restarted = state.sessions.restart_all(now);
        let cleared = state.sessions.clear_paused();
        info!(purged, restarted, cleared, "day closed");

        Ok(lines)
    }

    /// Snapshot of a member's open session.
    pub fn active_session(&self, user_id: UserId) -> Option<ActiveSession> {
        self.lock().sessions.active(user_id).cloned()
    }

    /// A member's accumulated paused seconds.
    pub fn paused_seconds(&self, user_id: UserId) -> Option<i64> {
        self.lock().sessions.paused_seconds(user_id)
    }

    /// Where a member stands.
    pub fn state(&self, user_id: UserId) -> SessionState {
        self.lock().sessions.state(user_id)
    }

    /// Run `f` against the store while holding the tracker lock.
    pub fn with_store<T>(&self, f: impl FnOnce(&DurationStore) -> T) -> T {
        f(&self.lock().store)
    }
}
