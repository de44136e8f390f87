//! The live event loop.
//!
//! Reads JSON-lines presence events, applies them to the tracker and
//! prints every resulting notification. The end-of-day reporter runs as a
//! separate task sharing the same tracker; a single writer task owns
//! stdout so lines never interleave.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::Context;
use crate::cli::args::OutputFormat;
use crate::core::Clock;
use crate::error::StudyError;
use crate::features::reporter::{self, DailyReporter, DailySummary};
use crate::features::sessions::{SessionEvent, SessionTracker};
use crate::output::{format_event, format_rejection, format_summary};
use crate::presence::{parse_command, parse_event_line, ChatCommand, Member, PresenceEvent};

/// Something to post.
#[derive(Debug)]
pub enum Notification {
    /// Outcome of a presence event or command.
    Event(SessionEvent),
    /// The end-of-day report.
    Summary(DailySummary),
    /// A command that was refused.
    Rejected(StudyError),
}

impl From<DailySummary> for Notification {
    fn from(summary: DailySummary) -> Self {
        Self::Summary(summary)
    }
}

impl Notification {
    /// Render for output.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Json` if JSON serialization fails.
    pub fn render(&self, format: OutputFormat) -> Result<String, StudyError> {
        match self {
            Self::Event(event) => format_event(event, format),
            Self::Summary(summary) => format_summary(summary, format),
            Self::Rejected(error) => format_rejection(error, format),
        }
    }
}

/// Apply one presence event to the tracker.
///
/// Command rejections become notifications; only storage and other
/// failures are returned as errors.
///
/// # Errors
///
/// Returns an error if the tracker could not persist or read the log.
pub fn dispatch(
    tracker: &SessionTracker,
    event: PresenceEvent,
) -> Result<Option<Notification>, StudyError> {
    let now = event.at().unwrap_or_else(|| tracker.now());

    let outcome = match event {
        PresenceEvent::Join {
            user_id,
            display_name,
            channel,
            bot,
            ..
        } => {
            let member = Member {
                id: user_id,
                display_name,
                bot,
            };
            tracker.join(member, &channel, now).map(Some)
        }
        PresenceEvent::Leave {
            user_id,
            display_name,
            ..
        } => tracker.leave(Member::new(user_id, display_name), now),
        PresenceEvent::Move {
            user_id, from, to, ..
        } => Ok(tracker.move_channel(user_id, &from, &to, now)),
        PresenceEvent::Message {
            author_id, text, ..
        } => {
            let Some(command) = parse_command(&text) else {
                return Ok(None);
            };
            debug!(author = author_id, ?command, "chat command");
            run_command(tracker, command, now).map(Some)
        }
    };

    match outcome {
        Ok(Some(event)) => {
            debug!(kind = event.kind(), "session event");
            Ok(Some(Notification::Event(event)))
        }
        Ok(None) => Ok(None),
        Err(e) if e.is_rejection() => {
            debug!(reason = %e, "command rejected");
            Ok(Some(Notification::Rejected(e)))
        }
        Err(e) => Err(e),
    }
}

fn run_command(
    tracker: &SessionTracker,
    command: ChatCommand,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<SessionEvent, StudyError> {
    let target = command.target()?;
    match command {
        ChatCommand::Pause(_) => tracker.pause_at(target, now),
        ChatCommand::Resume(_) => tracker.resume_at(target, now),
        ChatCommand::Today(_) => tracker.show_daily_at(target, now),
        ChatCommand::Reset(_) => tracker.reset_at(target, now),
    }
}

async fn open_input(events: Option<&Path>) -> Result<Box<dyn AsyncRead + Unpin + Send>, StudyError> {
    match events {
        Some(path) => {
            let file = tokio::fs::File::open(path).await.map_err(|e| {
                std::io::Error::new(e.kind(), format!("{}: {e}", path.display()))
            })?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(tokio::io::stdin())),
    }
}

/// Feed every line of `input` through the tracker. Returns the number of
/// events applied.
async fn read_events<R>(
    input: R,
    tracker: &SessionTracker,
    tx: &UnboundedSender<Notification>,
) -> Result<usize, StudyError>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(input).lines();
    let mut line_no = 0usize;
    let mut applied = 0usize;

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        line_no += 1;

        let event = match parse_event_line(&line) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                warn!(line = line_no, error = %e, "skipping event");
                continue;
            }
        };

        match dispatch(tracker, event) {
            Ok(Some(notification)) => {
                applied += 1;
                if tx.send(notification).is_err() {
                    break;
                }
            }
            Ok(None) => applied += 1,
            Err(e) => error!(line = line_no, error = %e, "event failed"),
        }
    }

    Ok(applied)
}

/// Execute serve command
///
/// Runs until the event stream ends or the process is interrupted.
///
/// # Errors
///
/// Returns an error if the store or the event source cannot be opened,
/// the reporter settings are invalid, or reading the stream fails.
pub async fn serve(
    ctx: &Context,
    clock: Arc<dyn Clock>,
    events: Option<PathBuf>,
) -> Result<String, StudyError> {
    let now = clock.now();
    let tracker = ctx.tracker(clock, now)?;
    let input = open_input(events.as_deref()).await?;

    let (tx, mut rx) = mpsc::unbounded_channel::<Notification>();
    let format = ctx.format;
    let writer = tokio::spawn(async move {
        while let Some(notification) = rx.recv().await {
            match notification.render(format) {
                Ok(text) => println!("{text}"),
                Err(e) => error!(error = %e, "failed to render notification"),
            }
        }
    });

    let cancel_token = CancellationToken::new();
    let reporter_task = if ctx.config.reporter.enabled {
        let daily = DailyReporter::from_config(&ctx.config.reporter)?;
        info!(
            offset = %ctx.config.reporter.offset()?,
            boundary = %ctx.config.reporter.boundary,
            "daily reporter started"
        );
        Some(tokio::spawn(reporter::run(
            daily,
            tracker.clone(),
            ctx.config.reporter.poll_interval(),
            cancel_token.clone(),
            tx.clone(),
        )))
    } else {
        None
    };

    let result = read_events(input, &tracker, &tx).await;

    cancel_token.cancel();
    if let Some(handle) = reporter_task {
        if let Err(e) = handle.await {
            error!(error = %e, "reporter task failed");
        }
    }
    drop(tx);
    if let Err(e) = writer.await {
        error!(error = %e, "writer task failed");
    }

    let applied = result?;
    info!(events = applied, "event stream ended");
    Ok(String::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use tempfile::TempDir;

    use crate::config::{Config, Paths};
    use crate::core::ManualClock;
    use crate::features::durations::DurationStore;
    use crate::presence::Directory;
    use crate::storage::Database;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    fn create_tracker() -> (SessionTracker, Arc<ManualClock>) {
        let store = DurationStore::with_database(Database::open_in_memory().unwrap());
        let clock = Arc::new(ManualClock::new(t0()));
        let tracker = SessionTracker::new(store, Directory::new(), clock.clone());
        (tracker, clock)
    }

    fn apply(tracker: &SessionTracker, line: &str) -> Option<Notification> {
        let event = parse_event_line(line).unwrap().unwrap();
        dispatch(tracker, event).unwrap()
    }

    #[test]
    fn test_dispatch_join_and_leave_use_event_time() {
        let (tracker, _) = create_tracker();
        let started = apply(
            &tracker,
            r#"{"type":"join","user_id":1,"display_name":"Alice","channel":"Study Room","at":"2024-03-01T10:00:00Z"}"#,
        );
        assert!(matches!(
            started,
            Some(Notification::Event(SessionEvent::Started { .. }))
        ));

        let ended = apply(
            &tracker,
            r#"{"type":"leave","user_id":1,"display_name":"Alice","at":"2024-03-01T10:30:00Z"}"#,
        );
        match ended {
            Some(Notification::Event(SessionEvent::Ended { session_seconds, .. })) => {
                assert_eq!(session_seconds, 1800);
            }
            other => panic!("unexpected notification: {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_commands_and_rejections() {
        let (tracker, clock) = create_tracker();
        apply(
            &tracker,
            r#"{"type":"join","user_id":1,"display_name":"Alice","channel":"Study Room"}"#,
        );

        clock.advance(Duration::seconds(30));
        let paused = apply(&tracker, r#"{"type":"message","author_id":2,"text":"!pause <@1>"}"#);
        assert!(matches!(
            paused,
            Some(Notification::Event(SessionEvent::Paused {
                session_seconds: 30,
                ..
            }))
        ));

        let rejected = apply(&tracker, r#"{"type":"message","author_id":2,"text":"!일시정지 <@1>"}"#);
        match rejected {
            Some(Notification::Rejected(StudyError::NotActive(name))) => assert_eq!(name, "Alice"),
            other => panic!("unexpected notification: {other:?}"),
        }

        let missing = apply(&tracker, r#"{"type":"message","author_id":2,"text":"!resume"}"#);
        match missing {
            Some(Notification::Rejected(StudyError::UnknownTarget(message))) => {
                assert!(message.contains("!resume @member"));
            }
            other => panic!("unexpected notification: {other:?}"),
        }

        let garbled = apply(
            &tracker,
            r#"{"type":"message","author_id":2,"text":"!today @nobody"}"#,
        );
        match garbled {
            Some(Notification::Rejected(StudyError::UnknownTarget(text))) => {
                assert_eq!(text, "@nobody");
            }
            other => panic!("unexpected notification: {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_ignores_chatter_and_untracked_moves() {
        let (tracker, _) = create_tracker();
        assert!(apply(&tracker, r#"{"type":"message","author_id":2,"text":"good morning"}"#).is_none());
        assert!(apply(
            &tracker,
            r#"{"type":"move","user_id":5,"from":"A","to":"B"}"#
        )
        .is_none());
        assert!(apply(&tracker, r#"{"type":"leave","user_id":5,"display_name":"Eve"}"#).is_none());
    }

    #[test]
    fn test_render_summary_notification() {
        let notification = Notification::from(DailySummary {
            date: t0().date_naive(),
            lines: Vec::new(),
        });
        let text = notification.render(OutputFormat::Pretty).unwrap();
        assert!(text.contains("[2024.03.01]"));
    }

    #[tokio::test]
    async fn test_serve_replays_event_file() {
        let dir = TempDir::new().unwrap();
        let events = dir.path().join("events.jsonl");
        std::fs::write(
            &events,
            concat!(
                "# replay\n",
                r#"{"type":"join","user_id":1,"display_name":"Alice","channel":"Study Room","at":"2024-03-01T10:00:00Z"}"#,
                "\n",
                "not json\n",
                r#"{"type":"move","user_id":1,"from":"Study Room","to":"Quiet Room","at":"2024-03-01T10:05:00Z"}"#,
                "\n",
                r#"{"type":"leave","user_id":1,"display_name":"Alice","at":"2024-03-01T10:10:00Z"}"#,
                "\n",
            ),
        )
        .unwrap();

        let mut config = Config::default();
        config.reporter.enabled = false;
        let ctx = Context {
            paths: Paths::with_root(dir.path().to_path_buf()),
            config,
            format: OutputFormat::Json,
        };

        let clock = Arc::new(ManualClock::new(t0()));
        let output = serve(&ctx, clock, Some(events)).await.unwrap();
        assert!(output.is_empty());

        let records = ctx.open_store().unwrap().records(None, None, 10).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].duration_seconds, 600);
        assert_eq!(records[0].channel_name, "Quiet Room");
    }

    #[tokio::test]
    async fn test_serve_missing_event_file() {
        let dir = TempDir::new().unwrap();
        let ctx = Context {
            paths: Paths::with_root(dir.path().to_path_buf()),
            config: Config::default(),
            format: OutputFormat::Pretty,
        };
        let clock = Arc::new(ManualClock::new(t0()));
        let result = serve(&ctx, clock, Some(dir.path().join("missing.jsonl"))).await;
        assert!(matches!(result, Err(StudyError::Io(_))));
    }
}
