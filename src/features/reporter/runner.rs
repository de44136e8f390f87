//! Periodic boundary checks on the tokio runtime.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::daily::{DailyReporter, DailySummary};
use crate::features::sessions::SessionTracker;

/// Check the boundary every `period` until `cancel_token` fires.
///
/// Each summary is sent on `tx`. The loop also stops once the receiving
/// side has gone away.
pub async fn run<T>(
    mut reporter: DailyReporter,
    tracker: SessionTracker,
    period: Duration,
    cancel_token: CancellationToken,
    tx: UnboundedSender<T>,
) where
    T: From<DailySummary> + Send + 'static,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = tracker.now();
                match reporter.check(&tracker, now) {
                    Ok(Some(summary)) => {
                        if tx.send(T::from(summary)).is_err() {
                            debug!("summary receiver closed, stopping reporter");
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => error!(error = %err, "daily summary failed"),
                }
            }
            () = cancel_token.cancelled() => {
                debug!("reporter shutting down");
                break;
            }
        }
    }
}
