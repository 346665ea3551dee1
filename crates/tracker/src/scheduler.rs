//! Daily rollover scheduling

use std::sync::Arc;

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::engine::Tracker;
use crate::gateway::Gateway;

/// Longest DST gap we step across looking for a valid local instant
const MAX_GAP_MINUTES: i64 = 180;

/// Next instant strictly after `now` at local time `at`.
///
/// A time skipped by a DST jump resolves to the first valid minute after the
/// gap; a repeated time resolves to its first occurrence.
pub fn next_rollover(now: DateTime<Tz>, at: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let mut date = now.date_naive();

    loop {
        if let Some(candidate) = earliest_local(&tz, date.and_time(at)) {
            if candidate > now {
                return candidate;
            }
        }
        date = date.succ_opt().unwrap_or(date);
    }
}

/// Latest scheduled instant at or before `now`
pub fn previous_rollover(now: DateTime<Tz>, at: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let mut date = now.date_naive();

    loop {
        if let Some(candidate) = earliest_local(&tz, date.and_time(at)) {
            if candidate <= now {
                return candidate;
            }
        }
        date = date.pred_opt().unwrap_or(date);
    }
}

/// Whether a scheduled rollover has passed since the one stamped `last`
pub fn catch_up_due(last: Option<NaiveDate>, now: DateTime<Tz>, at: NaiveTime) -> bool {
    let due = previous_rollover(now, at).date_naive();
    last.map_or(true, |last| last < due)
}

fn earliest_local(tz: &Tz, local: chrono::NaiveDateTime) -> Option<DateTime<Tz>> {
    for minutes in 0..=MAX_GAP_MINUTES {
        match tz.from_local_datetime(&(local + Duration::minutes(minutes))) {
            LocalResult::Single(t) => return Some(t),
            LocalResult::Ambiguous(first, _) => return Some(first),
            LocalResult::None => continue,
        }
    }
    None
}

/// Fires the rollover and cleanup once per local day
pub struct Scheduler<G> {
    tracker: Arc<Tracker<G>>,
    shutdown: watch::Receiver<bool>,
}

impl<G: Gateway + 'static> Scheduler<G> {
    pub fn new(tracker: Arc<Tracker<G>>, shutdown: watch::Receiver<bool>) -> Self {
        Self { tracker, shutdown }
    }

    /// Run until shutdown is signalled.
    ///
    /// A missed rollover (first start, or downtime across midnight) runs
    /// right away. Shutdown is only observed between ticks, so a tick that
    /// has started always finishes persisting.
    pub async fn run(mut self) {
        let tz = self.tracker.config().timezone;
        let at = self.tracker.config().rollover_time;
        info!("Starting rollover scheduler (daily at {} {})", at, tz);

        let now = Utc::now().with_timezone(&tz);
        let last = self.tracker.last_updated_date().await;
        if catch_up_due(last, now, at) {
            info!("Missed rollover (last {:?}), running now", last);
            self.tick().await;
        }

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            let now = Utc::now().with_timezone(&tz);
            let next = next_rollover(now, at);
            let wait = (next - now).to_std().unwrap_or_default();
            info!("Next rollover at {} (in {:?})", next, wait);

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                changed = self.shutdown.changed() => {
                    if changed.is_err() {
                        warn!("Shutdown sender dropped, stopping scheduler");
                        break;
                    }
                    continue;
                }
            }

            self.tick().await;
        }

        info!("Rollover scheduler stopped");
    }

    async fn tick(&self) {
        let tz = self.tracker.config().timezone;

        if let Err(e) = self.tracker.rollover(Utc::now().with_timezone(&tz)).await {
            error!("Rollover failed, will retry next tick: {}", e);
        }

        if let Err(e) = self.tracker.cleanup_old_messages(Utc::now()).await {
            error!("Cleanup failed: {}", e);
        }
    }
}
