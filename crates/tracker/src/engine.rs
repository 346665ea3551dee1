//! Tracker engine state and shared rendering

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use common::models::{Category, CounterBook, EmojiToken, Meta, UserId};
use common::TrackerConfig;
use store::Store;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::gateway::{Gateway, GatewayError};
use crate::names::NameDirectory;
use crate::render;
use crate::scoring::{day_standings, standings, Projection};

/// Counters and meta as last persisted
#[derive(Debug, Clone, Default)]
pub(crate) struct TrackerState {
    pub counters: CounterBook,
    pub meta: Meta,
}

/// Outcome of re-rendering the tracked messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub edited: usize,
    pub failed: usize,
}

/// The streak tracker.
///
/// All reads and writes of counters and meta happen under one lock, held
/// from the read through the persist and the follow-up edits, so reaction
/// events and the rollover never interleave.
pub struct Tracker<G> {
    pub(crate) gateway: G,
    pub(crate) store: Store,
    pub(crate) config: TrackerConfig,
    pub(crate) names: NameDirectory,
    pub(crate) state: Mutex<TrackerState>,
    pub(crate) cleanup_pause: Duration,
}

impl<G: Gateway> Tracker<G> {
    /// Load persisted state and build the engine
    pub async fn open(gateway: G, store: Store, config: TrackerConfig) -> common::Result<Self> {
        let counters = store::counters::load(&store).await?;
        let meta = store::meta::load(&store).await?;

        info!(
            "Loaded tracker state: {} users, {} tracked prompts, last rollover {:?}",
            counters.len(),
            meta.tracker_message_ids.len(),
            meta.last_updated_date
        );

        Ok(Self {
            gateway,
            store,
            config,
            names: NameDirectory::new(),
            state: Mutex::new(TrackerState { counters, meta }),
            cleanup_pause: Duration::from_secs(1),
        })
    }

    /// Delay between deletions during cleanup
    pub fn with_cleanup_pause(mut self, pause: Duration) -> Self {
        self.cleanup_pause = pause;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub async fn last_updated_date(&self) -> Option<NaiveDate> {
        self.state.lock().await.meta.last_updated_date
    }

    /// Copy of the current counters and meta
    pub async fn snapshot(&self) -> (CounterBook, Meta) {
        let state = self.state.lock().await;
        (state.counters.clone(), state.meta.clone())
    }

    pub(crate) fn emoji(&self, category: Category) -> &EmojiToken {
        match category {
            Category::Reading => &self.config.reading_emoji,
            Category::Writing => &self.config.writing_emoji,
        }
    }

    pub(crate) fn category_for(&self, emoji_name: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|category| self.emoji(*category).matches(emoji_name))
    }

    /// Calendar date a log slot was posted for, counted back from the last
    /// rollover one day per slot
    pub(crate) fn date_of(&self, meta: &Meta, position: usize) -> NaiveDate {
        let today = meta
            .last_updated_date
            .unwrap_or_else(|| Utc::now().with_timezone(&self.config.timezone).date_naive());
        today - chrono::Duration::days(meta.days_before_newest(position))
    }

    pub(crate) async fn leaderboard_text(&self, counters: &CounterBook, meta: &Meta) -> String {
        let reading = standings(counters, meta, Category::Reading, Projection::Current);
        let writing = standings(counters, meta, Category::Writing, Projection::Current);
        let user_ids: Vec<UserId> = counters.keys().cloned().collect();
        let names = self.names.resolve_all(&self.gateway, &user_ids).await;

        render::leaderboard(
            &self.config.reading_emoji,
            &self.config.writing_emoji,
            &reading,
            &writing,
            &names,
        )
    }

    /// The prompt at a log position, scored as it stood on that day
    pub(crate) async fn progress_text(&self, counters: &CounterBook, meta: &Meta, position: usize) -> String {
        let day = meta.day_at_position(position);
        let projection = Projection::AsOf(day);
        let readers = day_standings(counters, meta, Category::Reading, day, projection);
        let writers = day_standings(counters, meta, Category::Writing, day, projection);
        let user_ids: Vec<UserId> = readers
            .iter()
            .chain(writers.iter())
            .map(|s| s.user_id.clone())
            .collect();
        let names = self.names.resolve_all(&self.gateway, &user_ids).await;

        render::progress(
            self.date_of(meta, position),
            &self.config.reading_emoji,
            &self.config.writing_emoji,
            &readers,
            &writers,
            &names,
        )
    }

    /// Re-render the leaderboard and every tracked prompt.
    ///
    /// Each edit stands alone: a failure is logged and the rest still run.
    pub(crate) async fn refresh_messages(&self, state: &TrackerState) -> RefreshReport {
        let mut report = RefreshReport::default();

        match state.meta.leaderboard_message_id {
            Some(id) => {
                let text = self.leaderboard_text(&state.counters, &state.meta).await;
                self.record_edit(&mut report, id, &text, "leaderboard").await;
            }
            None => debug!("No leaderboard posted yet, skipping edit"),
        }

        for (position, slot) in state.meta.tracker_message_ids.iter().enumerate() {
            let Some(id) = *slot else {
                continue;
            };
            let text = self.progress_text(&state.counters, &state.meta, position).await;
            self.record_edit(&mut report, id, &text, "tracker").await;
        }

        report
    }

    async fn record_edit(&self, report: &mut RefreshReport, id: u64, text: &str, kind: &str) {
        match self.gateway.edit_message(id, text).await {
            Ok(()) => report.edited += 1,
            Err(GatewayError::MessageNotFound(_)) => {
                warn!("Couldn't edit {} message {}: already gone", kind, id);
                report.failed += 1;
            }
            Err(e) => {
                warn!("Couldn't edit {} message {}: {}", kind, id, e);
                report.failed += 1;
            }
        }
    }
}
