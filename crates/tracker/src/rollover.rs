//! Daily rollover: decay, leaderboard, bucket rotation, fresh prompt

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use common::models::{Category, CounterBook, Day, Meta, MessageId, UserId};
use tracing::{error, info, warn};

use crate::engine::Tracker;
use crate::gateway::Gateway;
use crate::render;
use crate::scoring::{standings, Projection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverReport {
    pub date: NaiveDate,
    pub users: usize,
    pub leaderboard_message_id: Option<MessageId>,
    pub prompt_message_id: Option<MessageId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RolloverOutcome {
    /// A rollover was already stamped for this local date
    AlreadyDone(NaiveDate),
    Completed(RolloverReport),
}

/// Fold the slot leaving the window into the raw counters: one point for
/// each category the user was active in, otherwise the counter halves.
pub fn decay_counters(counters: &CounterBook, meta: &Meta) -> CounterBook {
    let mut next = counters.clone();
    for (user_id, entry) in next.iter_mut() {
        for category in Category::ALL {
            let value = entry.get_mut(category);
            if meta.is_member(Day::TwoDaysAgo, category, user_id) {
                *value += 1;
            } else {
                *value /= 2;
            }
        }
    }
    next
}

impl<G: Gateway> Tracker<G> {
    /// Run the rollover for the local date of `now`.
    ///
    /// The channel is checked before anything is touched; if it doesn't
    /// resolve the call fails and state is unchanged. Meta is persisted
    /// last, stamped with the date, which is what makes a repeat call on the
    /// same date a no-op.
    pub async fn rollover(&self, now: DateTime<Tz>) -> common::Result<RolloverOutcome> {
        let date = now.date_naive();
        info!("Daily tracker update for {}", date);

        let mut state = self.state.lock().await;

        if state.meta.last_updated_date == Some(date) {
            info!("Daily update already performed for {}", date);
            return Ok(RolloverOutcome::AlreadyDone(date));
        }

        if let Err(e) = self.gateway.resolve_channel().await {
            error!("Rollover aborted, tracker channel unresolved: {}", e);
            return Err(e.into());
        }

        let reading = standings(&state.counters, &state.meta, Category::Reading, Projection::Current);
        let writing = standings(&state.counters, &state.meta, Category::Writing, Projection::Current);

        let counters = decay_counters(&state.counters, &state.meta);
        store::counters::save(&self.store, &counters).await?;
        state.counters = counters;

        let mut meta = state.meta.clone();

        let user_ids: Vec<UserId> = state.counters.keys().cloned().collect();
        let names = self.names.resolve_all(&self.gateway, &user_ids).await;
        let board = render::leaderboard(
            &self.config.reading_emoji,
            &self.config.writing_emoji,
            &reading,
            &writing,
            &names,
        );
        let leaderboard_message_id = match self.gateway.send_message(&board).await {
            Ok(id) => {
                meta.leaderboard_message_id = Some(id);
                Some(id)
            }
            Err(e) => {
                error!("Failed to post leaderboard: {}", e);
                None
            }
        };

        if let Err(e) = store::log::append(&self.store, date, &state.meta).await {
            error!("Failed to archive meta for {}: {}", date, e);
        }

        meta.rotate_buckets();

        let prompt = render::prompt(date, &self.config.reading_emoji, &self.config.writing_emoji);
        let prompt_message_id = match self.gateway.send_message(&prompt).await {
            Ok(id) => {
                for category in Category::ALL {
                    if let Err(e) = self.gateway.add_reaction(id, self.emoji(category)).await {
                        warn!("Failed to add {:?} reaction to prompt {}: {}", category, id, e);
                    }
                }
                Some(id)
            }
            Err(e) => {
                error!("Failed to post tracker prompt for {}: {}", date, e);
                None
            }
        };
        meta.push_tracker_message(prompt_message_id);

        meta.last_updated_date = Some(date);
        store::meta::save(&self.store, &meta).await?;
        state.meta = meta;

        info!(
            "Rollover for {} complete: {} users, leaderboard {:?}, prompt {:?}",
            date,
            state.counters.len(),
            leaderboard_message_id,
            prompt_message_id
        );

        Ok(RolloverOutcome::Completed(RolloverReport {
            date,
            users: state.counters.len(),
            leaderboard_message_id,
            prompt_message_id,
        }))
    }
}
