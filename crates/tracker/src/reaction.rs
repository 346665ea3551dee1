//! Reaction reconciliation

use common::models::{Category, Counters, Day, MessageId, UserId};
use tracing::{debug, info};

use crate::engine::{RefreshReport, Tracker};
use crate::gateway::Gateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionAction {
    Add,
    Remove,
}

/// A reaction added to or removed from some message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    pub message_id: MessageId,
    pub user_id: UserId,
    pub emoji_name: String,
    pub action: ReactionAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    OwnReaction,
    UnknownEmoji,
    UntrackedMessage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionOutcome {
    Ignored(IgnoreReason),
    /// The bucket already matched; nothing persisted or re-rendered
    Unchanged,
    Applied {
        day: Day,
        category: Category,
        refresh: RefreshReport,
    },
}

impl<G: Gateway> Tracker<G> {
    /// Apply a reaction to the matching day bucket and re-render what it touches
    pub async fn handle_reaction(&self, event: &ReactionEvent) -> common::Result<ReactionOutcome> {
        if self.config.bot_user_id.as_deref() == Some(event.user_id.as_str()) {
            return Ok(ReactionOutcome::Ignored(IgnoreReason::OwnReaction));
        }

        let Some(category) = self.category_for(&event.emoji_name) else {
            debug!("Ignoring emoji {} on {}", event.emoji_name, event.message_id);
            return Ok(ReactionOutcome::Ignored(IgnoreReason::UnknownEmoji));
        };

        let mut state = self.state.lock().await;

        let Some(day) = state.meta.day_of_message(event.message_id) else {
            debug!("Ignoring reaction on untracked message {}", event.message_id);
            return Ok(ReactionOutcome::Ignored(IgnoreReason::UntrackedMessage));
        };

        let mut meta = state.meta.clone();
        let changed = match event.action {
            ReactionAction::Add => meta.insert(day, category, &event.user_id),
            ReactionAction::Remove => meta.remove(day, category, &event.user_id),
        };
        if !changed {
            debug!(
                "Duplicate {:?} from {} on {:?} {:?}",
                event.action, event.user_id, day, category
            );
            return Ok(ReactionOutcome::Unchanged);
        }

        if !state.counters.contains_key(&event.user_id) {
            let mut counters = state.counters.clone();
            counters.insert(event.user_id.clone(), Counters::default());
            store::counters::save(&self.store, &counters).await?;
            state.counters = counters;
            info!("Started tracking user {}", event.user_id);
        }

        store::meta::save(&self.store, &meta).await?;
        state.meta = meta;

        info!(
            "{:?} {:?} for {} on {:?} (message {})",
            event.action, category, event.user_id, day, event.message_id
        );

        let refresh = self.refresh_messages(&state).await;
        Ok(ReactionOutcome::Applied {
            day,
            category,
            refresh,
        })
    }
}
