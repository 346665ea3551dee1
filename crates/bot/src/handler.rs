//! Gateway event handling

use std::sync::Arc;

use serenity::async_trait;
use serenity::model::channel::{Reaction, ReactionType};
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{debug, error, info, warn};
use tracker::{Gateway, ReactionAction, ReactionEvent, ReactionOutcome, Tracker};

use crate::discord::DiscordGateway;

pub struct Bot {
    pub tracker: Arc<Tracker<DiscordGateway>>,
    pub channel_id: u64,
}

/// Emoji name as the tracker matches it; custom emoji without a name are dropped
fn emoji_name(emoji: &ReactionType) -> Option<String> {
    match emoji {
        ReactionType::Custom { name, .. } => name.clone(),
        ReactionType::Unicode(name) => Some(name.clone()),
        _ => None,
    }
}

impl Bot {
    fn to_event(&self, reaction: &Reaction, action: ReactionAction) -> Option<ReactionEvent> {
        if reaction.channel_id.get() != self.channel_id {
            return None;
        }
        Some(ReactionEvent {
            message_id: reaction.message_id.get(),
            user_id: reaction.user_id?.get().to_string(),
            emoji_name: emoji_name(&reaction.emoji)?,
            action,
        })
    }

    async fn dispatch(&self, reaction: Reaction, action: ReactionAction) {
        let Some(event) = self.to_event(&reaction, action) else {
            return;
        };

        match self.tracker.handle_reaction(&event).await {
            Ok(ReactionOutcome::Applied { day, category, refresh }) => {
                info!(
                    "{:?} {:?} by {} on {:?} ({} edited, {} failed)",
                    action, category, event.user_id, day, refresh.edited, refresh.failed
                );
            }
            Ok(outcome) => debug!("Reaction on {}: {:?}", event.message_id, outcome),
            Err(e) => error!("Failed to apply reaction on {}: {}", event.message_id, e),
        }
    }
}

#[async_trait]
impl EventHandler for Bot {
    async fn reaction_add(&self, _: Context, reaction: Reaction) {
        self.dispatch(reaction, ReactionAction::Add).await;
    }

    async fn reaction_remove(&self, _: Context, reaction: Reaction) {
        self.dispatch(reaction, ReactionAction::Remove).await;
    }

    async fn ready(&self, _: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        if let Err(e) = self.tracker.gateway().resolve_channel().await {
            warn!("Tracker channel not reachable yet: {}", e);
        }
    }
}
