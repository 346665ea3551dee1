//! Removal of stale bot posts from the tracker channel

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::engine::Tracker;
use crate::gateway::{ChannelMessage, Gateway};
use crate::render::READING_HEADER;

/// How far back in the channel to look
const HISTORY_LIMIT: u8 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub scanned: usize,
    pub deleted: usize,
    pub failed: usize,
}

impl<G: Gateway> Tracker<G> {
    /// Delete the bot's old prompts and superseded leaderboards.
    ///
    /// Messages still tracked (the live prompts and current leaderboard)
    /// are never deleted.
    pub async fn cleanup_old_messages(&self, now: DateTime<Utc>) -> common::Result<CleanupReport> {
        let Some(bot_id) = self.config.bot_user_id.as_deref() else {
            warn!("Bot user id unknown, skipping cleanup");
            return Ok(CleanupReport::default());
        };

        let protected: Vec<u64> = {
            let state = self.state.lock().await;
            state
                .meta
                .tracked_ids()
                .into_iter()
                .chain(state.meta.leaderboard_message_id)
                .collect()
        };

        let messages = self.gateway.recent_messages(HISTORY_LIMIT).await?;
        let mut report = CleanupReport {
            scanned: messages.len(),
            ..Default::default()
        };

        for message in messages {
            if message.author_id != bot_id || protected.contains(&message.id) {
                continue;
            }
            if !self.is_expired(&message, now) {
                continue;
            }

            match self.gateway.delete_message(message.id).await {
                Ok(()) => {
                    info!("Old message {} deleted", message.id);
                    report.deleted += 1;
                }
                Err(e) => {
                    warn!("Failed to delete message {}: {}", message.id, e);
                    report.failed += 1;
                }
            }

            if !self.cleanup_pause.is_zero() {
                tokio::time::sleep(self.cleanup_pause).await;
            }
        }

        info!(
            "Cleanup scanned {} messages, deleted {}, failed {}",
            report.scanned, report.deleted, report.failed
        );
        Ok(report)
    }

    fn is_expired(&self, message: &ChannelMessage, now: DateTime<Utc>) -> bool {
        let age = now - message.created_at;
        age > self.config.cleanup_max_age
            || (message.content.contains(READING_HEADER) && age >= self.config.leaderboard_max_age)
    }
}
