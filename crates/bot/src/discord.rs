//! Serenity-backed gateway for the tracker channel

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use common::models::{EmojiToken, MessageId as TrackerMessageId};
use serenity::builder::{EditMessage, GetMessages};
use serenity::http::Http;
use serenity::model::channel::ReactionType;
use serenity::model::id::{ChannelId, EmojiId, GuildId, MessageId, UserId};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use tracker::{ChannelMessage, Gateway, GatewayError};

/// Talks to one configured channel over the REST API
pub struct DiscordGateway {
    http: Arc<Http>,
    channel_id: ChannelId,
    /// Guild of the channel, filled in by [`DiscordGateway::resolve_channel`]
    guild_id: RwLock<Option<GuildId>>,
}

impl DiscordGateway {
    pub fn new(http: Arc<Http>, channel_id: u64) -> Self {
        Self {
            http,
            channel_id: ChannelId::new(channel_id),
            guild_id: RwLock::new(None),
        }
    }
}

fn is_not_found(err: &serenity::Error) -> bool {
    match err {
        serenity::Error::Http(http_err) => http_err.status_code().map(|s| s.as_u16()) == Some(404),
        _ => false,
    }
}

fn map_message_error(id: TrackerMessageId, err: serenity::Error) -> GatewayError {
    if is_not_found(&err) {
        GatewayError::MessageNotFound(id)
    } else {
        GatewayError::Http(err.to_string())
    }
}

fn reaction_type(emoji: &EmojiToken) -> ReactionType {
    match emoji.id {
        Some(id) => ReactionType::Custom {
            animated: false,
            id: EmojiId::new(id),
            name: Some(emoji.name.clone()),
        },
        None => ReactionType::Unicode(emoji.name.clone()),
    }
}

#[async_trait]
impl Gateway for DiscordGateway {
    async fn resolve_channel(&self) -> Result<(), GatewayError> {
        let channel = self
            .channel_id
            .to_channel(&self.http)
            .await
            .map_err(|e| GatewayError::ChannelUnavailable(format!("{}: {}", self.channel_id, e)))?;

        let guild_id = channel.guild().map(|c| c.guild_id);
        if guild_id.is_none() {
            warn!("Tracker channel {} is not in a guild", self.channel_id);
        }

        let mut cached = self.guild_id.write().await;
        if *cached != guild_id {
            info!("Tracker channel {} resolved (guild {:?})", self.channel_id, guild_id);
            *cached = guild_id;
        }
        Ok(())
    }

    async fn send_message(&self, content: &str) -> Result<TrackerMessageId, GatewayError> {
        let message = self
            .channel_id
            .say(&self.http, content)
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;
        Ok(message.id.get())
    }

    async fn edit_message(&self, message_id: TrackerMessageId, content: &str) -> Result<(), GatewayError> {
        let id = MessageId::new(message_id);

        // Edit by id first; fetch the full message and retry on other failures
        let direct = self
            .channel_id
            .edit_message(&self.http, id, EditMessage::new().content(content))
            .await;
        let err = match direct {
            Ok(_) => return Ok(()),
            Err(e) if is_not_found(&e) => return Err(GatewayError::MessageNotFound(message_id)),
            Err(e) => e,
        };

        debug!("Direct edit of {} failed ({}), fetching", message_id, err);
        let mut message = self
            .channel_id
            .message(&self.http, id)
            .await
            .map_err(|e| map_message_error(message_id, e))?;
        message
            .edit(&self.http, EditMessage::new().content(content))
            .await
            .map_err(|e| map_message_error(message_id, e))
    }

    async fn delete_message(&self, message_id: TrackerMessageId) -> Result<(), GatewayError> {
        self.channel_id
            .delete_message(&self.http, MessageId::new(message_id))
            .await
            .map_err(|e| map_message_error(message_id, e))
    }

    async fn add_reaction(&self, message_id: TrackerMessageId, emoji: &EmojiToken) -> Result<(), GatewayError> {
        self.channel_id
            .create_reaction(&self.http, MessageId::new(message_id), reaction_type(emoji))
            .await
            .map_err(|e| map_message_error(message_id, e))
    }

    async fn recent_messages(&self, limit: u8) -> Result<Vec<ChannelMessage>, GatewayError> {
        let messages = self
            .channel_id
            .messages(&self.http, GetMessages::new().limit(limit))
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        Ok(messages
            .into_iter()
            .filter_map(|m| {
                let created_at = DateTime::from_timestamp(m.timestamp.unix_timestamp(), 0)?;
                Some(ChannelMessage {
                    id: m.id.get(),
                    author_id: m.author.id.get().to_string(),
                    content: m.content,
                    created_at,
                })
            })
            .collect())
    }

    async fn display_name(&self, user_id: &str) -> Result<Option<String>, GatewayError> {
        let Ok(raw) = user_id.parse::<u64>() else {
            return Ok(None);
        };
        let user_id = UserId::new(raw);

        if let Some(guild_id) = *self.guild_id.read().await {
            match guild_id.member(&self.http, user_id).await {
                Ok(member) => return Ok(Some(member.display_name().to_string())),
                Err(e) if is_not_found(&e) => return Ok(None),
                Err(e) => debug!("Member lookup for {} failed: {}", user_id, e),
            }
        }

        match user_id.to_user(&self.http).await {
            Ok(user) => Ok(Some(user.display_name().to_string())),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(GatewayError::Http(e.to_string())),
        }
    }
}
