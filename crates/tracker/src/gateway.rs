//! Boundary to the chat platform
//!
//! The engine never talks to the platform directly. Everything it needs
//! (posting, editing, deleting, reacting, name lookup) goes through
//! [`Gateway`], so the engine can run against a fake in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::models::{EmojiToken, MessageId, UserId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Tracker channel unavailable: {0}")]
    ChannelUnavailable(String),
    #[error("Message {0} not found")]
    MessageNotFound(MessageId),
    #[error("Platform request failed: {0}")]
    Http(String),
}

impl From<GatewayError> for common::Error {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::MessageNotFound(id) => common::Error::NotFound(format!("message {}", id)),
            other => common::Error::Gateway(other.to_string()),
        }
    }
}

/// A message read back from the tracker channel
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    pub id: MessageId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Operations the engine issues against the tracker channel
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Confirm the configured channel still resolves
    async fn resolve_channel(&self) -> Result<(), GatewayError>;

    async fn send_message(&self, content: &str) -> Result<MessageId, GatewayError>;

    /// Replace a message's full text
    async fn edit_message(&self, message_id: MessageId, content: &str) -> Result<(), GatewayError>;

    async fn delete_message(&self, message_id: MessageId) -> Result<(), GatewayError>;

    async fn add_reaction(&self, message_id: MessageId, emoji: &EmojiToken) -> Result<(), GatewayError>;

    /// Most recent messages in the channel, newest first
    async fn recent_messages(&self, limit: u8) -> Result<Vec<ChannelMessage>, GatewayError>;

    /// Display name of a member, `None` if the platform doesn't know them
    async fn display_name(&self, user_id: &str) -> Result<Option<String>, GatewayError>;
}
