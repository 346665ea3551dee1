//! In-memory gateway and fixtures for engine tests

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use common::models::{EmojiToken, MessageId, UserId};
use common::TrackerConfig;

use crate::engine::Tracker;
use crate::gateway::{ChannelMessage, Gateway, GatewayError};

pub const BOT_ID: &str = "999";

#[derive(Default)]
struct FakeState {
    next_id: MessageId,
    contents: HashMap<MessageId, String>,
    history: Vec<ChannelMessage>,
    sends: Vec<(MessageId, String)>,
    edits: Vec<(MessageId, String)>,
    deletes: Vec<MessageId>,
    reactions: Vec<(MessageId, String)>,
    names: HashMap<UserId, String>,
    name_lookups: usize,
    gone: HashSet<MessageId>,
    channel_down: bool,
    fail_sends_containing: Option<String>,
}

/// Records every call; clones share state
#[derive(Clone)]
pub struct FakeGateway {
    state: Arc<Mutex<FakeState>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                next_id: 1000,
                ..Default::default()
            })),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn set_name(&self, user_id: &str, name: &str) {
        self.with(|s| s.names.insert(user_id.to_string(), name.to_string()));
    }

    pub fn name_lookups(&self) -> usize {
        self.with(|s| s.name_lookups)
    }

    pub fn set_channel_down(&self, down: bool) {
        self.with(|s| s.channel_down = down);
    }

    /// Reject every send whose text contains `needle`; `None` clears it
    pub fn fail_sends_containing(&self, needle: Option<&str>) {
        self.with(|s| s.fail_sends_containing = needle.map(str::to_string));
    }

    /// Make a message id behave as deleted on the platform
    pub fn mark_gone(&self, message_id: MessageId) {
        self.with(|s| s.gone.insert(message_id));
    }

    pub fn push_history(&self, message: ChannelMessage) {
        self.with(|s| {
            s.contents.insert(message.id, message.content.clone());
            s.history.push(message);
        });
    }

    pub fn content(&self, message_id: MessageId) -> Option<String> {
        self.with(|s| s.contents.get(&message_id).cloned())
    }

    pub fn sends(&self) -> Vec<(MessageId, String)> {
        self.with(|s| s.sends.clone())
    }

    pub fn edits(&self) -> Vec<(MessageId, String)> {
        self.with(|s| s.edits.clone())
    }

    pub fn deletes(&self) -> Vec<MessageId> {
        self.with(|s| s.deletes.clone())
    }

    pub fn reactions(&self) -> Vec<(MessageId, String)> {
        self.with(|s| s.reactions.clone())
    }

    pub fn clear_calls(&self) {
        self.with(|s| {
            s.sends.clear();
            s.edits.clear();
            s.deletes.clear();
            s.reactions.clear();
        });
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn resolve_channel(&self) -> Result<(), GatewayError> {
        if self.with(|s| s.channel_down) {
            return Err(GatewayError::ChannelUnavailable("fake channel down".into()));
        }
        Ok(())
    }

    async fn send_message(&self, content: &str) -> Result<MessageId, GatewayError> {
        self.with(|s| {
            if s.channel_down {
                return Err(GatewayError::ChannelUnavailable("fake channel down".into()));
            }
            if let Some(needle) = &s.fail_sends_containing {
                if content.contains(needle.as_str()) {
                    return Err(GatewayError::Http("fake send rejected".into()));
                }
            }
            let id = s.next_id;
            s.next_id += 1;
            s.contents.insert(id, content.to_string());
            s.sends.push((id, content.to_string()));
            s.history.push(ChannelMessage {
                id,
                author_id: BOT_ID.to_string(),
                content: content.to_string(),
                created_at: Utc::now(),
            });
            Ok(id)
        })
    }

    async fn edit_message(&self, message_id: MessageId, content: &str) -> Result<(), GatewayError> {
        self.with(|s| {
            if s.gone.contains(&message_id) || !s.contents.contains_key(&message_id) {
                return Err(GatewayError::MessageNotFound(message_id));
            }
            s.contents.insert(message_id, content.to_string());
            s.edits.push((message_id, content.to_string()));
            Ok(())
        })
    }

    async fn delete_message(&self, message_id: MessageId) -> Result<(), GatewayError> {
        self.with(|s| {
            if s.gone.contains(&message_id) {
                return Err(GatewayError::MessageNotFound(message_id));
            }
            s.contents.remove(&message_id);
            s.history.retain(|m| m.id != message_id);
            s.deletes.push(message_id);
            Ok(())
        })
    }

    async fn add_reaction(&self, message_id: MessageId, emoji: &EmojiToken) -> Result<(), GatewayError> {
        self.with(|s| s.reactions.push((message_id, emoji.name.clone())));
        Ok(())
    }

    async fn recent_messages(&self, limit: u8) -> Result<Vec<ChannelMessage>, GatewayError> {
        self.with(|s| {
            Ok(s.history
                .iter()
                .rev()
                .take(limit as usize)
                .cloned()
                .collect())
        })
    }

    async fn display_name(&self, user_id: &str) -> Result<Option<String>, GatewayError> {
        self.with(|s| {
            s.name_lookups += 1;
            Ok(s.names.get(user_id).cloned())
        })
    }
}

pub fn tz() -> Tz {
    chrono_tz::America::Los_Angeles
}

/// Local noon on the given date in the test zone
pub fn local_noon(year: i32, month: u32, day: u32) -> DateTime<Tz> {
    tz().with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

pub fn test_config(data_dir: &Path) -> TrackerConfig {
    TrackerConfig {
        channel_id: 1,
        timezone: tz(),
        rollover_time: NaiveTime::MIN,
        reading_emoji: EmojiToken::parse("frogReading:11").unwrap(),
        writing_emoji: EmojiToken::parse("bulbaWriter:22").unwrap(),
        bot_user_id: Some(BOT_ID.to_string()),
        data_dir: data_dir.to_path_buf(),
        cleanup_max_age: chrono::Duration::hours(48),
        leaderboard_max_age: chrono::Duration::hours(23),
    }
}

/// A tracker over a fresh temp directory and a fake gateway
pub async fn tracker(dir: &Path) -> (Tracker<FakeGateway>, FakeGateway) {
    let gateway = FakeGateway::new();
    let store = store::create_store(dir).await.unwrap();
    let tracker = Tracker::open(gateway.clone(), store, test_config(dir))
        .await
        .unwrap()
        .with_cleanup_pause(std::time::Duration::ZERO);
    (tracker, gateway)
}
