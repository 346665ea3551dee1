//! Domain models

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Platform account id, kept in the string form it is persisted with
pub type UserId = String;

/// Platform message id
pub type MessageId = u64;

/// Number of tracker prompts kept alive, one per day slot
pub const TRACKED_DAYS: usize = 3;

/// The two tracked activities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Reading,
    Writing,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Reading, Category::Writing];
}

/// One of the three rolling day slots, ordered oldest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Day {
    TwoDaysAgo,
    Yesterday,
    Today,
}

impl Day {
    /// Chronological order: two days ago, yesterday, today
    pub const ALL: [Day; 3] = [Day::TwoDaysAgo, Day::Yesterday, Day::Today];

    pub fn index(self) -> usize {
        match self {
            Day::TwoDaysAgo => 0,
            Day::Yesterday => 1,
            Day::Today => 2,
        }
    }
}

/// Lifetime raw counts for one user. Only the daily rollover changes these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    #[serde(default)]
    pub read: u64,
    #[serde(default)]
    pub write: u64,
}

impl Counters {
    pub fn get(&self, category: Category) -> u64 {
        match category {
            Category::Reading => self.read,
            Category::Writing => self.write,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut u64 {
        match category {
            Category::Reading => &mut self.read,
            Category::Writing => &mut self.write,
        }
    }
}

/// Counters document, keyed by user id
pub type CounterBook = BTreeMap<UserId, Counters>;

/// Rolling day buckets and message bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Tracker prompts, oldest first, one slot per rollover. A slot is
    /// `None` when that day's prompt could not be posted, so positions stay
    /// aligned with the day buckets.
    #[serde(default)]
    pub tracker_message_ids: Vec<Option<MessageId>>,
    #[serde(default)]
    pub leaderboard_message_id: Option<MessageId>,
    #[serde(rename = "today's readers", default)]
    pub today_readers: Vec<UserId>,
    #[serde(rename = "today's writers", default)]
    pub today_writers: Vec<UserId>,
    #[serde(rename = "yesterday's readers", default)]
    pub yesterday_readers: Vec<UserId>,
    #[serde(rename = "yesterday's writers", default)]
    pub yesterday_writers: Vec<UserId>,
    #[serde(rename = "two days ago's readers", default)]
    pub two_days_ago_readers: Vec<UserId>,
    #[serde(rename = "two days ago's writers", default)]
    pub two_days_ago_writers: Vec<UserId>,
    /// Local date of the last completed rollover
    #[serde(default)]
    pub last_updated_date: Option<NaiveDate>,
}

impl Meta {
    pub fn bucket(&self, day: Day, category: Category) -> &[UserId] {
        match (day, category) {
            (Day::Today, Category::Reading) => &self.today_readers,
            (Day::Today, Category::Writing) => &self.today_writers,
            (Day::Yesterday, Category::Reading) => &self.yesterday_readers,
            (Day::Yesterday, Category::Writing) => &self.yesterday_writers,
            (Day::TwoDaysAgo, Category::Reading) => &self.two_days_ago_readers,
            (Day::TwoDaysAgo, Category::Writing) => &self.two_days_ago_writers,
        }
    }

    pub fn bucket_mut(&mut self, day: Day, category: Category) -> &mut Vec<UserId> {
        match (day, category) {
            (Day::Today, Category::Reading) => &mut self.today_readers,
            (Day::Today, Category::Writing) => &mut self.today_writers,
            (Day::Yesterday, Category::Reading) => &mut self.yesterday_readers,
            (Day::Yesterday, Category::Writing) => &mut self.yesterday_writers,
            (Day::TwoDaysAgo, Category::Reading) => &mut self.two_days_ago_readers,
            (Day::TwoDaysAgo, Category::Writing) => &mut self.two_days_ago_writers,
        }
    }

    pub fn is_member(&self, day: Day, category: Category, user_id: &str) -> bool {
        self.bucket(day, category).iter().any(|id| id == user_id)
    }

    /// Membership flags for one user, oldest first
    pub fn membership(&self, category: Category, user_id: &str) -> [bool; 3] {
        Day::ALL.map(|day| self.is_member(day, category, user_id))
    }

    /// Adds `user_id` to a bucket. Returns false if it was already there.
    pub fn insert(&mut self, day: Day, category: Category, user_id: &str) -> bool {
        let bucket = self.bucket_mut(day, category);
        if bucket.iter().any(|id| id == user_id) {
            return false;
        }
        bucket.push(user_id.to_string());
        true
    }

    /// Removes `user_id` from a bucket. Returns false if it was absent.
    pub fn remove(&mut self, day: Day, category: Category, user_id: &str) -> bool {
        let bucket = self.bucket_mut(day, category);
        let before = bucket.len();
        bucket.retain(|id| id != user_id);
        bucket.len() != before
    }

    /// Day slot a tracked message belongs to.
    ///
    /// Until the log is full there is no way to tell days apart, so every
    /// tracked message resolves to today.
    pub fn day_of_message(&self, message_id: MessageId) -> Option<Day> {
        let position = self
            .tracker_message_ids
            .iter()
            .position(|id| *id == Some(message_id))?;
        Some(self.day_at_position(position))
    }

    /// Posted prompt ids, oldest first, skipping empty slots
    pub fn tracked_ids(&self) -> Vec<MessageId> {
        self.tracker_message_ids.iter().flatten().copied().collect()
    }

    /// Slots between a log position and the newest one
    pub fn days_before_newest(&self, position: usize) -> i64 {
        self.tracker_message_ids
            .len()
            .saturating_sub(position + 1) as i64
    }

    pub fn day_at_position(&self, position: usize) -> Day {
        if self.tracker_message_ids.len() < TRACKED_DAYS {
            Day::Today
        } else {
            Day::ALL[position.min(TRACKED_DAYS - 1)]
        }
    }

    /// Shifts every bucket one slot older and empties today
    pub fn rotate_buckets(&mut self) {
        self.two_days_ago_readers = std::mem::take(&mut self.yesterday_readers);
        self.two_days_ago_writers = std::mem::take(&mut self.yesterday_writers);
        self.yesterday_readers = std::mem::take(&mut self.today_readers);
        self.yesterday_writers = std::mem::take(&mut self.today_writers);
    }

    /// Appends the newest slot, evicting the oldest past the window.
    /// `None` records a day whose prompt never made it to the channel.
    pub fn push_tracker_message(&mut self, message_id: Option<MessageId>) {
        self.tracker_message_ids.push(message_id);
        self.trim_tracker_messages();
    }

    /// Collapses duplicate ids and over-long logs left by older writers
    pub fn normalize(&mut self) {
        for day in Day::ALL {
            for category in Category::ALL {
                let bucket = self.bucket_mut(day, category);
                let mut seen = Vec::with_capacity(bucket.len());
                bucket.retain(|id| {
                    if seen.contains(id) {
                        false
                    } else {
                        seen.push(id.clone());
                        true
                    }
                });
            }
        }
        self.trim_tracker_messages();
    }

    fn trim_tracker_messages(&mut self) {
        let len = self.tracker_message_ids.len();
        if len > TRACKED_DAYS {
            self.tracker_message_ids.drain(..len - TRACKED_DAYS);
        }
    }
}

/// Archive of pre-rotation meta snapshots keyed by `YYYY-MM-DD`
pub type MetaLog = BTreeMap<String, Meta>;

/// Emoji used as a category token, either unicode or a custom emoji
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiToken {
    pub name: String,
    pub id: Option<u64>,
}

impl EmojiToken {
    /// Parses `name` or `name:id`
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let (name, id) = match raw.rsplit_once(':') {
            Some((name, id)) => {
                let id = id
                    .parse()
                    .map_err(|_| Error::Config(format!("invalid emoji id in `{}`", raw)))?;
                (name, Some(id))
            }
            None => (raw, None),
        };

        if name.is_empty() {
            return Err(Error::Config(format!("empty emoji name in `{}`", raw)));
        }

        Ok(Self {
            name: name.to_string(),
            id,
        })
    }

    /// Reaction events carry the emoji name only
    pub fn matches(&self, name: &str) -> bool {
        self.name == name
    }
}

impl fmt::Display for EmojiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "<:{}:{}>", self.name, id),
            None => f.write_str(&self.name),
        }
    }
}
