//! Application configuration

use std::env;
use std::path::PathBuf;

use chrono::{Duration, NaiveTime};
use chrono_tz::Tz;

use crate::models::{EmojiToken, UserId};
use crate::{Error, Result};

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: Option<String>,
    pub tracker: TrackerConfig,
}

/// Settings consumed by the tracker engine, resolved once at startup
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Channel holding the prompts and leaderboards
    pub channel_id: u64,
    /// Zone whose calendar midnight drives the rollover
    pub timezone: Tz,
    /// Local time of day for the rollover
    pub rollover_time: NaiveTime,
    pub reading_emoji: EmojiToken,
    pub writing_emoji: EmojiToken,
    /// The bot's own account, used to drop its own reactions
    pub bot_user_id: Option<UserId>,
    /// Directory holding tracker.json, meta.json and log.json
    pub data_dir: PathBuf,
    pub cleanup_max_age: Duration,
    pub leaderboard_max_age: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            discord_token: env::var("DISCORD_TOKEN").ok(),
            tracker: TrackerConfig::from_env()?,
        })
    }
}

impl TrackerConfig {
    pub fn from_env() -> Result<Self> {
        let channel_id = env::var("TRACKER_CHANNEL_ID")
            .map_err(|_| Error::Config("TRACKER_CHANNEL_ID must be set".to_string()))?
            .parse()
            .map_err(|_| Error::Config("TRACKER_CHANNEL_ID must be a numeric id".to_string()))?;

        let timezone = env::var("TRACKER_TIMEZONE")
            .unwrap_or_else(|_| "America/Los_Angeles".to_string())
            .parse::<Tz>()
            .map_err(|e| Error::Config(format!("TRACKER_TIMEZONE: {}", e)))?;

        let rollover_time = env::var("TRACKER_ROLLOVER_TIME")
            .ok()
            .map(|raw| {
                NaiveTime::parse_from_str(&raw, "%H:%M")
                    .map_err(|_| Error::Config(format!("TRACKER_ROLLOVER_TIME `{}` is not HH:MM", raw)))
            })
            .transpose()?
            .unwrap_or(NaiveTime::MIN);

        let reading_emoji = EmojiToken::parse(
            &env::var("READING_EMOJI").unwrap_or_else(|_| "frogReading:1397736959882956842".to_string()),
        )?;
        let writing_emoji = EmojiToken::parse(
            &env::var("WRITING_EMOJI").unwrap_or_else(|_| "bulbaWriter:1061522051501928498".to_string()),
        )?;
        if reading_emoji.name == writing_emoji.name {
            return Err(Error::Config(
                "READING_EMOJI and WRITING_EMOJI must differ".to_string(),
            ));
        }

        Ok(Self {
            channel_id,
            timezone,
            rollover_time,
            reading_emoji,
            writing_emoji,
            bot_user_id: env::var("BOT_USER_ID").ok(),
            data_dir: env::var("TRACKER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            cleanup_max_age: hours_var("CLEANUP_MAX_AGE_HOURS", 48)?,
            leaderboard_max_age: hours_var("CLEANUP_LEADERBOARD_MAX_AGE_HOURS", 23)?,
        })
    }
}

fn hours_var(name: &str, default: i64) -> Result<Duration> {
    match env::var(name) {
        Ok(raw) => parse_hours(name, &raw),
        Err(_) => Ok(Duration::hours(default)),
    }
}

fn parse_hours(name: &str, raw: &str) -> Result<Duration> {
    let invalid = || Error::Config(format!("{} must be a non-negative whole number of hours", name));
    let hours: i64 = raw.trim().parse().map_err(|_| invalid())?;
    if hours < 0 {
        return Err(invalid());
    }
    Duration::try_hours(hours).ok_or_else(invalid)
}
