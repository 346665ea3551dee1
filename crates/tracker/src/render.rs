//! Message text for leaderboards and daily prompts

use std::collections::HashMap;

use chrono::NaiveDate;
use common::models::{EmojiToken, UserId};

use crate::scoring::Standing;

pub const READING_HEADER: &str = "**Reading Streaks**";
pub const WRITING_HEADER: &str = "**Writing Streaks**";
pub const NOBODY_YET: &str = "Nobody yet";

/// Resolved display names by user id
pub type NameMap = HashMap<UserId, String>;

/// Placeholder when a name could not be resolved
pub fn fallback_name(user_id: &str) -> String {
    format!("<@{}>", user_id)
}

fn score_lines(standings: &[Standing], names: &NameMap) -> Vec<String> {
    standings
        .iter()
        .map(|s| {
            let name = names
                .get(&s.user_id)
                .cloned()
                .unwrap_or_else(|| fallback_name(&s.user_id));
            format!("{}: {}", name, s.score)
        })
        .collect()
}

fn score_block(standings: &[Standing], names: &NameMap) -> String {
    if standings.is_empty() {
        NOBODY_YET.to_string()
    } else {
        score_lines(standings, names).join("\n")
    }
}

/// Both streak tables in one message. Standings are expected pre-sorted.
pub fn leaderboard(
    reading_emoji: &EmojiToken,
    writing_emoji: &EmojiToken,
    reading: &[Standing],
    writing: &[Standing],
    names: &NameMap,
) -> String {
    format!(
        "{} {}\n{}\n\n{} {}\n{}",
        reading_emoji,
        READING_HEADER,
        score_block(reading, names),
        writing_emoji,
        WRITING_HEADER,
        score_block(writing, names),
    )
}

/// The bare prompt posted at rollover
pub fn prompt(date: NaiveDate, reading_emoji: &EmojiToken, writing_emoji: &EmojiToken) -> String {
    format!(
        "Today is **{}**.\nReact with {} if you read today and {} if you wrote today.",
        date.format("%A, %B %d, %Y"),
        reading_emoji,
        writing_emoji,
    )
}

/// A prompt with that day's participants listed under it
pub fn progress(
    date: NaiveDate,
    reading_emoji: &EmojiToken,
    writing_emoji: &EmojiToken,
    readers: &[Standing],
    writers: &[Standing],
    names: &NameMap,
) -> String {
    format!(
        "{}\n\n**Today's readers:**\n{}\n\n**Today's writers:**\n{}",
        prompt(date, reading_emoji, writing_emoji),
        score_block(readers, names),
        score_block(writers, names),
    )
}
