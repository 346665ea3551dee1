//! Reading and writing streak tracker
//!
//! Users react to a daily prompt to log that they read or wrote that day.
//! The engine keeps three rolling day buckets, folds the oldest into each
//! user's counter at the daily rollover, and keeps the posted leaderboard and
//! prompts in step with late reactions on earlier days.

pub mod cleanup;
pub mod engine;
pub mod gateway;
pub mod names;
pub mod reaction;
pub mod render;
pub mod rollover;
pub mod scheduler;
pub mod scoring;

#[cfg(test)]
mod test_support;

pub use engine::{RefreshReport, Tracker};
pub use gateway::{ChannelMessage, Gateway, GatewayError};
pub use reaction::{ReactionAction, ReactionEvent, ReactionOutcome};
pub use rollover::{RolloverOutcome, RolloverReport};
pub use scheduler::Scheduler;
