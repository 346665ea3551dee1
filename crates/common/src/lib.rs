//! Common types and utilities for the streak keeper

pub mod config;
pub mod error;
pub mod models;

pub use config::{Config, TrackerConfig};
pub use error::{Error, Result};
