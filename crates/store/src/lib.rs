//! JSON document store for the streak keeper
//!
//! Three documents live side by side in one data directory:
//! - `tracker.json`: lifetime counters per user
//! - `meta.json`: day buckets and tracked message ids
//! - `log.json`: write-once archive of meta, keyed by rollover date
//!
//! Every document is loaded whole and rewritten whole. A missing file reads
//! as an empty document.

use std::path::PathBuf;

use tracing::info;

pub mod counters;
mod document;
pub mod error;
pub mod log;
pub mod meta;

pub use error::StoreError;

const COUNTERS_FILE: &str = "tracker.json";
const META_FILE: &str = "meta.json";
const LOG_FILE: &str = "log.json";

/// Handle to the data directory
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    fn counters_path(&self) -> PathBuf {
        self.dir.join(COUNTERS_FILE)
    }

    fn meta_path(&self) -> PathBuf {
        self.dir.join(META_FILE)
    }

    fn log_path(&self) -> PathBuf {
        self.dir.join(LOG_FILE)
    }
}

/// Open the store rooted at `dir`, creating the directory if needed
pub async fn create_store(dir: impl Into<PathBuf>) -> Result<Store, StoreError> {
    let dir = dir.into();
    info!("Opening data directory {}", dir.display());
    tokio::fs::create_dir_all(&dir).await?;
    Ok(Store { dir })
}
