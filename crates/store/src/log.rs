//! Write-once archive of meta snapshots

use chrono::NaiveDate;
use common::models::{Meta, MetaLog};
use tracing::warn;

use crate::{document, Store, StoreError};

/// Archive key for a rollover date
pub fn key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Record `meta` under `date`. An existing entry is left untouched and
/// `false` is returned.
pub async fn append(store: &Store, date: NaiveDate, meta: &Meta) -> Result<bool, StoreError> {
    let path = store.log_path();
    let mut log: MetaLog = document::read(&path).await?;

    let key = key(date);
    if log.contains_key(&key) {
        warn!("Meta log already has an entry for {}, keeping it", key);
        return Ok(false);
    }

    log.insert(key, meta.clone());
    document::write(&path, &log).await?;
    Ok(true)
}
