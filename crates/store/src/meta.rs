//! Day buckets and tracked message ids

use common::models::Meta;

use crate::{document, Store, StoreError};

/// Load meta, collapsing duplicate bucket entries
pub async fn load(store: &Store) -> Result<Meta, StoreError> {
    let mut meta: Meta = document::read(&store.meta_path()).await?;
    meta.normalize();
    Ok(meta)
}

/// Rewrite the meta document
pub async fn save(store: &Store, meta: &Meta) -> Result<(), StoreError> {
    document::write(&store.meta_path(), meta).await
}
