//! Whole-document reads and atomic rewrites

use std::io::ErrorKind;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::StoreError;

/// Read a document, treating a missing file as the empty document
pub(crate) async fn read<T>(path: &Path) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
{
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{} missing, starting empty", path.display());
            return Ok(T::default());
        }
        Err(e) => return Err(e.into()),
    };

    serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed {
        path: path.display().to_string(),
        source,
    })
}

/// Replace a document. The new contents go to a sibling temp file first and
/// are renamed over the target, so readers never see a torn write.
pub(crate) async fn write<T>(path: &Path, value: &T) -> Result<(), StoreError>
where
    T: Serialize,
{
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;

    debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}
