//! Store errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed document {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<StoreError> for common::Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Malformed { .. } => common::Error::Serialization(err.to_string()),
            other => common::Error::Storage(other.to_string()),
        }
    }
}
