//! Lifetime counters document

use common::models::CounterBook;

use crate::{document, Store, StoreError};

/// Load every user's counters
pub async fn load(store: &Store) -> Result<CounterBook, StoreError> {
    document::read(&store.counters_path()).await
}

/// Rewrite the counters document
pub async fn save(store: &Store, book: &CounterBook) -> Result<(), StoreError> {
    document::write(&store.counters_path(), book).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_store;
    use common::models::Counters;

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = create_store(dir.path()).await.unwrap();

        assert!(load(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = create_store(dir.path()).await.unwrap();

        let mut book = CounterBook::new();
        book.insert("42".to_string(), Counters { read: 3, write: 1 });
        save(&store, &book).await.unwrap();

        assert_eq!(load(&store).await.unwrap(), book);
    }

    #[tokio::test]
    async fn test_reads_document_with_string_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = create_store(dir.path()).await.unwrap();
        tokio::fs::write(
            dir.path().join("tracker.json"),
            r#"{"1234": {"read": 5, "write": 2}, "99": {"read": 0}}"#,
        )
        .await
        .unwrap();

        let book = load(&store).await.unwrap();

        assert_eq!(book["1234"], Counters { read: 5, write: 2 });
        assert_eq!(book["99"], Counters { read: 0, write: 0 });
    }

    #[tokio::test]
    async fn test_malformed_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = create_store(dir.path()).await.unwrap();
        tokio::fs::write(dir.path().join("tracker.json"), "{not json")
            .await
            .unwrap();

        let err = load(&store).await.unwrap_err();

        assert!(matches!(err, StoreError::Malformed { .. }));
    }
}
