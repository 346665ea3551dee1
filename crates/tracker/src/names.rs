//! Display name lookup with a process-lifetime cache

use std::collections::HashMap;

use common::models::UserId;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::gateway::Gateway;
use crate::render::{fallback_name, NameMap};

/// Caches names the platform resolved. Misses are not cached, so a later
/// lookup can still pick the name up.
#[derive(Debug, Default)]
pub struct NameDirectory {
    cache: RwLock<HashMap<UserId, String>>,
}

impl NameDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resolve<G: Gateway + ?Sized>(&self, gateway: &G, user_id: &str) -> String {
        if let Some(name) = self.cache.read().await.get(user_id) {
            return name.clone();
        }

        match gateway.display_name(user_id).await {
            Ok(Some(name)) => {
                debug!("Resolved name for {}: {}", user_id, name);
                self.cache
                    .write()
                    .await
                    .insert(user_id.to_string(), name.clone());
                name
            }
            Ok(None) => {
                warn!("Member name not found for ID {}", user_id);
                fallback_name(user_id)
            }
            Err(e) => {
                warn!("Name lookup failed for ID {}: {}", user_id, e);
                fallback_name(user_id)
            }
        }
    }

    /// Resolve every id, skipping duplicates
    pub async fn resolve_all<G: Gateway + ?Sized>(&self, gateway: &G, user_ids: &[UserId]) -> NameMap {
        let mut names = NameMap::new();
        for user_id in user_ids {
            if names.contains_key(user_id) {
                continue;
            }
            let name = self.resolve(gateway, user_id).await;
            names.insert(user_id.clone(), name);
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeGateway;

    #[tokio::test]
    async fn test_resolved_names_are_cached() {
        let gateway = FakeGateway::new();
        gateway.set_name("1", "Ada");
        let directory = NameDirectory::new();

        assert_eq!(directory.resolve(&gateway, "1").await, "Ada");
        gateway.set_name("1", "Renamed");
        assert_eq!(directory.resolve(&gateway, "1").await, "Ada");
        assert_eq!(gateway.name_lookups(), 1);
    }

    #[tokio::test]
    async fn test_unknown_member_falls_back_without_caching() {
        let gateway = FakeGateway::new();
        let directory = NameDirectory::new();

        assert_eq!(directory.resolve(&gateway, "7").await, "<@7>");
        gateway.set_name("7", "Late Joiner");
        assert_eq!(directory.resolve(&gateway, "7").await, "Late Joiner");
    }

    #[tokio::test]
    async fn test_resolve_all_deduplicates() {
        let gateway = FakeGateway::new();
        gateway.set_name("1", "Ada");
        let directory = NameDirectory::new();
        let ids: Vec<UserId> = vec!["1".into(), "1".into(), "2".into()];

        let names = directory.resolve_all(&gateway, &ids).await;

        assert_eq!(names.len(), 2);
        assert_eq!(names["2"], "<@2>");
        assert_eq!(gateway.name_lookups(), 2);
    }
}
