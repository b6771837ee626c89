//! Shared, persisted role state of every server.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use vik_core::error::Result;
use vik_core::ids::ServerId;
use vik_core::role::{ServerState, ServerStateStore};

/// Owns the in-memory copy of all server states and writes it back to the
/// [`ServerStateStore`] after each mutation.
///
/// A mutation runs against a clone and is committed only after the save
/// succeeded, so a failed save leaves memory and storage consistent.
/// Mutations are serialized behind one lock; reads see committed state only.
pub struct ServerStateService {
    servers: Mutex<BTreeMap<ServerId, ServerState>>,
    store: Arc<dyn ServerStateStore>,
}

impl ServerStateService {
    pub fn new(servers: BTreeMap<ServerId, ServerState>, store: Arc<dyn ServerStateStore>) -> Self {
        Self {
            servers: Mutex::new(servers),
            store,
        }
    }

    /// Loads the initial state from `store`.
    pub async fn load(store: Arc<dyn ServerStateStore>) -> Result<Self> {
        let servers = store.load().await?;
        tracing::debug!(servers = servers.len(), "server state loaded");
        Ok(Self::new(servers, store))
    }

    pub async fn server(&self, server: ServerId) -> Option<ServerState> {
        self.servers.lock().await.get(&server).cloned()
    }

    /// Full copy of the committed state.
    pub async fn snapshot(&self) -> BTreeMap<ServerId, ServerState> {
        self.servers.lock().await.clone()
    }

    /// Applies `f` to all servers, saves, and commits.
    pub async fn mutate<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut BTreeMap<ServerId, ServerState>) -> Result<R>,
    {
        let mut servers = self.servers.lock().await;
        let mut draft = servers.clone();
        let result = f(&mut draft)?;
        self.store.save(&draft).await?;
        *servers = draft;
        Ok(result)
    }

    /// Applies `f` to one server's state, creating an empty state when the
    /// server has none yet.
    pub async fn mutate_server<F, R>(&self, server: ServerId, f: F) -> Result<R>
    where
        F: FnOnce(&mut ServerState) -> Result<R>,
    {
        self.mutate(|servers| f(servers.entry(server).or_default()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use vik_core::VikError;
    use vik_core::role::RoleGroup;
    use vik_infrastructure::InMemoryServerStateStore;

    struct FailingStore;

    #[async_trait]
    impl ServerStateStore for FailingStore {
        async fn load(&self) -> Result<BTreeMap<ServerId, ServerState>> {
            Ok(BTreeMap::new())
        }

        async fn save(&self, _servers: &BTreeMap<ServerId, ServerState>) -> Result<()> {
            Err(VikError::io("disk full"))
        }
    }

    #[tokio::test]
    async fn test_mutation_is_saved() {
        let store = Arc::new(InMemoryServerStateStore::new());
        let service = ServerStateService::load(store.clone()).await.unwrap();

        service
            .mutate_server(ServerId(1), |state| {
                state.groups.insert("colors".to_string(), RoleGroup::new());
                Ok(())
            })
            .await
            .unwrap();

        assert!(service.server(ServerId(1)).await.unwrap().group("colors").is_some());
        assert_eq!(store.save_count(), 1);
        assert!(store.snapshot().await[&ServerId(1)].group("colors").is_some());
    }

    #[tokio::test]
    async fn test_failed_closure_changes_nothing() {
        let store = Arc::new(InMemoryServerStateStore::new());
        let service = ServerStateService::load(store.clone()).await.unwrap();

        let result: Result<()> = service
            .mutate_server(ServerId(1), |state| {
                state.groups.insert("colors".to_string(), RoleGroup::new());
                Err(VikError::not_found("group", "colors"))
            })
            .await;

        assert!(result.unwrap_err().is_not_found());
        assert!(service.server(ServerId(1)).await.is_none());
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_save_is_not_committed() {
        let service = ServerStateService::load(Arc::new(FailingStore)).await.unwrap();

        let result = service
            .mutate_server(ServerId(1), |state| {
                state.groups.insert("colors".to_string(), RoleGroup::new());
                Ok(())
            })
            .await;

        assert!(result.is_err());
        assert!(service.snapshot().await.is_empty());
    }
}
