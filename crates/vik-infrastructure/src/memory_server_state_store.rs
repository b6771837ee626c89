//! Volatile server state store.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use vik_core::error::Result;
use vik_core::ids::ServerId;
use vik_core::role::{ServerState, ServerStateStore};

/// Keeps the last saved snapshot in memory. Used when running without a
/// config file and in tests.
#[derive(Default)]
pub struct InMemoryServerStateStore {
    servers: Mutex<BTreeMap<ServerId, ServerState>>,
    saves: AtomicUsize,
}

impl InMemoryServerStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_servers(servers: BTreeMap<ServerId, ServerState>) -> Self {
        Self {
            servers: Mutex::new(servers),
            saves: AtomicUsize::new(0),
        }
    }

    /// How many times `save` was called.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> BTreeMap<ServerId, ServerState> {
        self.servers.lock().await.clone()
    }
}

#[async_trait]
impl ServerStateStore for InMemoryServerStateStore {
    async fn load(&self) -> Result<BTreeMap<ServerId, ServerState>> {
        Ok(self.servers.lock().await.clone())
    }

    async fn save(&self, servers: &BTreeMap<ServerId, ServerState>) -> Result<()> {
        *self.servers.lock().await = servers.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
