//! Persistence trait for per-server role state.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::ids::ServerId;
use crate::role::model::ServerState;

/// Backing store of the persisted server states.
///
/// The whole collection is loaded once at startup and written back after
/// every mutation.
#[async_trait]
pub trait ServerStateStore: Send + Sync {
    async fn load(&self) -> Result<BTreeMap<ServerId, ServerState>>;

    async fn save(&self, servers: &BTreeMap<ServerId, ServerState>) -> Result<()>;
}
