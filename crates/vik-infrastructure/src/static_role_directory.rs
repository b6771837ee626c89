//! Role directory backed by a fixed snapshot.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use vik_core::error::{Result, VikError};
use vik_core::ids::{RoleId, ServerId, UserId};
use vik_core::role::{LiveRole, RoleDirectory};

/// A member role change applied through [`StaticRoleDirectory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRoleUpdate {
    pub server: ServerId,
    pub member: UserId,
    pub add: Vec<RoleId>,
    pub remove: Vec<RoleId>,
}

/// Serves live roles from memory, e.g. an exported snapshot of the servers.
///
/// Member role changes are recorded instead of applied anywhere.
#[derive(Default)]
pub struct StaticRoleDirectory {
    roles: Mutex<HashMap<ServerId, Vec<LiveRole>>>,
    updates: Mutex<Vec<MemberRoleUpdate>>,
}

impl StaticRoleDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roles(roles: HashMap<ServerId, Vec<LiveRole>>) -> Self {
        Self {
            roles: Mutex::new(roles),
            updates: Mutex::new(Vec::new()),
        }
    }

    /// Reads a JSON export shaped `{ "<server id>": [{ "id", "name", "managed" }] }`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| VikError::io(format!("{}: {}", path.display(), e)))?;
        let roles: HashMap<ServerId, Vec<LiveRole>> = serde_json::from_str(&content)?;
        Ok(Self::with_roles(roles))
    }

    pub fn set_roles(&self, server: ServerId, roles: Vec<LiveRole>) {
        lock(&self.roles).insert(server, roles);
    }

    pub fn updates(&self) -> Vec<MemberRoleUpdate> {
        lock(&self.updates).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl RoleDirectory for StaticRoleDirectory {
    async fn live_roles(&self, server: ServerId) -> Result<Vec<LiveRole>> {
        lock(&self.roles)
            .get(&server)
            .cloned()
            .ok_or_else(|| VikError::not_found("server", server.to_string()))
    }

    async fn snapshot(&self) -> Result<HashMap<ServerId, Vec<LiveRole>>> {
        Ok(lock(&self.roles).clone())
    }

    async fn modify_member_roles(
        &self,
        server: ServerId,
        member: UserId,
        add: &[RoleId],
        remove: &[RoleId],
    ) -> Result<()> {
        lock(&self.updates).push(MemberRoleUpdate {
            server,
            member,
            add: add.to_vec(),
            remove: remove.to_vec(),
        });
        Ok(())
    }
}
