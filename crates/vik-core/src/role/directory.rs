//! Live role directory trait.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::Result;
use crate::ids::{RoleId, ServerId, UserId};
use crate::role::model::LiveRole;

/// The authoritative source of which roles exist on a server.
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    /// Current roles of one server.
    async fn live_roles(&self, server: ServerId) -> Result<Vec<LiveRole>>;

    /// Current roles of every server the bot can see.
    async fn snapshot(&self) -> Result<HashMap<ServerId, Vec<LiveRole>>>;

    /// Adds and removes roles on a member in one request.
    async fn modify_member_roles(
        &self,
        server: ServerId,
        member: UserId,
        add: &[RoleId],
        remove: &[RoleId],
    ) -> Result<()>;
}
