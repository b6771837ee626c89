//! Role group domain models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ids::RoleId;

/// Display data attached to a role inside a group.
///
/// `api_name` mirrors the live role's name and is refreshed on every
/// reconciliation. The other fields are curated by admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RoleDescriptor {
    pub api_name: String,
    /// Emoji shown next to the role in the selector (mention form or unicode).
    pub emote_name: String,
    /// Custom label, can differ from the role's actual name.
    pub full_name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEntry {
    pub role_id: RoleId,
    #[serde(flatten)]
    pub descriptor: RoleDescriptor,
}

impl RoleEntry {
    pub fn new(role_id: RoleId, descriptor: RoleDescriptor) -> Self {
        Self {
            role_id,
            descriptor,
        }
    }
}

/// An ordered, curated set of roles users can pick from.
///
/// Role ids are unique within a group; order is display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RoleGroup {
    #[serde(default)]
    pub roles: Vec<RoleEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_selectable: Option<u8>,
}

impl RoleGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roles(roles: Vec<RoleEntry>) -> Self {
        Self {
            roles,
            max_selectable: None,
        }
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn find(&self, role_id: RoleId) -> Option<&RoleEntry> {
        self.roles.iter().find(|entry| entry.role_id == role_id)
    }

    pub fn contains(&self, role_id: RoleId) -> bool {
        self.find(role_id).is_some()
    }
}

/// Per-server persisted state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ServerState {
    #[serde(default)]
    pub groups: BTreeMap<String, RoleGroup>,
}

impl ServerState {
    pub fn group(&self, name: &str) -> Option<&RoleGroup> {
        self.groups.get(name)
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut RoleGroup> {
        self.groups.get_mut(name)
    }

    /// Group names in sorted order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }
}

/// A role as reported by the live role directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveRole {
    pub id: RoleId,
    #[serde(alias = "name")]
    pub display_name: String,
    /// Managed roles belong to integrations and cannot be assigned by the bot.
    #[serde(default, alias = "managed")]
    pub is_managed: bool,
}

impl LiveRole {
    pub fn new(id: RoleId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            is_managed: false,
        }
    }

    pub fn managed(mut self) -> Self {
        self.is_managed = true;
        self
    }
}
