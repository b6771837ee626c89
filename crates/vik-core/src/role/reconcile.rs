//! Reconciliation of stored role groups against the live role directory.
//!
//! Everything here is pure: callers own loading and saving the state.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::ids::{RoleId, ServerId};
use crate::role::model::{LiveRole, RoleDescriptor, RoleEntry, RoleGroup, ServerState};

/// Refreshes a stored entry from its live role.
///
/// Only `api_name` changes; curated fields are kept as stored.
pub fn validate_from_api_role(live: &LiveRole, stored: &RoleEntry) -> RoleEntry {
    RoleEntry {
        role_id: live.id,
        descriptor: RoleDescriptor {
            api_name: live.display_name.clone(),
            ..stored.descriptor.clone()
        },
    }
}

/// Entry for a role that was not curated yet: every name is the live name.
pub fn new_entry_for(live: &LiveRole) -> RoleEntry {
    RoleEntry {
        role_id: live.id,
        descriptor: RoleDescriptor {
            api_name: live.display_name.clone(),
            emote_name: live.display_name.clone(),
            full_name: live.display_name.clone(),
            description: String::new(),
        },
    }
}

/// Rebuilds a group from an admin's role selection.
///
/// The selection decides membership and order. Known roles keep their
/// curated descriptor, unknown ones get a fresh entry, and roles missing
/// from the selection are dropped. Duplicate selections collapse to the
/// first occurrence.
pub fn update_roles_from_reality(selected: &[LiveRole], existing: &RoleGroup) -> RoleGroup {
    let mut seen = HashSet::new();
    let roles = selected
        .iter()
        .filter(|live| seen.insert(live.id))
        .map(|live| match existing.find(live.id) {
            Some(stored) => validate_from_api_role(live, stored),
            None => new_entry_for(live),
        })
        .collect();

    RoleGroup {
        roles,
        max_selectable: existing.max_selectable,
    }
}

/// Stored entries that still exist live, refreshed with their live names.
/// Stored order is kept.
pub fn resolve_live_entries(group: &RoleGroup, live: &[LiveRole]) -> Vec<RoleEntry> {
    group
        .roles
        .iter()
        .filter_map(|entry| {
            live.iter()
                .find(|role| role.id == entry.role_id)
                .map(|role| validate_from_api_role(role, entry))
        })
        .collect()
}

/// A single entry scheduled for removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleEntry {
    pub server: ServerId,
    pub group: String,
    pub role: RoleId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub removed: Vec<StaleEntry>,
    /// Servers without a live snapshot; they are left untouched.
    pub skipped_servers: Vec<ServerId>,
}

impl PruneReport {
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }
}

fn live_ids(roles: &[LiveRole]) -> HashSet<RoleId> {
    roles.iter().map(|role| role.id).collect()
}

/// Lists entries whose role no longer exists on their server.
///
/// Servers missing from `live_by_server` are not judged at all, since an
/// absent snapshot says nothing about which roles exist there.
pub fn stale_entries(
    servers: &BTreeMap<ServerId, ServerState>,
    live_by_server: &HashMap<ServerId, Vec<LiveRole>>,
) -> Vec<StaleEntry> {
    let mut stale = Vec::new();
    for (server_id, state) in servers {
        let Some(live) = live_by_server.get(server_id) else {
            continue;
        };
        let alive = live_ids(live);
        for (group_name, group) in &state.groups {
            stale.extend(
                group
                    .roles
                    .iter()
                    .filter(|entry| !alive.contains(&entry.role_id))
                    .map(|entry| StaleEntry {
                        server: *server_id,
                        group: group_name.clone(),
                        role: entry.role_id,
                    }),
            );
        }
    }
    stale
}

/// Drops every entry whose role is absent from its server's live set and
/// keeps the rest in their original order.
pub fn prune_stale_roles(
    servers: &mut BTreeMap<ServerId, ServerState>,
    live_by_server: &HashMap<ServerId, Vec<LiveRole>>,
) -> PruneReport {
    let mut report = PruneReport {
        removed: stale_entries(servers, live_by_server),
        skipped_servers: Vec::new(),
    };

    for (server_id, state) in servers.iter_mut() {
        let Some(live) = live_by_server.get(server_id) else {
            report.skipped_servers.push(*server_id);
            continue;
        };
        let alive = live_ids(live);
        for group in state.groups.values_mut() {
            group.roles.retain(|entry| alive.contains(&entry.role_id));
        }
    }

    report
}

/// Role changes for a member picking from a published menu.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberRoleChanges {
    pub add: Vec<RoleId>,
    pub remove: Vec<RoleId>,
}

/// Computes what to add and remove when a member submits a published menu.
///
/// Managed roles are never touched, even if someone put one in the group.
/// Group roles the member holds but did not select are removed; roles
/// outside the group are left alone.
pub fn member_role_changes(
    group: &RoleGroup,
    live: &[LiveRole],
    selected: &[RoleId],
    member_roles: &[RoleId],
) -> MemberRoleChanges {
    let group_roles: Vec<&LiveRole> = group
        .roles
        .iter()
        .filter_map(|entry| live.iter().find(|role| role.id == entry.role_id))
        .collect();

    let add: Vec<RoleId> = selected
        .iter()
        .filter_map(|id| live.iter().find(|role| role.id == *id))
        .filter(|role| !role.is_managed)
        .map(|role| role.id)
        .fold(Vec::new(), |mut acc, id| {
            if !acc.contains(&id) {
                acc.push(id);
            }
            acc
        });

    let remove = group_roles
        .iter()
        .filter(|role| !role.is_managed)
        .map(|role| role.id)
        .filter(|id| member_roles.contains(id) && !add.contains(id))
        .collect();

    MemberRoleChanges { add, remove }
}
