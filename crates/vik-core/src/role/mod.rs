//! Role groups, the live role directory and their reconciliation.

pub mod directory;
pub mod model;
pub mod reconcile;
pub mod repository;

pub use directory::RoleDirectory;
pub use model::{LiveRole, RoleDescriptor, RoleEntry, RoleGroup, ServerState};
pub use reconcile::{
    MemberRoleChanges, PruneReport, StaleEntry, member_role_changes, new_entry_for,
    prune_stale_roles, resolve_live_entries, stale_entries, update_roles_from_reality,
    validate_from_api_role,
};
pub use repository::ServerStateStore;
