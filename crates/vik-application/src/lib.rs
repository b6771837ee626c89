//! Application layer for VIKBOT.
//!
//! Wires the domain model to its collaborators: the expiring session cache
//! and its scheduler, the shared server state, the event router and the
//! role selector module built on top of them.

pub mod cache;
pub mod role_selector;
pub mod router;
pub mod server_state;

pub use cache::{ExpireHandler, ExpiringCache, MaintenanceHandle, MaintenanceScheduler};
pub use role_selector::RoleSelector;
pub use router::EventRouter;
pub use server_state::ServerStateService;
