//! Time-bounded session storage and its background maintenance.

pub mod expiring;
pub mod scheduler;

pub use expiring::{CacheEntry, ExpireHandler, ExpiringCache};
pub use scheduler::{Maintenance, MaintenanceHandle, MaintenanceScheduler};
