//! Persistence, configuration and in-memory collaborators for VIKBOT.

pub mod config_service;
pub mod memory_server_state_store;
pub mod paths;
pub mod recording_message_service;
pub mod static_role_directory;
pub mod storage;
pub mod toml_server_state_store;

pub use crate::config_service::ConfigService;
pub use crate::memory_server_state_store::InMemoryServerStateStore;
pub use crate::recording_message_service::{MessageEffect, RecordingMessageService};
pub use crate::static_role_directory::{MemberRoleUpdate, StaticRoleDirectory};
pub use crate::toml_server_state_store::TomlServerStateStore;
