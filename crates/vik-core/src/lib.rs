//! Domain layer for VIKBOT's role selector.
//!
//! Holds the role group model and its reconciliation against the live role
//! directory, the editing session variants, inbound/outbound message types
//! and the traits of the external collaborators.

pub mod config;
pub mod emoji;
pub mod error;
pub mod event;
pub mod ids;
pub mod message;
pub mod role;
pub mod session;
pub mod time;

pub use error::{Result, VikError};
pub use ids::{ChannelId, InteractionId, MessageId, RoleId, ServerId, UserId};
