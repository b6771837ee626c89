//! Inbound events delivered by the gateway adapter.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::emoji::Emoji;
use crate::error::{Result, VikError};
use crate::ids::{ChannelId, InteractionId, MessageId, RoleId, ServerId, UserId};

/// Who acted, where, and how to answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    pub interaction: InteractionId,
    pub actor: UserId,
    #[serde(default)]
    pub server: Option<ServerId>,
    #[serde(default)]
    pub channel: Option<ChannelId>,
}

impl EventContext {
    pub fn new(interaction: InteractionId, actor: UserId) -> Self {
        Self {
            interaction,
            actor,
            server: None,
            channel: None,
        }
    }

    pub fn in_server(mut self, server: ServerId, channel: ChannelId) -> Self {
        self.server = Some(server);
        self.channel = Some(channel);
        self
    }

    pub fn require_server(&self) -> Result<ServerId> {
        self.server
            .ok_or_else(|| VikError::invalid_context("interaction outside of a server"))
    }

    pub fn require_channel(&self) -> Result<ChannelId> {
        self.channel
            .ok_or_else(|| VikError::invalid_context("interaction outside of a text channel"))
    }
}

/// A slash command invocation, e.g. `roleselector editlooks name:colors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEvent {
    pub context: EventContext,
    /// Full command path, space separated.
    pub command: String,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl CommandEvent {
    pub fn new(context: EventContext, command: impl Into<String>) -> Self {
        Self {
            context,
            command: command.into(),
            options: BTreeMap::new(),
        }
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    pub fn required_option(&self, name: &str) -> Result<&str> {
        self.option(name)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| VikError::malformed(format!("missing option '{}'", name)))
    }
}

/// A request for option suggestions while the user is typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteEvent {
    pub context: EventContext,
    pub command: String,
    pub option: String,
    /// Text typed so far in the focused option.
    pub focused: String,
}

/// A button press or select-menu submission on a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEvent {
    pub context: EventContext,
    pub message: MessageId,
    pub custom_id: String,
    /// Selected values; role ids for role selects, option values otherwise.
    #[serde(default)]
    pub values: Vec<String>,
    /// Roles the acting member currently holds.
    #[serde(default)]
    pub member_roles: Vec<RoleId>,
}

impl ComponentEvent {
    /// Text after the first `:` of the custom id.
    pub fn argument(&self) -> Option<&str> {
        self.custom_id.split_once(':').map(|(_, rest)| rest)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalSubmitEvent {
    pub context: EventContext,
    /// The message the modal was opened from.
    pub message: MessageId,
    pub custom_id: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl ModalSubmitEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Gateway notification that a reaction was added to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionAddEvent {
    pub server: ServerId,
    pub channel: ChannelId,
    pub message: MessageId,
    pub actor: UserId,
    pub emoji: Emoji,
}
