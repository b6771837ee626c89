//! Outbound message model and the message service trait.
//!
//! These types describe what to send; turning them into platform payloads
//! is the gateway adapter's job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::emoji::Emoji;
use crate::error::Result;
use crate::ids::{ChannelId, InteractionId, MessageId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OutboundMessage {
    pub content: String,
    #[serde(default)]
    pub embeds: Vec<Embed>,
    #[serde(default)]
    pub components: Vec<Component>,
    /// Only visible to the acting user.
    #[serde(default)]
    pub ephemeral: bool,
}

impl OutboundMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self::text(content).hidden()
    }

    pub fn hidden(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    pub fn with_embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_components(mut self, components: impl IntoIterator<Item = Component>) -> Self {
        self.components.extend(components);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Embed {
    pub author: Option<String>,
    pub color: u32,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonStyle {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    pub description: String,
    pub emoji: Option<Emoji>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Component {
    Button {
        custom_id: String,
        label: Option<String>,
        emoji: Option<Emoji>,
        style: ButtonStyle,
        disabled: bool,
    },
    /// Multi-select over the server's roles.
    RoleSelect {
        custom_id: String,
        min_values: u8,
        max_values: u8,
    },
    StringSelect {
        custom_id: String,
        options: Vec<SelectOption>,
        min_values: u8,
        max_values: u8,
    },
}

impl Component {
    pub fn custom_id(&self) -> &str {
        match self {
            Component::Button { custom_id, .. }
            | Component::RoleSelect { custom_id, .. }
            | Component::StringSelect { custom_id, .. } => custom_id,
        }
    }

    /// `None` for anything that is not a button.
    pub fn is_disabled(&self) -> Option<bool> {
        match self {
            Component::Button { disabled, .. } => Some(*disabled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextInput {
    pub custom_id: String,
    pub label: String,
    pub value: String,
    pub multiline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modal {
    pub custom_id: String,
    pub title: String,
    pub inputs: Vec<TextInput>,
}

/// Sends, edits and deletes messages on behalf of the bot.
///
/// Every call is a network effect the core does not retry.
#[async_trait]
pub trait MessageService: Send + Sync {
    /// Answers an interaction and returns the id of the reply message.
    async fn reply(&self, interaction: InteractionId, message: OutboundMessage)
    -> Result<MessageId>;

    async fn send(&self, channel: ChannelId, message: OutboundMessage) -> Result<MessageId>;

    async fn edit(&self, message: MessageId, update: OutboundMessage) -> Result<()>;

    async fn delete(&self, message: MessageId) -> Result<()>;

    async fn show_modal(&self, interaction: InteractionId, modal: Modal) -> Result<()>;

    /// Answers an autocomplete request.
    async fn suggest(&self, interaction: InteractionId, choices: Vec<String>) -> Result<()>;
}
