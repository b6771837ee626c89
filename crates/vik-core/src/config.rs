//! Bot configuration model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ids::ServerId;
use crate::role::model::ServerState;

fn default_bot_name() -> String {
    "VIKBOT".to_string()
}

fn default_embed_color() -> u32 {
    0x03FCC2
}

fn default_session_ttl_minutes() -> u32 {
    14
}

fn default_menu_limit() -> usize {
    25
}

/// Tunables of the role selector module.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RoleSelectorSettings {
    /// Editing sessions (and their messages) live this long after the last write.
    #[serde(default = "default_session_ttl_minutes")]
    pub session_ttl_minutes: u32,
    /// Upper bound for select menu sizes.
    #[serde(default = "default_menu_limit")]
    pub max_menu_options: usize,
    #[serde(default = "default_menu_limit")]
    pub autocomplete_limit: usize,
}

impl RoleSelectorSettings {
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.session_ttl_minutes))
    }

    pub fn deletion_warning(&self) -> String {
        format!(
            "This message is deleted after {} minutes as the interaction expires.",
            self.session_ttl_minutes
        )
    }
}

impl Default for RoleSelectorSettings {
    fn default() -> Self {
        Self {
            session_ttl_minutes: default_session_ttl_minutes(),
            max_menu_options: default_menu_limit(),
            autocomplete_limit: default_menu_limit(),
        }
    }
}

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
    #[serde(default = "default_embed_color")]
    pub embed_color: u32,
    #[serde(default)]
    pub role_selector: RoleSelectorSettings,
    #[serde(default)]
    pub servers: BTreeMap<ServerId, ServerState>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bot_name: default_bot_name(),
            embed_color: default_embed_color(),
            role_selector: RoleSelectorSettings::default(),
            servers: BTreeMap::new(),
        }
    }
}
