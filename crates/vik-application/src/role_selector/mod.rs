//! Role selector: admin commands for curating role groups, the interactive
//! editors behind them and the published self-service menus.
//!
//! Every editor reply is tracked in a session cache keyed by its message id.
//! Sessions expire a fixed time after their last write, and the expired
//! editor message is deleted.

mod commands;
mod expiry;
mod flow;
mod view;

pub use expiry::SessionExpiry;
pub use view::{LooksEditorFrame, looks_editor_view, published_menu};

use crate::cache::{ExpireHandler, ExpiringCache, MaintenanceScheduler};
use crate::router::EventRouter;
use crate::server_state::ServerStateService;
use std::sync::Arc;
use vik_core::config::{BotConfig, RoleSelectorSettings};
use vik_core::error::{Result, VikError};
use vik_core::ids::{MessageId, ServerId};
use vik_core::message::MessageService;
use vik_core::role::{RoleDirectory, RoleGroup};
use vik_core::session::Session;
use vik_core::time::{Clock, SystemClock};

pub const COMMAND_GROUP: &str = "roleselector";
pub const GROUP_OPTION: &str = "name";

pub const CMD_ADD: &str = "roleselector add";
pub const CMD_DELETE: &str = "roleselector delete";
pub const CMD_LIST: &str = "roleselector list";
pub const CMD_EDIT_CHOICES: &str = "roleselector editchoices";
pub const CMD_EDIT_LOOKS: &str = "roleselector editlooks";
pub const CMD_PUBLISH: &str = "roleselector publish";
pub const CMD_PRUNE: &str = "roleselector prune";

pub const EDIT_CHOICES_ID: &str = "rolegroupeditchoices";
pub const EDIT_LOOKS_PREFIX: &str = "rolegroupeditlooks";
pub const EDIT_LOOKS_LEFT: &str = "rolegroupeditlooks:left";
pub const EDIT_LOOKS_RIGHT: &str = "rolegroupeditlooks:right";
pub const EDIT_LOOKS_MODIFY: &str = "rolegroupeditlooks:modify";
pub const EDIT_LOOKS_MODAL: &str = "rolegroupeditlooks:modal";
pub const PUBLISHED_MENU_PREFIX: &str = "publishedrolemenu";

pub const FULL_NAME_FIELD: &str = "full_name";
pub const DESCRIPTION_FIELD: &str = "description";

/// Upper bound of options a select menu can carry.
pub const MENU_OPTION_LIMIT: usize = 25;

pub type SessionCache = ExpiringCache<MessageId, Session>;

/// Commands whose `name` option autocompletes to a group of the server.
const GROUP_NAME_COMMANDS: [&str; 4] = [CMD_DELETE, CMD_EDIT_CHOICES, CMD_EDIT_LOOKS, CMD_PUBLISH];

pub struct RoleSelector {
    state: Arc<ServerStateService>,
    directory: Arc<dyn RoleDirectory>,
    messages: Arc<dyn MessageService>,
    sessions: Arc<SessionCache>,
    settings: RoleSelectorSettings,
    bot_name: String,
    embed_color: u32,
}

impl RoleSelector {
    pub fn new(
        config: &BotConfig,
        state: Arc<ServerStateService>,
        directory: Arc<dyn RoleDirectory>,
        messages: Arc<dyn MessageService>,
    ) -> Self {
        Self::with_clock(config, state, directory, messages, Arc::new(SystemClock))
    }

    /// Same as [`RoleSelector::new`] with the session clock supplied.
    pub fn with_clock(
        config: &BotConfig,
        state: Arc<ServerStateService>,
        directory: Arc<dyn RoleDirectory>,
        messages: Arc<dyn MessageService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let sessions = Arc::new(ExpiringCache::with_clock(
            config.role_selector.session_ttl(),
            clock,
        ));
        Self {
            state,
            directory,
            messages,
            sessions,
            settings: config.role_selector.clone(),
            bot_name: config.bot_name.clone(),
            embed_color: config.embed_color,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionCache> {
        &self.sessions
    }

    /// Handler deleting the editor message of an evicted session.
    pub fn expiry_handler(&self) -> Arc<dyn ExpireHandler<MessageId, Session>> {
        Arc::new(SessionExpiry::new(self.messages.clone()))
    }

    /// Registers every command, component, modal and reaction handler on
    /// `router` and starts sweeping the session cache.
    ///
    /// Must be called inside a tokio runtime.
    pub fn install(self: &Arc<Self>, router: &mut EventRouter) {
        for command in [
            CMD_ADD,
            CMD_DELETE,
            CMD_LIST,
            CMD_EDIT_CHOICES,
            CMD_EDIT_LOOKS,
            CMD_PUBLISH,
            CMD_PRUNE,
        ] {
            router.register_command(command, self.clone());
        }
        for command in GROUP_NAME_COMMANDS {
            router.register_autocomplete(command, self.clone());
        }
        router.register_component(EDIT_CHOICES_ID, self.clone());
        router.register_component(EDIT_LOOKS_PREFIX, self.clone());
        router.register_component(PUBLISHED_MENU_PREFIX, self.clone());
        router.register_modal(EDIT_LOOKS_PREFIX, self.clone());
        router.register_reaction(self.clone());

        let handle =
            MaintenanceScheduler::spawn_default(self.sessions.clone(), self.expiry_handler());
        router.register_maintenance(handle);
        tracing::info!(
            ttl_minutes = self.settings.session_ttl_minutes,
            "role selector installed"
        );
    }

    fn deletion_warning(&self) -> String {
        self.settings.deletion_warning()
    }

    /// The group as committed, or NotFound.
    async fn group(&self, server: ServerId, name: &str) -> Result<RoleGroup> {
        self.state
            .server(server)
            .await
            .and_then(|state| state.group(name).cloned())
            .ok_or_else(|| VikError::not_found("group", name))
    }
}
