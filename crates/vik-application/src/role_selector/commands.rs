//! Slash commands of the `roleselector` group and their autocompletion.

use super::view::{self, LooksEditorFrame};
use super::{
    CMD_ADD, CMD_DELETE, CMD_EDIT_CHOICES, CMD_EDIT_LOOKS, CMD_LIST, CMD_PRUNE, CMD_PUBLISH,
    GROUP_OPTION, MENU_OPTION_LIMIT, RoleSelector,
};
use crate::router::{AutocompleteProvider, CommandHandler};
use async_trait::async_trait;
use vik_core::error::{Result, VikError};
use vik_core::event::{AutocompleteEvent, CommandEvent};
use vik_core::message::OutboundMessage;
use vik_core::role::{RoleGroup, prune_stale_roles, resolve_live_entries};
use vik_core::session::Session;

#[async_trait]
impl CommandHandler for RoleSelector {
    async fn handle_command(&self, event: &CommandEvent) -> Result<()> {
        match event.command.as_str() {
            CMD_ADD => self.add_group(event).await,
            CMD_DELETE => self.delete_group(event).await,
            CMD_LIST => self.list_groups(event).await,
            CMD_EDIT_CHOICES => self.open_choices_editor(event).await,
            CMD_EDIT_LOOKS => self.open_looks_editor(event).await,
            CMD_PUBLISH => self.publish_group(event).await,
            CMD_PRUNE => self.prune_groups(event).await,
            other => Err(VikError::internal(format!(
                "role selector has no command '{}'",
                other
            ))),
        }
    }
}

#[async_trait]
impl AutocompleteProvider for RoleSelector {
    async fn choices(&self, event: &AutocompleteEvent) -> Result<Vec<String>> {
        let Some(server) = event.context.server else {
            return Ok(Vec::new());
        };
        let Some(state) = self.state.server(server).await else {
            return Ok(Vec::new());
        };

        let prefix = event.focused.trim();
        let limit = self.settings.autocomplete_limit.min(MENU_OPTION_LIMIT);
        Ok(state
            .group_names()
            .filter(|name| prefix.is_empty() || name.starts_with(prefix))
            .take(limit)
            .map(str::to_string)
            .collect())
    }
}

impl RoleSelector {
    async fn add_group(&self, event: &CommandEvent) -> Result<()> {
        let server = event.context.require_server()?;
        let name = event.required_option(GROUP_OPTION)?;

        self.state
            .mutate_server(server, |state| {
                state.groups.entry(name.to_string()).or_insert_with(RoleGroup::new);
                Ok(())
            })
            .await?;
        tracing::info!(server = %server, group = %name, "role group created");

        self.messages
            .reply(
                event.context.interaction,
                OutboundMessage::text(format!("{} group created!", name)),
            )
            .await?;
        Ok(())
    }

    async fn delete_group(&self, event: &CommandEvent) -> Result<()> {
        let server = event.context.require_server()?;
        let name = event.required_option(GROUP_OPTION)?;

        let removed = self
            .state
            .mutate_server(server, |state| Ok(state.groups.remove(name).is_some()))
            .await?;

        let reply = if removed {
            tracing::info!(server = %server, group = %name, "role group removed");
            OutboundMessage::text(format!("{} has been removed", name))
        } else {
            OutboundMessage::ephemeral(format!("{} does not exist", name))
        };
        self.messages.reply(event.context.interaction, reply).await?;
        Ok(())
    }

    async fn list_groups(&self, event: &CommandEvent) -> Result<()> {
        let server = event.context.require_server()?;
        let groups = self
            .state
            .server(server)
            .await
            .map(|state| state.groups)
            .unwrap_or_default();

        let content = if groups.is_empty() {
            "server has no groups".to_string()
        } else {
            let live = self.directory.live_roles(server).await?;
            groups
                .iter()
                .map(|(name, group)| {
                    let lines: Vec<String> = resolve_live_entries(group, &live)
                        .iter()
                        .map(view::list_line)
                        .collect();
                    format!("**__{}__**\n\t{}", name, lines.join("\n\t"))
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        self.messages
            .reply(event.context.interaction, OutboundMessage::text(content))
            .await?;
        Ok(())
    }

    async fn open_choices_editor(&self, event: &CommandEvent) -> Result<()> {
        let server = event.context.require_server()?;
        let name = event.required_option(GROUP_OPTION)?;
        self.group(server, name).await?;

        let message = self
            .messages
            .reply(
                event.context.interaction,
                view::choices_editor_view(&self.deletion_warning(), name),
            )
            .await?;
        self.sessions.set(message, Session::editor(name));
        tracing::debug!(message_id = %message, group = %name, "choices editor opened");
        Ok(())
    }

    async fn open_looks_editor(&self, event: &CommandEvent) -> Result<()> {
        let server = event.context.require_server()?;
        event.context.require_channel()?;
        let name = event.required_option(GROUP_OPTION)?;
        let group = self.group(server, name).await?;
        if group.is_empty() {
            return Err(VikError::not_found("roles of group", name));
        }

        let warning = self.deletion_warning();
        let frame = LooksEditorFrame {
            warning: &warning,
            bot_name: &self.bot_name,
            embed_color: self.embed_color,
            group_name: name,
        };
        let message = self
            .messages
            .reply(
                event.context.interaction,
                view::looks_editor_view(&frame, &group.roles, 0),
            )
            .await?;
        self.sessions.set(message, Session::looks_editor(name));
        tracing::debug!(message_id = %message, group = %name, "looks editor opened");
        Ok(())
    }

    async fn publish_group(&self, event: &CommandEvent) -> Result<()> {
        let server = event.context.require_server()?;
        let channel = event.context.require_channel()?;
        let name = event.required_option(GROUP_OPTION)?;
        let group = self.group(server, name).await?;
        let live = self.directory.live_roles(server).await?;
        let entries = resolve_live_entries(&group, &live);

        let menu = view::published_menu(name, &entries, &group, self.settings.max_menu_options);
        self.messages
            .send(channel, OutboundMessage::default().with_component(menu))
            .await?;
        tracing::info!(server = %server, channel = %channel, group = %name, "role menu published");

        self.messages
            .reply(
                event.context.interaction,
                OutboundMessage::ephemeral(format!("{} published!", name)),
            )
            .await?;
        Ok(())
    }

    async fn prune_groups(&self, event: &CommandEvent) -> Result<()> {
        let live = self.directory.snapshot().await?;
        let report = self
            .state
            .mutate(|servers| Ok(prune_stale_roles(servers, &live)))
            .await?;
        tracing::info!(
            removed = report.removed_count(),
            skipped_servers = report.skipped_servers.len(),
            "role groups pruned"
        );

        self.messages
            .reply(
                event.context.interaction,
                OutboundMessage::ephemeral("groups pruned!"),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role_selector::test_support::{CHANNEL, SERVER, command, context, fixture};
    use crate::role_selector::{EDIT_CHOICES_ID, EDIT_LOOKS_LEFT, PUBLISHED_MENU_PREFIX};
    use vik_core::event::EventContext;
    use vik_core::ids::{InteractionId, RoleId, UserId};
    use vik_core::message::Component;
    use vik_core::role::LiveRole;
    use vik_infrastructure::MessageEffect;

    fn reply_text(fixture: &crate::role_selector::test_support::Fixture) -> (String, bool) {
        let (_, reply) = fixture.messages.last_reply().unwrap();
        (reply.content, reply.ephemeral)
    }

    #[tokio::test]
    async fn test_add_and_delete_group() {
        let fx = fixture().await;

        fx.selector.handle_command(&command(CMD_ADD, Some("games"))).await.unwrap();
        assert_eq!(reply_text(&fx), ("games group created!".to_string(), false));
        assert!(fx.state.server(SERVER).await.unwrap().group("games").is_some());

        fx.selector.handle_command(&command(CMD_DELETE, Some("games"))).await.unwrap();
        assert_eq!(reply_text(&fx), ("games has been removed".to_string(), false));

        fx.selector.handle_command(&command(CMD_DELETE, Some("games"))).await.unwrap();
        assert_eq!(reply_text(&fx), ("games does not exist".to_string(), true));
        assert_eq!(fx.store.save_count(), 3);
    }

    #[tokio::test]
    async fn test_add_keeps_existing_group() {
        let fx = fixture().await;
        fx.selector.handle_command(&command(CMD_ADD, Some("colors"))).await.unwrap();
        let state = fx.state.server(SERVER).await.unwrap();
        assert_eq!(state.group("colors").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_renders_live_entries() {
        let fx = fixture().await;
        fx.directory.set_roles(SERVER, vec![LiveRole::new(RoleId(11), "azure")]);

        fx.selector.handle_command(&command(CMD_LIST, None)).await.unwrap();

        let (content, _) = reply_text(&fx);
        assert_eq!(
            content,
            "**__colors__**\n\t**azure** 🔵\n\t\t(Blue \\|\\| Blue role)"
        );
    }

    #[tokio::test]
    async fn test_list_without_groups() {
        let fx = fixture().await;
        fx.selector.handle_command(&command(CMD_DELETE, Some("colors"))).await.unwrap();
        fx.selector.handle_command(&command(CMD_LIST, None)).await.unwrap();
        assert_eq!(reply_text(&fx).0, "server has no groups");
    }

    #[tokio::test]
    async fn test_editchoices_creates_editor_session() {
        let fx = fixture().await;

        fx.selector
            .handle_command(&command(CMD_EDIT_CHOICES, Some("colors")))
            .await
            .unwrap();

        let (message, reply) = fx.messages.last_reply().unwrap();
        assert!(reply.content.ends_with("\nEditing: colors"));
        assert!(reply.content.starts_with("This message is deleted after 14 minutes"));
        assert!(matches!(
            &reply.components[0],
            Component::RoleSelect { custom_id, min_values: 0, max_values: 25 } if custom_id == EDIT_CHOICES_ID
        ));
        assert_eq!(fx.selector.sessions().get(&message), Some(Session::editor("colors")));
    }

    #[tokio::test]
    async fn test_editchoices_unknown_group() {
        let fx = fixture().await;
        let err = fx
            .selector
            .handle_command(&command(CMD_EDIT_CHOICES, Some("nope")))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(fx.selector.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_editlooks_opens_first_page() {
        let fx = fixture().await;

        fx.selector
            .handle_command(&command(CMD_EDIT_LOOKS, Some("colors")))
            .await
            .unwrap();

        let (message, reply) = fx.messages.last_reply().unwrap();
        assert_eq!(reply.components[0].custom_id(), EDIT_LOOKS_LEFT);
        assert_eq!(reply.components[0].is_disabled(), Some(true));
        assert_eq!(reply.components[1].is_disabled(), Some(false));
        assert_eq!(
            fx.selector.sessions().get(&message),
            Some(Session::looks_editor("colors"))
        );
    }

    #[tokio::test]
    async fn test_editlooks_requires_channel_and_roles() {
        let fx = fixture().await;
        let outside = CommandEvent::new(EventContext::new(InteractionId(1), UserId(2)), CMD_EDIT_LOOKS)
            .with_option(GROUP_OPTION, "colors");
        assert!(fx.selector.handle_command(&outside).await.unwrap_err().is_invalid_context());

        fx.selector.handle_command(&command(CMD_ADD, Some("empty"))).await.unwrap();
        let err = fx
            .selector
            .handle_command(&command(CMD_EDIT_LOOKS, Some("empty")))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(fx.selector.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_publish_sends_menu_to_channel() {
        let fx = fixture().await;

        fx.selector
            .handle_command(&command(CMD_PUBLISH, Some("colors")))
            .await
            .unwrap();

        let effects = fx.messages.effects();
        let MessageEffect::Send { channel, message, .. } = &effects[0] else {
            panic!("expected the menu to be sent first");
        };
        assert_eq!(*channel, CHANNEL);
        assert_eq!(
            message.components[0].custom_id(),
            format!("{}:colors", PUBLISHED_MENU_PREFIX)
        );
        assert_eq!(reply_text(&fx), ("colors published!".to_string(), true));
    }

    #[tokio::test]
    async fn test_prune_drops_deleted_roles() {
        let fx = fixture().await;
        fx.directory.set_roles(SERVER, vec![LiveRole::new(RoleId(10), "red")]);

        fx.selector.handle_command(&command(CMD_PRUNE, None)).await.unwrap();

        let group = fx.state.server(SERVER).await.unwrap().group("colors").cloned().unwrap();
        assert_eq!(group.len(), 1);
        assert!(group.contains(RoleId(10)));
        assert_eq!(reply_text(&fx), ("groups pruned!".to_string(), true));
    }

    #[tokio::test]
    async fn test_autocomplete() {
        let fx = fixture().await;
        fx.selector.handle_command(&command(CMD_ADD, Some("games"))).await.unwrap();
        fx.selector.handle_command(&command(CMD_ADD, Some("gaming"))).await.unwrap();

        let mut event = AutocompleteEvent {
            context: context(),
            command: CMD_EDIT_LOOKS.to_string(),
            option: GROUP_OPTION.to_string(),
            focused: "gam".to_string(),
        };
        assert_eq!(fx.selector.choices(&event).await.unwrap(), vec!["games", "gaming"]);

        event.focused = "  ".to_string();
        assert_eq!(
            fx.selector.choices(&event).await.unwrap(),
            vec!["colors", "games", "gaming"]
        );

        event.context = EventContext::new(InteractionId(1), UserId(2));
        assert!(fx.selector.choices(&event).await.unwrap().is_empty());
    }
}
