//! Editing flow: what happens when someone interacts with an editor message
//! or a published menu.

use super::view::{self, LooksEditorFrame};
use super::{
    DESCRIPTION_FIELD, EDIT_CHOICES_ID, EDIT_LOOKS_LEFT, EDIT_LOOKS_MODAL, EDIT_LOOKS_MODIFY,
    EDIT_LOOKS_RIGHT, FULL_NAME_FIELD, PUBLISHED_MENU_PREFIX, RoleSelector,
};
use crate::router::{ComponentHandler, ModalHandler, ReactionHandler, custom_id_prefix};
use async_trait::async_trait;
use vik_core::error::{Result, VikError};
use vik_core::event::{ComponentEvent, ModalSubmitEvent, ReactionAddEvent};
use vik_core::ids::{MessageId, RoleId};
use vik_core::message::{Modal, OutboundMessage, TextInput};
use vik_core::role::{
    LiveRole, RoleEntry, RoleGroup, member_role_changes, update_roles_from_reality,
};
use vik_core::session::{EditorSession, LooksEditorSession, PageDirection, Session};

#[async_trait]
impl ComponentHandler for RoleSelector {
    async fn handle_component(&self, event: &ComponentEvent) -> Result<()> {
        match event.custom_id.as_str() {
            EDIT_CHOICES_ID => self.apply_choices(event).await,
            EDIT_LOOKS_LEFT => self.turn_page(event, PageDirection::Previous).await,
            EDIT_LOOKS_RIGHT => self.turn_page(event, PageDirection::Next).await,
            EDIT_LOOKS_MODIFY => self.open_entry_modal(event).await,
            id if custom_id_prefix(id) == PUBLISHED_MENU_PREFIX => {
                self.apply_member_selection(event).await
            }
            other => Err(VikError::internal(format!(
                "role selector has no component '{}'",
                other
            ))),
        }
    }
}

#[async_trait]
impl ModalHandler for RoleSelector {
    async fn handle_modal(&self, event: &ModalSubmitEvent) -> Result<()> {
        if event.custom_id != EDIT_LOOKS_MODAL {
            return Err(VikError::internal(format!(
                "role selector has no modal '{}'",
                event.custom_id
            )));
        }
        self.apply_entry_text(event).await
    }
}

#[async_trait]
impl ReactionHandler for RoleSelector {
    /// A reaction on a looks editor replaces the emote of the entry on screen.
    async fn handle_reaction(&self, event: &ReactionAddEvent) -> Result<()> {
        let Some(session) = self.looks_session(event.message) else {
            tracing::trace!(message_id = %event.message, "reaction outside a looks editor");
            return Ok(());
        };

        let emote = event.emoji.reaction_code();
        let roles = self
            .state
            .mutate_server(event.server, |state| {
                let entry = current_entry_mut(state.group_mut(&session.group_name), &session)?;
                entry.descriptor.emote_name = emote.clone();
                Ok(group_roles(state.group(&session.group_name)))
            })
            .await?;
        tracing::info!(
            group = %session.group_name,
            page = session.current_page,
            emote = %emote,
            "role emote updated"
        );

        self.refresh_looks_editor(event.message, &session, &roles)
            .await;
        Ok(())
    }
}

impl RoleSelector {
    fn editor_session(&self, message: MessageId) -> Result<EditorSession> {
        self.sessions
            .get(&message)
            .and_then(|session| session.as_editor().cloned())
            .ok_or_else(|| VikError::not_found("session", message.to_string()))
    }

    fn looks_session(&self, message: MessageId) -> Option<LooksEditorSession> {
        self.sessions
            .get(&message)
            .and_then(|session| session.as_looks_editor().cloned())
    }

    fn require_looks_session(&self, message: MessageId) -> Result<LooksEditorSession> {
        self.looks_session(message)
            .ok_or_else(|| VikError::not_found("session", message.to_string()))
    }

    /// Role selection submitted on a choices editor. Rebuilds the group from
    /// the selection and closes the editor.
    async fn apply_choices(&self, event: &ComponentEvent) -> Result<()> {
        let session = self.editor_session(event.message)?;
        let server = event.context.require_server()?;
        let live = self.directory.live_roles(server).await?;
        let selected = selected_live_roles(&event.values, &live);

        let size = self
            .state
            .mutate_server(server, |state| {
                let group = state
                    .group_mut(&session.group_name)
                    .ok_or_else(|| VikError::not_found("group", session.group_name.as_str()))?;
                *group = update_roles_from_reality(&selected, group);
                Ok(group.len())
            })
            .await?;
        tracing::info!(server = %server, group = %session.group_name, roles = size, "role group edited");

        // the session is gone, so nothing else will clean up the editor message
        self.sessions.remove(&event.message);
        let replied = self
            .messages
            .reply(
                event.context.interaction,
                OutboundMessage::ephemeral("edited group"),
            )
            .await;
        if let Err(err) = self.messages.delete(event.message).await {
            tracing::warn!(message_id = %event.message, error = %err, "could not delete choices editor");
        }
        replied.map(|_| ())
    }

    async fn turn_page(&self, event: &ComponentEvent, direction: PageDirection) -> Result<()> {
        let session = self.require_looks_session(event.message)?;
        let server = event.context.require_server()?;
        let group = self.group(server, &session.group_name).await?;
        if group.is_empty() {
            return Err(VikError::not_found("roles of group", session.group_name.as_str()));
        }

        let next = session.turn(direction, group.len());
        self.sessions
            .set(event.message, Session::LooksEditor(next.clone()));
        self.refresh_looks_editor(event.message, &next, &group.roles)
            .await;
        Ok(())
    }

    async fn open_entry_modal(&self, event: &ComponentEvent) -> Result<()> {
        let session = self.require_looks_session(event.message)?;
        let server = event.context.require_server()?;
        let group = self.group(server, &session.group_name).await?;
        let entry = current_entry(&group, &session)?;

        let modal = Modal {
            custom_id: EDIT_LOOKS_MODAL.to_string(),
            title: format!("Edit {}", entry.descriptor.api_name),
            inputs: vec![
                TextInput {
                    custom_id: FULL_NAME_FIELD.to_string(),
                    label: "Name".to_string(),
                    value: entry.descriptor.full_name.clone(),
                    multiline: false,
                },
                TextInput {
                    custom_id: DESCRIPTION_FIELD.to_string(),
                    label: "Description".to_string(),
                    value: entry.descriptor.description.clone(),
                    multiline: true,
                },
            ],
        };
        self.messages
            .show_modal(event.context.interaction, modal)
            .await
    }

    async fn apply_entry_text(&self, event: &ModalSubmitEvent) -> Result<()> {
        let session = self.require_looks_session(event.message)?;
        let server = event.context.require_server()?;
        let full_name = event.field(FULL_NAME_FIELD).map(str::to_string);
        let description = event.field(DESCRIPTION_FIELD).map(str::to_string);

        let roles = self
            .state
            .mutate_server(server, |state| {
                let entry = current_entry_mut(state.group_mut(&session.group_name), &session)?;
                if let Some(full_name) = full_name {
                    entry.descriptor.full_name = full_name;
                }
                if let Some(description) = description {
                    entry.descriptor.description = description;
                }
                Ok(group_roles(state.group(&session.group_name)))
            })
            .await?;
        tracing::info!(group = %session.group_name, page = session.current_page, "role text updated");

        self.refresh_looks_editor(event.message, &session, &roles)
            .await;
        self.messages
            .reply(
                event.context.interaction,
                OutboundMessage::ephemeral("entry updated"),
            )
            .await?;
        Ok(())
    }

    /// A member submitted a published menu.
    async fn apply_member_selection(&self, event: &ComponentEvent) -> Result<()> {
        let target = match (event.context.server, event.argument()) {
            (Some(server), Some(name)) => self
                .state
                .server(server)
                .await
                .and_then(|state| state.group(name).cloned())
                .map(|group| (server, group)),
            _ => None,
        };
        let Some((server, group)) = target else {
            tracing::warn!(custom_id = %event.custom_id, "published menu without server or group");
            self.messages
                .reply(
                    event.context.interaction,
                    OutboundMessage::ephemeral("action failed!"),
                )
                .await?;
            return Ok(());
        };

        let live = self.directory.live_roles(server).await?;
        let selected: Vec<RoleId> = event
            .values
            .iter()
            .filter_map(|value| value.parse().ok())
            .collect();
        let changes = member_role_changes(&group, &live, &selected, &event.member_roles);
        self.directory
            .modify_member_roles(server, event.context.actor, &changes.add, &changes.remove)
            .await?;
        tracing::debug!(
            member = %event.context.actor,
            added = changes.add.len(),
            removed = changes.remove.len(),
            "member roles updated"
        );

        self.messages
            .reply(
                event.context.interaction,
                OutboundMessage::ephemeral("update successful!"),
            )
            .await?;
        Ok(())
    }

    /// Re-renders a looks editor. Failing edits are only logged; the stored
    /// state is already committed.
    async fn refresh_looks_editor(
        &self,
        message: MessageId,
        session: &LooksEditorSession,
        roles: &[RoleEntry],
    ) {
        if session.current_page >= roles.len() {
            tracing::debug!(message_id = %message, "looks editor page vanished, not re-rendering");
            return;
        }
        let warning = self.deletion_warning();
        let frame = LooksEditorFrame {
            warning: &warning,
            bot_name: &self.bot_name,
            embed_color: self.embed_color,
            group_name: &session.group_name,
        };
        let update = view::looks_editor_view(&frame, roles, session.current_page);
        if let Err(err) = self.messages.edit(message, update).await {
            tracing::warn!(message_id = %message, error = %err, "could not update looks editor");
        }
    }
}

/// Selected values as live roles, in selection order. Values that are not a
/// live role of the server are ignored.
fn selected_live_roles(values: &[String], live: &[LiveRole]) -> Vec<LiveRole> {
    values
        .iter()
        .filter_map(|value| value.parse::<RoleId>().ok())
        .filter_map(|id| live.iter().find(|role| role.id == id).cloned())
        .collect()
}

fn current_entry<'a>(group: &'a RoleGroup, session: &LooksEditorSession) -> Result<&'a RoleEntry> {
    group
        .roles
        .get(session.current_page)
        .ok_or_else(|| VikError::not_found("role entry", session.current_page.to_string()))
}

fn current_entry_mut<'a>(
    group: Option<&'a mut RoleGroup>,
    session: &LooksEditorSession,
) -> Result<&'a mut RoleEntry> {
    group
        .ok_or_else(|| VikError::not_found("group", session.group_name.as_str()))?
        .roles
        .get_mut(session.current_page)
        .ok_or_else(|| VikError::not_found("role entry", session.current_page.to_string()))
}

fn group_roles(group: Option<&RoleGroup>) -> Vec<RoleEntry> {
    group.map(|group| group.roles.clone()).unwrap_or_default()
}
