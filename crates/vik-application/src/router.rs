//! Routing of inbound events to registered handlers.
//!
//! Handler errors never escape a `dispatch_*` call. User-facing errors are
//! answered with an ephemeral reply, everything else is logged.

use crate::cache::MaintenanceHandle;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use vik_core::error::{Result, VikError};
use vik_core::event::{
    AutocompleteEvent, CommandEvent, ComponentEvent, EventContext, ModalSubmitEvent,
    ReactionAddEvent,
};
use vik_core::message::{MessageService, OutboundMessage};

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle_command(&self, event: &CommandEvent) -> Result<()>;
}

/// Supplies choices for a command option while the user types.
#[async_trait]
pub trait AutocompleteProvider: Send + Sync {
    async fn choices(&self, event: &AutocompleteEvent) -> Result<Vec<String>>;
}

#[async_trait]
pub trait ComponentHandler: Send + Sync {
    async fn handle_component(&self, event: &ComponentEvent) -> Result<()>;
}

#[async_trait]
pub trait ModalHandler: Send + Sync {
    async fn handle_modal(&self, event: &ModalSubmitEvent) -> Result<()>;
}

#[async_trait]
pub trait ReactionHandler: Send + Sync {
    async fn handle_reaction(&self, event: &ReactionAddEvent) -> Result<()>;
}

/// Runs once when the host shuts down, after the maintenance drain.
#[async_trait]
pub trait ShutdownHook: Send + Sync {
    async fn on_shutdown(&self);
}

/// Component and modal ids are routed on the text before the first ':'.
pub fn custom_id_prefix(custom_id: &str) -> &str {
    custom_id
        .split_once(':')
        .map_or(custom_id, |(prefix, _)| prefix)
}

pub struct EventRouter {
    messages: Arc<dyn MessageService>,
    commands: HashMap<String, Arc<dyn CommandHandler>>,
    autocomplete: HashMap<String, Arc<dyn AutocompleteProvider>>,
    components: HashMap<String, Arc<dyn ComponentHandler>>,
    modals: HashMap<String, Arc<dyn ModalHandler>>,
    reactions: Vec<Arc<dyn ReactionHandler>>,
    maintenance: Vec<MaintenanceHandle>,
    shutdown_hooks: Vec<Arc<dyn ShutdownHook>>,
    shut_down: AtomicBool,
}

impl EventRouter {
    pub fn new(messages: Arc<dyn MessageService>) -> Self {
        Self {
            messages,
            commands: HashMap::new(),
            autocomplete: HashMap::new(),
            components: HashMap::new(),
            modals: HashMap::new(),
            reactions: Vec::new(),
            maintenance: Vec::new(),
            shutdown_hooks: Vec::new(),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Registers `handler` for a full command path such as `"roleselector add"`.
    pub fn register_command(&mut self, command: impl Into<String>, handler: Arc<dyn CommandHandler>) {
        let command = command.into();
        if self.commands.insert(command.clone(), handler).is_some() {
            tracing::warn!(command = %command, "command handler replaced");
        }
    }

    pub fn register_autocomplete(
        &mut self,
        command: impl Into<String>,
        provider: Arc<dyn AutocompleteProvider>,
    ) {
        self.autocomplete.insert(command.into(), provider);
    }

    pub fn register_component(&mut self, prefix: impl Into<String>, handler: Arc<dyn ComponentHandler>) {
        let prefix = prefix.into();
        if self.components.insert(prefix.clone(), handler).is_some() {
            tracing::warn!(prefix = %prefix, "component handler replaced");
        }
    }

    pub fn register_modal(&mut self, prefix: impl Into<String>, handler: Arc<dyn ModalHandler>) {
        self.modals.insert(prefix.into(), handler);
    }

    pub fn register_reaction(&mut self, handler: Arc<dyn ReactionHandler>) {
        self.reactions.push(handler);
    }

    pub fn register_maintenance(&mut self, handle: MaintenanceHandle) {
        self.maintenance.push(handle);
    }

    pub fn register_shutdown_hook(&mut self, hook: Arc<dyn ShutdownHook>) {
        self.shutdown_hooks.push(hook);
    }

    pub fn commands(&self) -> Vec<&str> {
        let mut commands: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        commands.sort_unstable();
        commands
    }

    /// Returns `false` when no handler is registered for the command.
    pub async fn dispatch_command(&self, event: &CommandEvent) -> bool {
        let Some(handler) = self.commands.get(&event.command) else {
            tracing::debug!(command = %event.command, "no handler for command");
            return false;
        };
        let outcome = handler.handle_command(event).await;
        self.recover(&event.context, &event.command, outcome).await;
        true
    }

    pub async fn dispatch_autocomplete(&self, event: &AutocompleteEvent) -> bool {
        let Some(provider) = self.autocomplete.get(&event.command) else {
            return false;
        };
        let outcome = match provider.choices(event).await {
            Ok(choices) => self.messages.suggest(event.context.interaction, choices).await,
            Err(err) => Err(err),
        };
        if let Err(err) = outcome {
            // nobody reads an error reply to a suggestion request
            tracing::debug!(command = %event.command, error = %err, "autocomplete failed");
        }
        true
    }

    pub async fn dispatch_component(&self, event: &ComponentEvent) -> bool {
        let prefix = custom_id_prefix(&event.custom_id);
        let Some(handler) = self.components.get(prefix) else {
            tracing::debug!(custom_id = %event.custom_id, "no handler for component");
            return false;
        };
        let outcome = handler.handle_component(event).await;
        self.recover(&event.context, &event.custom_id, outcome).await;
        true
    }

    pub async fn dispatch_modal(&self, event: &ModalSubmitEvent) -> bool {
        let prefix = custom_id_prefix(&event.custom_id);
        let Some(handler) = self.modals.get(prefix) else {
            tracing::debug!(custom_id = %event.custom_id, "no handler for modal");
            return false;
        };
        let outcome = handler.handle_modal(event).await;
        self.recover(&event.context, &event.custom_id, outcome).await;
        true
    }

    /// Offers the reaction to every reaction handler. Reactions carry no
    /// interaction, so failures can only be logged.
    pub async fn dispatch_reaction(&self, event: &ReactionAddEvent) {
        for handler in &self.reactions {
            match handler.handle_reaction(event).await {
                Ok(()) => {}
                Err(err) if err.is_user_facing() => {
                    tracing::debug!(message_id = %event.message, error = %err, "reaction not applied");
                }
                Err(err) => log_failure(&err, "reaction"),
            }
        }
    }

    /// Stops the maintenance tasks, drains their caches and then runs the
    /// shutdown hooks. Later calls do nothing.
    pub async fn shutdown(&self) -> usize {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return 0;
        }
        let mut drained = 0;
        for handle in &self.maintenance {
            drained += handle.shutdown().await;
        }
        for hook in &self.shutdown_hooks {
            hook.on_shutdown().await;
        }
        tracing::info!(drained, "event router shut down");
        drained
    }

    async fn recover(&self, context: &EventContext, source: &str, outcome: Result<()>) {
        let Err(err) = outcome else {
            return;
        };
        if err.is_user_facing() {
            tracing::debug!(source = %source, error = %err, "answering with failure reply");
            let reply = OutboundMessage::ephemeral(err.user_message());
            if let Err(reply_err) = self.messages.reply(context.interaction, reply).await {
                tracing::warn!(source = %source, error = %reply_err, "failure reply not delivered");
            }
        } else {
            log_failure(&err, source);
        }
    }
}

fn log_failure(err: &VikError, source: &str) {
    match err {
        VikError::InvalidContext(_) | VikError::ExternalEffect(_) => {
            tracing::warn!(source = %source, error = %err, "handler aborted");
        }
        _ => tracing::error!(source = %source, error = %err, "handler failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vik_core::emoji::Emoji;
    use vik_core::ids::{ChannelId, InteractionId, MessageId, ServerId, UserId};
    use vik_infrastructure::{MessageEffect, RecordingMessageService};

    struct Fixed(Result<()>);

    #[async_trait]
    impl CommandHandler for Fixed {
        async fn handle_command(&self, _event: &CommandEvent) -> Result<()> {
            self.0.clone()
        }
    }

    #[async_trait]
    impl ComponentHandler for Fixed {
        async fn handle_component(&self, _event: &ComponentEvent) -> Result<()> {
            self.0.clone()
        }
    }

    #[async_trait]
    impl ReactionHandler for Fixed {
        async fn handle_reaction(&self, _event: &ReactionAddEvent) -> Result<()> {
            self.0.clone()
        }
    }

    struct Seen(Arc<std::sync::atomic::AtomicUsize>);

    #[async_trait]
    impl ReactionHandler for Seen {
        async fn handle_reaction(&self, _event: &ReactionAddEvent) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn context() -> EventContext {
        EventContext::new(InteractionId(5), UserId(9))
    }

    #[test]
    fn test_custom_id_prefix() {
        assert_eq!(custom_id_prefix("rolegroupeditlooks:left"), "rolegroupeditlooks");
        assert_eq!(custom_id_prefix("publishedrolemenu:a:b"), "publishedrolemenu");
        assert_eq!(custom_id_prefix("rolegroupeditchoices"), "rolegroupeditchoices");
    }

    #[tokio::test]
    async fn test_user_facing_error_becomes_reply() {
        let messages = Arc::new(RecordingMessageService::new());
        let mut router = EventRouter::new(messages.clone());
        router.register_command(
            "roleselector editchoices",
            Arc::new(Fixed(Err(VikError::not_found("session", "1")))),
        );

        let handled = router
            .dispatch_command(&CommandEvent::new(context(), "roleselector editchoices"))
            .await;

        assert!(handled);
        let (_, reply) = messages.last_reply().unwrap();
        assert_eq!(reply.content, "failed");
        assert!(reply.ephemeral);
    }

    #[tokio::test]
    async fn test_internal_errors_are_only_logged() {
        let messages = Arc::new(RecordingMessageService::new());
        let mut router = EventRouter::new(messages.clone());
        router.register_component(
            "rolegroupeditlooks",
            Arc::new(Fixed(Err(VikError::invalid_context("no channel")))),
        );

        let event = ComponentEvent {
            context: context(),
            message: MessageId(1),
            custom_id: "rolegroupeditlooks:left".to_string(),
            values: Vec::new(),
            member_roles: Vec::new(),
        };
        assert!(router.dispatch_component(&event).await);
        assert!(messages.effects().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_routes_are_reported() {
        let messages = Arc::new(RecordingMessageService::new());
        let router = EventRouter::new(messages.clone());

        assert!(!router.dispatch_command(&CommandEvent::new(context(), "nope")).await);
        assert!(messages.effects().iter().all(|e| !matches!(e, MessageEffect::Reply { .. })));
    }

    #[tokio::test]
    async fn test_missing_page_reaction_is_quiet_and_others_still_run() {
        let seen = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let messages = Arc::new(RecordingMessageService::new());
        let mut router = EventRouter::new(messages.clone());
        router.register_reaction(Arc::new(Fixed(Err(VikError::not_found("role entry", "3")))));
        router.register_reaction(Arc::new(Seen(seen.clone())));

        router
            .dispatch_reaction(&ReactionAddEvent {
                server: ServerId(1),
                channel: ChannelId(2),
                message: MessageId(3),
                actor: UserId(9),
                emoji: Emoji::Unicode("🔥".to_string()),
            })
            .await;

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert!(messages.effects().is_empty());
    }

    struct Hook(Arc<std::sync::atomic::AtomicUsize>);

    #[async_trait]
    impl ShutdownHook for Hook {
        async fn on_shutdown(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_shutdown_hooks_run_once() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let mut router = EventRouter::new(Arc::new(RecordingMessageService::new()));
        router.register_shutdown_hook(Arc::new(Hook(calls.clone())));

        router.shutdown().await;
        router.shutdown().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
