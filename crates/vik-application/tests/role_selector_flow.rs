//! Drives the role selector through the event router the way the gateway
//! would, with in-memory collaborators.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Duration;
use vik_application::role_selector::{
    CMD_ADD, CMD_EDIT_CHOICES, CMD_EDIT_LOOKS, CMD_LIST, EDIT_CHOICES_ID, EDIT_LOOKS_RIGHT,
    GROUP_OPTION,
};
use vik_application::{EventRouter, RoleSelector, ServerStateService};
use vik_core::config::BotConfig;
use vik_core::event::{CommandEvent, ComponentEvent, EventContext};
use vik_core::ids::{ChannelId, InteractionId, MessageId, RoleId, ServerId, UserId};
use vik_core::role::{LiveRole, ServerState};
use vik_core::time::{Clock, ManualClock};
use vik_infrastructure::{
    InMemoryServerStateStore, MessageEffect, RecordingMessageService, StaticRoleDirectory,
};

const SERVER: ServerId = ServerId(100);

struct Bot {
    router: EventRouter,
    selector: Arc<RoleSelector>,
    messages: Arc<RecordingMessageService>,
    store: Arc<InMemoryServerStateStore>,
    clock: Arc<ManualClock>,
}

async fn bot() -> Bot {
    let mut servers = BTreeMap::new();
    servers.insert(SERVER, ServerState::default());
    let store = Arc::new(InMemoryServerStateStore::with_servers(servers));
    let state = Arc::new(ServerStateService::load(store.clone()).await.unwrap());

    let mut live = HashMap::new();
    live.insert(
        SERVER,
        vec![
            LiveRole::new(RoleId(1), "red"),
            LiveRole::new(RoleId(2), "blue"),
            LiveRole::new(RoleId(3), "green"),
        ],
    );
    let directory = Arc::new(StaticRoleDirectory::with_roles(live));
    let messages = Arc::new(RecordingMessageService::new());
    let clock = Arc::new(ManualClock::default());

    let selector = Arc::new(RoleSelector::with_clock(
        &BotConfig::default(),
        state,
        directory,
        messages.clone(),
        clock.clone(),
    ));
    let mut router = EventRouter::new(messages.clone());
    selector.install(&mut router);

    Bot {
        router,
        selector,
        messages,
        store,
        clock,
    }
}

fn context(interaction: u64) -> EventContext {
    EventContext::new(InteractionId(interaction), UserId(7)).in_server(SERVER, ChannelId(8))
}

fn command(interaction: u64, path: &str, group: &str) -> CommandEvent {
    CommandEvent::new(context(interaction), path).with_option(GROUP_OPTION, group)
}

fn click(interaction: u64, message: MessageId, custom_id: &str, values: &[&str]) -> ComponentEvent {
    ComponentEvent {
        context: context(interaction),
        message,
        custom_id: custom_id.to_string(),
        values: values.iter().map(|v| v.to_string()).collect(),
        member_roles: Vec::new(),
    }
}

#[tokio::test]
async fn test_editor_session_expires_and_deletes_message() {
    let bot = bot().await;
    assert!(bot.router.dispatch_command(&command(1, CMD_ADD, "g")).await);
    assert!(bot.router.dispatch_command(&command(2, CMD_EDIT_CHOICES, "g")).await);
    let (editor, _) = bot.messages.last_reply().unwrap();
    bot.messages.clear();

    let sessions = bot.selector.sessions();
    let expiry = bot.selector.expiry_handler();
    let ttl = sessions.delay();

    let early = sessions
        .sweep(bot.clock.now() + ttl - Duration::seconds(1), expiry.as_ref())
        .await;
    assert_eq!(early, 0);

    bot.clock.advance(ttl + Duration::seconds(1));
    let swept = sessions.sweep(bot.clock.now(), expiry.as_ref()).await;
    assert_eq!(swept, 1);
    assert_eq!(bot.messages.deleted(), vec![editor]);

    // the selection now hits a missing session
    assert!(bot.router.dispatch_component(&click(3, editor, EDIT_CHOICES_ID, &["1"])).await);
    let (_, reply) = bot.messages.last_reply().unwrap();
    assert_eq!(reply.content, "failed");
    assert!(reply.ephemeral);
    assert_eq!(bot.messages.deleted(), vec![editor]);

    bot.router.shutdown().await;
}

#[tokio::test]
async fn test_full_curation_round() {
    let bot = bot().await;
    bot.router.dispatch_command(&command(1, CMD_ADD, "colors")).await;
    bot.router.dispatch_command(&command(2, CMD_EDIT_CHOICES, "colors")).await;
    let (editor, _) = bot.messages.last_reply().unwrap();

    bot.router
        .dispatch_component(&click(3, editor, EDIT_CHOICES_ID, &["3", "1"]))
        .await;
    assert_eq!(bot.messages.last_reply().unwrap().1.content, "edited group");
    let saved = bot.store.snapshot().await;
    let ids: Vec<RoleId> = saved[&SERVER].group("colors").unwrap().roles.iter().map(|e| e.role_id).collect();
    assert_eq!(ids, vec![RoleId(3), RoleId(1)]);

    bot.router.dispatch_command(&command(4, CMD_EDIT_LOOKS, "colors")).await;
    let (looks, first_page) = bot.messages.last_reply().unwrap();
    assert!(first_page.content.ends_with("Editing: colors (1/2)"));

    bot.router
        .dispatch_component(&click(5, looks, EDIT_LOOKS_RIGHT, &[]))
        .await;
    let edits = bot.messages.edits_of(looks);
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].embeds[0].fields[0].name, "Name: red\t");

    bot.router
        .dispatch_command(&CommandEvent::new(context(6), CMD_LIST))
        .await;
    let (_, listing) = bot.messages.last_reply().unwrap();
    assert!(listing.content.starts_with("**__colors__**\n\t**green** green"));
}

#[tokio::test]
async fn test_shutdown_drains_open_editors() {
    let bot = bot().await;
    bot.router.dispatch_command(&command(1, CMD_ADD, "g")).await;
    bot.router.dispatch_command(&command(2, CMD_EDIT_CHOICES, "g")).await;
    bot.router.dispatch_command(&command(3, CMD_EDIT_CHOICES, "g")).await;

    let drained = bot.router.shutdown().await;

    assert_eq!(drained, 2);
    assert!(bot.selector.sessions().is_empty());
    let deletes = bot
        .messages
        .effects()
        .into_iter()
        .filter(|effect| matches!(effect, MessageEffect::Delete { .. }))
        .count();
    assert_eq!(deletes, 2);
    assert_eq!(bot.router.shutdown().await, 0);
}

#[tokio::test]
async fn test_commands_outside_a_server_are_dropped() {
    let bot = bot().await;
    let dm = CommandEvent::new(EventContext::new(InteractionId(1), UserId(7)), CMD_ADD)
        .with_option(GROUP_OPTION, "g");

    assert!(bot.router.dispatch_command(&dm).await);

    assert!(bot.messages.effects().is_empty());
    assert_eq!(bot.store.save_count(), 0);
}
