//! Message builders for the editors and the published menu.

use super::{
    EDIT_CHOICES_ID, EDIT_LOOKS_LEFT, EDIT_LOOKS_MODIFY, EDIT_LOOKS_RIGHT, MENU_OPTION_LIMIT,
    PUBLISHED_MENU_PREFIX,
};
use vik_core::emoji::Emoji;
use vik_core::message::{ButtonStyle, Component, Embed, EmbedField, OutboundMessage, SelectOption};
use vik_core::role::{RoleEntry, RoleGroup};

/// Everything the looks editor renders besides the entry itself.
pub struct LooksEditorFrame<'a> {
    pub warning: &'a str,
    pub bot_name: &'a str,
    pub embed_color: u32,
    pub group_name: &'a str,
}

/// The page of the looks editor showing `entries[page]`.
///
/// `page` must be in range.
pub fn looks_editor_view(frame: &LooksEditorFrame<'_>, entries: &[RoleEntry], page: usize) -> OutboundMessage {
    let descriptor = &entries[page].descriptor;
    let emote = Emoji::parse_lenient(&descriptor.emote_name)
        .map(|emoji| emoji.to_string())
        .unwrap_or_default();

    let embed = Embed {
        author: Some(frame.bot_name.to_string()),
        color: frame.embed_color,
        fields: vec![EmbedField {
            name: format!("Name: {}\t{}", descriptor.full_name, emote),
            value: format!("Desc: {}", descriptor.description),
            inline: false,
        }],
    };

    OutboundMessage::text(format!(
        "{}\nEditing: {} ({}/{})",
        frame.warning,
        frame.group_name,
        page + 1,
        entries.len()
    ))
    .with_embed(embed)
    .with_components(page_buttons(page, entries.len()))
}

fn page_buttons(page: usize, len: usize) -> Vec<Component> {
    vec![
        Component::Button {
            custom_id: EDIT_LOOKS_LEFT.to_string(),
            label: None,
            emoji: Some(Emoji::Unicode("◀".to_string())),
            style: ButtonStyle::Primary,
            disabled: page == 0,
        },
        Component::Button {
            custom_id: EDIT_LOOKS_RIGHT.to_string(),
            label: None,
            emoji: Some(Emoji::Unicode("▶".to_string())),
            style: ButtonStyle::Primary,
            disabled: page + 1 >= len,
        },
        Component::Button {
            custom_id: EDIT_LOOKS_MODIFY.to_string(),
            label: Some("Modify".to_string()),
            emoji: None,
            style: ButtonStyle::Secondary,
            disabled: false,
        },
    ]
}

pub(crate) fn choices_editor_view(warning: &str, group_name: &str) -> OutboundMessage {
    OutboundMessage::text(format!("{}\nEditing: {}", warning, group_name)).with_component(
        Component::RoleSelect {
            custom_id: EDIT_CHOICES_ID.to_string(),
            min_values: 0,
            max_values: MENU_OPTION_LIMIT as u8,
        },
    )
}

/// Self-service menu for `group`, options ordered by full name.
///
/// `option_limit` caps the number of options; the selectable maximum is the
/// group's own limit when set, never more than the number of options.
pub fn published_menu(group_name: &str, entries: &[RoleEntry], group: &RoleGroup, option_limit: usize) -> Component {
    let mut sorted: Vec<&RoleEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.descriptor.full_name.cmp(&b.descriptor.full_name));

    let options: Vec<SelectOption> = sorted
        .into_iter()
        .take(option_limit.min(MENU_OPTION_LIMIT))
        .map(|entry| SelectOption {
            label: entry.descriptor.full_name.clone(),
            value: entry.role_id.to_string(),
            description: entry.descriptor.description.clone(),
            emoji: Emoji::parse_lenient(&entry.descriptor.emote_name),
        })
        .collect();

    let max_values = group
        .max_selectable
        .map_or(MENU_OPTION_LIMIT, usize::from)
        .min(options.len());

    Component::StringSelect {
        custom_id: format!("{}:{}", PUBLISHED_MENU_PREFIX, group_name),
        options,
        min_values: 0,
        max_values: max_values as u8,
    }
}

/// Listing line of one entry.
pub(crate) fn list_line(entry: &RoleEntry) -> String {
    let descriptor = &entry.descriptor;
    let full_name = if descriptor.full_name.is_empty() {
        "<no full name>"
    } else {
        &descriptor.full_name
    };
    let description = if descriptor.description.is_empty() {
        "<no desc>"
    } else {
        &descriptor.description
    };
    format!(
        "**{}** {}\n\t\t({} \\|\\| {})",
        descriptor.api_name, descriptor.emote_name, full_name, description
    )
}
