//! Emoji references as they appear in role descriptors and reactions.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, VikError};

static CUSTOM_FORMATTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<(a?):([A-Za-z0-9_~]{2,32}):(\d{1,20})>$").expect("valid emoji regex")
});

static CUSTOM_REACTION_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(a):)?([A-Za-z0-9_~]{2,32}):(\d{1,20})$").expect("valid emoji regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emoji {
    Unicode(String),
    Custom { name: String, id: u64, animated: bool },
}

impl Emoji {
    /// Parses either the mention form (`<:name:id>`), a reaction code
    /// (`name:id`, `a:name:id`) or a unicode emoji.
    pub fn from_formatted(input: &str) -> Result<Self> {
        let text = input.trim();
        if text.is_empty() {
            return Err(VikError::malformed("empty emoji"));
        }

        if let Some(caps) = CUSTOM_FORMATTED.captures(text) {
            return Self::custom(&caps[2], &caps[3], &caps[1] == "a");
        }
        if let Some(caps) = CUSTOM_REACTION_CODE.captures(text) {
            return Self::custom(&caps[2], &caps[3], caps.get(1).is_some());
        }

        // role display names land here too, so only known emoji count
        if emojis::get(text).is_some() {
            Ok(Emoji::Unicode(text.to_string()))
        } else {
            Err(VikError::malformed(format!("'{}' is not an emoji", text)))
        }
    }

    fn custom(name: &str, id: &str, animated: bool) -> Result<Self> {
        let id = id
            .parse::<u64>()
            .map_err(|e| VikError::malformed(format!("emoji id '{}': {}", id, e)))?;
        Ok(Emoji::Custom {
            name: name.to_string(),
            id,
            animated,
        })
    }

    /// Parses an emoji, treating anything unparseable as "no icon".
    pub fn parse_lenient(input: &str) -> Option<Self> {
        Self::from_formatted(input).ok()
    }

    /// The code the platform uses for reactions: the unicode itself, or
    /// `name:id` for custom emoji.
    pub fn reaction_code(&self) -> String {
        match self {
            Emoji::Unicode(text) => text.clone(),
            Emoji::Custom { name, id, .. } => format!("{}:{}", name, id),
        }
    }
}

impl fmt::Display for Emoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emoji::Unicode(text) => f.write_str(text),
            Emoji::Custom {
                name,
                id,
                animated,
            } => write!(f, "<{}:{}:{}>", if *animated { "a" } else { "" }, name, id),
        }
    }
}
