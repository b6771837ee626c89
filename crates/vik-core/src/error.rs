//! Error types for VIKBOT.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The bot's error type.
///
/// `NotFound`, `InvalidContext`, `MalformedInput` and `ExternalEffect` are
/// what interaction handlers produce; the remaining variants come from
/// storage and configuration.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum VikError {
    /// A session, group or role entry is absent.
    #[error("{entity_type} not found: '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The action needs a context the event does not carry (server, channel).
    #[error("Invalid context: {0}")]
    InvalidContext(String),

    /// Input that could not be parsed (emoji, identifiers).
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A send/edit/delete against the message service or role directory failed.
    #[error("External effect failed: {0}")]
    ExternalEffect(String),

    #[error("I/O failure: {message}")]
    Io { message: String },

    /// A document did not (de)serialize; `format` names the encoding.
    #[error("{format} (de)serialization failed: {message}")]
    Serialization { format: String, message: String },

    #[error("Bad configuration: {0}")]
    Config(String),

    /// A broken invariant, e.g. a poisoned lock or a crashed worker task.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VikError {
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn invalid_context(message: impl Into<String>) -> Self {
        Self::InvalidContext(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }

    pub fn external(message: impl Into<String>) -> Self {
        Self::ExternalEffect(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    fn serialization(format: &str, err: impl std::fmt::Display) -> Self {
        Self::Serialization {
            format: format.to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_invalid_context(&self) -> bool {
        matches!(self, Self::InvalidContext(_))
    }

    pub fn is_external(&self) -> bool {
        matches!(self, Self::ExternalEffect(_))
    }

    /// Errors that are answered with an ephemeral reply instead of a log line.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::MalformedInput(_))
    }

    /// Text shown to the user when the error is answered with a reply.
    ///
    /// Missing sessions keep the terse "failed" the editors have always used.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound {
                entity_type: "session",
                ..
            } => "failed".to_string(),
            Self::NotFound { entity_type, id } => format!("{} '{}' not found", entity_type, id),
            Self::MalformedInput(message) => format!("could not understand input: {}", message),
            _ => "action failed!".to_string(),
        }
    }
}

impl From<std::io::Error> for VikError {
    fn from(err: std::io::Error) -> Self {
        Self::io(format!("{} ({:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for VikError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization("JSON", err)
    }
}

impl From<toml::de::Error> for VikError {
    fn from(err: toml::de::Error) -> Self {
        Self::serialization("TOML", err)
    }
}

impl From<toml::ser::Error> for VikError {
    fn from(err: toml::ser::Error) -> Self {
        Self::serialization("TOML", err)
    }
}

impl From<anyhow::Error> for VikError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(format!("{:#}", err))
    }
}

/// A type alias for `Result<T, VikError>`.
pub type Result<T> = std::result::Result<T, VikError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_classification() {
        assert!(VikError::not_found("group", "g").is_user_facing());
        assert!(VikError::malformed("emoji").is_user_facing());
        assert!(!VikError::invalid_context("no channel").is_user_facing());
        assert!(!VikError::external("delete").is_user_facing());
    }

    #[test]
    fn test_user_message() {
        assert_eq!(VikError::not_found("session", "42").user_message(), "failed");
        assert_eq!(
            VikError::not_found("group", "colors").user_message(),
            "group 'colors' not found"
        );
        assert_eq!(VikError::internal("x").user_message(), "action failed!");
    }

    #[test]
    fn test_io_conversion() {
        let err: VikError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, VikError::Io { .. }));
    }

    #[test]
    fn test_toml_conversion_names_format() {
        let err: VikError = toml::from_str::<toml::Value>("= broken").unwrap_err().into();
        assert!(matches!(err, VikError::Serialization { ref format, .. } if format == "TOML"));
    }
}
