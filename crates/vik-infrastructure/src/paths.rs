//! Path resolution for the bot's configuration file.
//!
//! ```text
//! $VIKBOT_CONFIG                 # explicit override, used as-is
//! ~/.config/vikbot/config.toml   # default (platform config dir)
//! ```

use std::path::PathBuf;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "VIKBOT_CONFIG";

#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

pub struct VikPaths {
    override_path: Option<PathBuf>,
}

impl VikPaths {
    /// `explicit` wins over the environment, which wins over the default.
    pub fn new(explicit: Option<PathBuf>) -> Self {
        let override_path = explicit.or_else(|| {
            std::env::var_os(CONFIG_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        });
        Self { override_path }
    }

    /// `<config dir>/vikbot`.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("vikbot"))
            .ok_or(PathError::ConfigDirNotFound)
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        match &self.override_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("config.toml")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let paths = VikPaths::new(Some(PathBuf::from("/tmp/custom.toml")));
        assert_eq!(
            paths.config_file().unwrap(),
            PathBuf::from("/tmp/custom.toml")
        );
    }
}
