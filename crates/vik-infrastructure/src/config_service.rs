//! Configuration service implementation.
//!
//! Loads `BotConfig` from the config file and caches it.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use vik_core::config::BotConfig;
use vik_core::error::{Result, VikError};

use crate::paths::VikPaths;
use crate::storage::AtomicTomlFile;

/// Loads and caches the bot configuration.
///
/// A missing or blank file yields the defaults; a file that does not parse
/// is an error rather than silently replaced.
#[derive(Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<BotConfig>>>,
}

impl ConfigService {
    /// Service for the resolved default location (`$VIKBOT_CONFIG` or the
    /// platform config dir).
    pub fn new() -> Result<Self> {
        Self::resolve(None)
    }

    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        let path = VikPaths::new(explicit)
            .config_file()
            .map_err(|e| VikError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<BotConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|_| VikError::internal("config cache lock poisoned"))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = AtomicTomlFile::<BotConfig>::new(self.path.clone())
            .load()?
            .unwrap_or_default();
        tracing::debug!(path = %self.path.display(), servers = loaded.servers.len(), "config loaded");

        let mut write_lock = self
            .config
            .write()
            .map_err(|_| VikError::internal("config cache lock poisoned"))?;
        *write_lock = Some(loaded.clone());

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));
        assert_eq!(service.get_config().unwrap(), BotConfig::default());
    }

    #[test]
    fn test_cache_and_invalidate() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "bot_name = \"first\"\n").unwrap();
        let service = ConfigService::with_path(path.clone());
        assert_eq!(service.get_config().unwrap().bot_name, "first");

        std::fs::write(&path, "bot_name = \"second\"\n").unwrap();
        assert_eq!(service.get_config().unwrap().bot_name, "first");

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().bot_name, "second");
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[role_selector\n").unwrap();
        let err = ConfigService::with_path(path).get_config().unwrap_err();
        assert!(matches!(err, VikError::Serialization { .. }));
    }
}
