//! Server state persistence inside `config.toml`.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use vik_core::config::BotConfig;
use vik_core::error::{Result, VikError};
use vik_core::ids::ServerId;
use vik_core::role::{ServerState, ServerStateStore};

use crate::paths::VikPaths;
use crate::storage::AtomicTomlFile;

/// Stores the `servers` table of the bot config file.
///
/// Saving rewrites only that table; the remaining settings are read back
/// from disk under the file lock and kept as they are.
pub struct TomlServerStateStore {
    file: Arc<AtomicTomlFile<BotConfig>>,
}

impl TomlServerStateStore {
    /// Store at the resolved default location.
    pub fn new() -> Result<Self> {
        let path = VikPaths::new(None)
            .config_file()
            .map_err(|e| VikError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicTomlFile::new(path)),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }
}

#[async_trait]
impl ServerStateStore for TomlServerStateStore {
    async fn load(&self) -> Result<BTreeMap<ServerId, ServerState>> {
        let file = Arc::clone(&self.file);
        let config = tokio::task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| VikError::internal(format!("config load task failed: {}", e)))??;
        Ok(config.map(|c| c.servers).unwrap_or_default())
    }

    async fn save(&self, servers: &BTreeMap<ServerId, ServerState>) -> Result<()> {
        let file = Arc::clone(&self.file);
        let servers = servers.clone();
        tokio::task::spawn_blocking(move || {
            file.update(BotConfig::default(), |config| {
                config.servers = servers;
                Ok(())
            })
        })
        .await
        .map_err(|e| VikError::internal(format!("config save task failed: {}", e)))??;

        tracing::debug!(path = %self.file.path().display(), "server states saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vik_core::RoleId;
    use vik_core::role::{RoleDescriptor, RoleEntry, RoleGroup};

    fn sample() -> BTreeMap<ServerId, ServerState> {
        let mut state = ServerState::default();
        state.groups.insert(
            "colors".to_string(),
            RoleGroup::with_roles(vec![RoleEntry::new(
                RoleId(5),
                RoleDescriptor {
                    api_name: "red".to_string(),
                    emote_name: "🟥".to_string(),
                    full_name: "Red".to_string(),
                    description: "the red team".to_string(),
                },
            )]),
        );
        let mut servers = BTreeMap::new();
        servers.insert(ServerId(100), state);
        servers
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = TomlServerStateStore::with_path(temp_dir.path().join("config.toml"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_keeps_other_settings() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "bot_name = \"custom\"\nembed_color = 255\n").unwrap();
        let store = TomlServerStateStore::with_path(path.clone());

        store.save(&sample()).await.unwrap();

        assert_eq!(store.load().await.unwrap(), sample());
        let config: BotConfig = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(config.bot_name, "custom");
        assert_eq!(config.embed_color, 255);
    }
}
