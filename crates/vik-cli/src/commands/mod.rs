pub mod config;
pub mod groups;
pub mod prune;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vik_application::ServerStateService;
use vik_infrastructure::{ConfigService, TomlServerStateStore};

/// The config file every command works on.
pub struct Workspace {
    config: ConfigService,
    store: Arc<TomlServerStateStore>,
}

impl Workspace {
    pub fn open(explicit: Option<PathBuf>) -> Result<Self> {
        let config = ConfigService::resolve(explicit).context("Failed to locate config file")?;
        Ok(Self::at(config.path().clone()))
    }

    pub fn at(path: PathBuf) -> Self {
        Self {
            store: Arc::new(TomlServerStateStore::with_path(path.clone())),
            config: ConfigService::with_path(path),
        }
    }

    pub fn config_path(&self) -> &Path {
        self.config.path()
    }

    pub fn config(&self) -> &ConfigService {
        &self.config
    }

    pub async fn state(&self) -> Result<ServerStateService> {
        ServerStateService::load(self.store.clone())
            .await
            .with_context(|| format!("Failed to read {}", self.config_path().display()))
    }
}
