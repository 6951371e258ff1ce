//! Configuration management for agentmd

pub mod schema;

pub use schema::Config;

use crate::error::{AgentmdError, AgentmdResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agentmd")
            .join("config.toml")
    }

    /// Get the state directory path
    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agentmd")
    }

    /// Get the journal path
    pub fn journal_path() -> PathBuf {
        Self::state_dir().join("journal.log")
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> AgentmdResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> AgentmdResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| AgentmdError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| AgentmdError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> AgentmdResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            AgentmdError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> AgentmdResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AgentmdError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Resolve the host storage base path
    ///
    /// Falls back to the platform data directory when no base path is
    /// configured.
    pub fn storage_base_dir(&self) -> AgentmdResult<PathBuf> {
        if let Some(ref dir) = self.storage.base_dir {
            return Ok(dir.clone());
        }
        dirs::data_local_dir()
            .map(|d| d.join("agentmd").join("uploads"))
            .ok_or(AgentmdError::StorageBaseMissing)
    }

    /// Resolve the option store file path
    pub fn options_path(&self) -> PathBuf {
        self.options
            .path
            .clone()
            .unwrap_or_else(|| ConfigManager::state_dir().join("options.json"))
    }

    /// Resolve the persisted route table path
    pub fn route_table_path(&self) -> PathBuf {
        self.routes
            .table_path
            .clone()
            .unwrap_or_else(|| ConfigManager::state_dir().join("routes.json"))
    }
}
