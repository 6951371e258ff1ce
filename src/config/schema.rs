//! Configuration schema for agentmd
//!
//! Configuration is stored at `~/.config/agentmd/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Host storage settings (where the cache directory lives)
    pub storage: StorageConfig,

    /// Durable option store settings
    pub options: OptionsConfig,

    /// Route table settings
    pub routes: RoutesConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Record lifecycle actions in the journal
    pub audit_log: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            audit_log: true,
        }
    }
}

/// Host storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Host-provided upload/storage base path
    pub base_dir: Option<PathBuf>,

    /// Fixed subdirectory name holding the markdown cache
    pub cache_subdir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            cache_subdir: "mfa-cache".to_string(),
        }
    }
}

/// Option store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    /// JSON file holding persisted options (default: state dir)
    pub path: Option<PathBuf>,
}

/// Route table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Persisted route table written on every rebuild (default: state dir)
    pub table_path: Option<PathBuf>,

    /// Query variable the markdown handler reads the content path from
    pub query_var: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            table_path: None,
            query_var: "mfa_markdown".to_string(),
        }
    }
}
