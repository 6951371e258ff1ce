//! Error types for agentmd
//!
//! All modules use `AgentmdResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for agentmd operations
pub type AgentmdResult<T> = Result<T, AgentmdError>;

/// All errors that can occur in agentmd
#[derive(Error, Debug)]
pub enum AgentmdError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown configuration key: {0}")]
    ConfigKeyUnknown(String),

    // Storage errors
    #[error("Storage base directory is not configured")]
    StorageBaseMissing,

    #[error("Cache subdirectory must be a single plain directory name, got {0:?}")]
    CacheSubdirInvalid(String),

    #[error("Cache entry path is occupied by a non-file: {0}")]
    CacheEntryInvalid(PathBuf),

    // Option store errors
    #[error("Option store at {path} is corrupt: {reason}")]
    OptionStoreCorrupt { path: PathBuf, reason: String },

    // Route registry errors
    #[error("Route table at {path} is corrupt: {reason}")]
    RouteTableCorrupt { path: PathBuf, reason: String },

    #[error("Invalid route rule {pattern}: {reason}")]
    RouteRuleInvalid { pattern: String, reason: String },

    // Version errors
    #[error("Invalid version: {0}")]
    Version(#[from] semver::Error),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl AgentmdError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Check if error is retryable
    ///
    /// Route table writes and option store writes are idempotent, so a
    /// failed IO step can simply be repeated on the next event.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::StorageBaseMissing => Some("Run: agentmd config set storage.base_dir <path>"),
            Self::ConfigInvalid { .. } => Some("Run: agentmd config init --force"),
            Self::ConfigKeyUnknown(_) => Some("Run: agentmd config show"),
            Self::CacheSubdirInvalid(_) => Some("Run: agentmd config set storage.cache_subdir mfa-cache"),
            Self::RouteTableCorrupt { .. } => Some("Run: agentmd routes rebuild"),
            Self::OptionStoreCorrupt { .. } => {
                Some("Run: agentmd event bootstrap (rewrites the option store)")
            }
            _ => None,
        }
    }
}
