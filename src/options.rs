//! Durable key/value option store
//!
//! The lifecycle core only needs `get`/`set` on string values, so it talks
//! to an `OptionStore` rather than any particular settings backend.

use crate::error::{AgentmdError, AgentmdResult};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Key/value persistence port
pub trait OptionStore: Send + Sync {
    /// Read a value, `None` when unset
    fn get(&self, key: &str) -> AgentmdResult<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> AgentmdResult<()>;
}

/// Options persisted as a JSON object of strings
///
/// Every call goes to disk; nothing is cached in memory.
#[derive(Debug, Clone)]
pub struct FileOptionStore {
    path: PathBuf,
}

impl FileOptionStore {
    /// Create a store backed by `path` (created on first write)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> AgentmdResult<BTreeMap<String, String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(AgentmdError::io(
                    format!("reading option store {}", self.path.display()),
                    e,
                ))
            }
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| AgentmdError::OptionStoreCorrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    fn write_all(&self, options: &BTreeMap<String, String>) -> AgentmdResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AgentmdError::io(format!("creating directory {}", parent.display()), e)
            })?;
        }

        // Write then rename so a crash never leaves a half-written store
        let tmp = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(options)?;
        fs::write(&tmp, content)
            .map_err(|e| AgentmdError::io(format!("writing option store {}", tmp.display()), e))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            AgentmdError::io(format!("replacing option store {}", self.path.display()), e)
        })
    }
}

impl OptionStore for FileOptionStore {
    fn get(&self, key: &str) -> AgentmdResult<Option<String>> {
        Ok(self.read_all()?.get(key).cloned())
    }

    /// A corrupt store is replaced rather than left to fail every write
    fn set(&self, key: &str, value: &str) -> AgentmdResult<()> {
        let mut options = match self.read_all() {
            Ok(options) => options,
            Err(e @ AgentmdError::OptionStoreCorrupt { .. }) => {
                warn!("{}, starting it over", e);
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        options.insert(key.to_string(), value.to_string());
        self.write_all(&options)?;
        debug!("Option {} = {}", key, value);
        Ok(())
    }
}

/// In-process option store for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryOptionStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryOptionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl OptionStore for MemoryOptionStore {
    fn get(&self, key: &str) -> AgentmdResult<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| AgentmdError::Internal("option store lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AgentmdResult<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| AgentmdError::Internal("option store lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
