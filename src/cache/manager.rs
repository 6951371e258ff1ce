//! Cache root resolution and full-cache invalidation

use crate::cache::fsops;
use crate::cache::protect::{self, WebAccess};
use crate::config::Config;
use crate::error::{AgentmdError, AgentmdResult};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Host-provided storage location
///
/// The cache directory is derived from this base path plus a fixed
/// subdirectory name. Implementations must read the durable source on
/// every call; the manager queries it once per operation.
pub trait StorageLocator: Send + Sync {
    /// Base upload/storage directory of the host
    fn base_dir(&self) -> AgentmdResult<PathBuf>;
}

impl StorageLocator for Config {
    fn base_dir(&self) -> AgentmdResult<PathBuf> {
        self.storage_base_dir()
    }
}

/// Locator pinned to a fixed directory
#[derive(Debug, Clone)]
pub struct FixedLocator(pub PathBuf);

impl StorageLocator for FixedLocator {
    fn base_dir(&self) -> AgentmdResult<PathBuf> {
        Ok(self.0.clone())
    }
}

/// Result of a full-cache flush
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Resolved cache root, if the locator answered
    pub root: Option<PathBuf>,
    /// Whether the clear actually ran
    pub performed: bool,
    /// Entries removed
    pub removed: usize,
    /// Entries that survived because their removal failed
    pub failed: usize,
    /// Whether protection markers are in place afterwards
    pub protected: bool,
}

impl FlushReport {
    fn skipped(root: Option<PathBuf>) -> Self {
        Self {
            root,
            ..Self::default()
        }
    }
}

/// Snapshot of the cache directory for status output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStatus {
    /// Cache root path
    pub root: PathBuf,
    /// Whether the root exists as a real directory
    pub exists: bool,
    /// Whether both protection markers are intact
    pub protected: bool,
    /// Cached files (markers excluded)
    pub entries: usize,
    /// Total size of cached files in bytes
    pub bytes: u64,
    /// What a front-facing web server would return for the root URL
    pub web_access: WebAccess,
}

/// Owns the lifecycle of the cache root's contents
pub struct CacheDirectoryManager {
    locator: Box<dyn StorageLocator>,
    subdir: String,
}

impl CacheDirectoryManager {
    /// Create a manager for `<locator base>/<subdir>`
    pub fn new(locator: Box<dyn StorageLocator>, subdir: impl Into<String>) -> Self {
        Self {
            locator,
            subdir: subdir.into(),
        }
    }

    /// Create a manager from configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(Box::new(config.clone()), config.storage.cache_subdir.clone())
    }

    /// Resolve the cache root from the host storage path
    ///
    /// The subdirectory must be one plain name; anything else could point a
    /// flush at the storage base itself.
    pub fn cache_root(&self) -> AgentmdResult<PathBuf> {
        validate_subdir(&self.subdir)?;
        Ok(self.locator.base_dir()?.join(&self.subdir))
    }

    /// Delete every cached entry and re-apply protection
    ///
    /// Best effort: individual failures are logged and counted, never
    /// returned. An absent cache root is already flushed.
    pub fn flush_all(&self) -> FlushReport {
        let root = match self.cache_root() {
            Ok(root) => root,
            Err(e) => {
                warn!("Cannot resolve cache root, skipping flush: {}", e);
                return FlushReport::skipped(None);
            }
        };

        if !is_real_dir(&root) {
            debug!("Cache root {} absent, nothing to flush", root.display());
            return FlushReport::skipped(Some(root));
        }

        let outcome = fsops::clear_contents(&root);

        let protected = match protect::protect(&root) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to protect cache root {}: {}", root.display(), e);
                false
            }
        };

        info!(
            "Flushed markdown cache {} ({} removed, {} failed)",
            root.display(),
            outcome.removed,
            outcome.failed
        );

        FlushReport {
            root: Some(root),
            performed: true,
            removed: outcome.removed,
            failed: outcome.failed,
            protected,
        }
    }

    /// Create the cache root if needed and make sure it is protected
    pub fn ensure_root(&self) -> AgentmdResult<PathBuf> {
        let root = self.cache_root()?;

        if let Ok(meta) = fs::symlink_metadata(&root) {
            if !meta.is_dir() {
                return Err(AgentmdError::CacheEntryInvalid(root));
            }
        } else {
            fs::create_dir_all(&root).map_err(|e| {
                AgentmdError::io(format!("creating cache directory {}", root.display()), e)
            })?;
            debug!("Created cache root {}", root.display());
        }

        protect::protect(&root)?;
        Ok(root)
    }

    /// Inspect the cache root without modifying it
    pub fn status(&self) -> AgentmdResult<CacheStatus> {
        let root = self.cache_root()?;
        let exists = is_real_dir(&root);
        let (entries, bytes) = if exists { usage(&root) } else { (0, 0) };

        Ok(CacheStatus {
            protected: exists && protect::is_protected(&root),
            web_access: protect::web_probe(&root),
            root,
            exists,
            entries,
            bytes,
        })
    }
}

/// Format bytes as human-readable size (e.g., "1.5 MB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Accept exactly one normal path component
pub fn validate_subdir(subdir: &str) -> AgentmdResult<()> {
    let mut components = Path::new(subdir).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(AgentmdError::CacheSubdirInvalid(subdir.to_string())),
    }
}

fn is_real_dir(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.is_dir())
}

/// Count cached files and their size, never following links
fn usage(root: &Path) -> (usize, u64) {
    let mut stack: Vec<PathBuf> = fsops::list_entries(root)
        .into_iter()
        .filter(|p| {
            !p.file_name()
                .is_some_and(|n| protect::is_marker(&n.to_string_lossy()))
        })
        .collect();
    let mut entries = 0;
    let mut bytes = 0;

    while let Some(path) = stack.pop() {
        let Ok(meta) = fs::symlink_metadata(&path) else {
            continue;
        };
        if meta.is_dir() {
            stack.extend(fsops::list_entries(&path));
        } else {
            entries += 1;
            bytes += meta.len();
        }
    }

    (entries, bytes)
}
