//! Content-identity keyed markdown entries
//!
//! The renderer hands over finished markdown together with a content
//! identity (for example `post:42`). Entries are named after a SHA-256
//! prefix of that identity so no user-controlled text reaches the
//! filesystem path.

use crate::cache::manager::CacheDirectoryManager;
use crate::error::{AgentmdError, AgentmdResult};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::debug;

/// Read/write access to cache entries under the cache root
pub struct CacheStore<'a> {
    manager: &'a CacheDirectoryManager,
}

impl<'a> CacheStore<'a> {
    /// Create a store backed by the manager's cache root
    pub fn new(manager: &'a CacheDirectoryManager) -> Self {
        Self { manager }
    }

    /// Path of the entry for a content identity
    pub fn entry_path(&self, identity: &str) -> AgentmdResult<PathBuf> {
        Ok(self.manager.cache_root()?.join(entry_name(identity)))
    }

    /// Read a cached entry, `None` on a miss
    ///
    /// A link planted at the entry path is treated as a miss.
    pub fn get(&self, identity: &str) -> AgentmdResult<Option<String>> {
        let path = self.entry_path(identity)?;

        match fs::symlink_metadata(&path) {
            Ok(meta) if meta.file_type().is_file() => {}
            Ok(_) => {
                debug!("Ignoring non-file cache entry {}", path.display());
                return Ok(None);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AgentmdError::io(
                    format!("inspecting cache entry {}", path.display()),
                    e,
                ))
            }
        }

        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| AgentmdError::io(format!("reading cache entry {}", path.display()), e))
    }

    /// Write an entry, creating and protecting the cache root first
    pub fn put(&self, identity: &str, markdown: &str) -> AgentmdResult<PathBuf> {
        let root = self.manager.ensure_root()?;
        let path = root.join(entry_name(identity));

        if let Ok(meta) = fs::symlink_metadata(&path) {
            if !meta.file_type().is_file() {
                return Err(AgentmdError::CacheEntryInvalid(path));
            }
        }

        fs::write(&path, markdown)
            .map_err(|e| AgentmdError::io(format!("writing cache entry {}", path.display()), e))?;

        debug!("Cached {} at {}", identity, path.display());
        Ok(path)
    }
}

/// First 16 hex characters of the identity's SHA-256, with a `.md` suffix
pub fn entry_name(identity: &str) -> String {
    let digest = Sha256::digest(identity.as_bytes());
    format!("{}.md", hex::encode(&digest[..8]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::manager::FixedLocator;
    use crate::cache::protect;
    use tempfile::TempDir;

    fn manager(base: &TempDir) -> CacheDirectoryManager {
        CacheDirectoryManager::new(Box::new(FixedLocator(base.path().to_path_buf())), "mfa-cache")
    }

    #[test]
    fn entry_name_is_stable() {
        assert_eq!(entry_name("post:42"), entry_name("post:42"));
        assert_ne!(entry_name("post:42"), entry_name("post:43"));
        assert_eq!(entry_name("post:42").len(), 16 + 3);
    }

    #[test]
    fn put_then_get() {
        let base = TempDir::new().unwrap();
        let mgr = manager(&base);
        let store = CacheStore::new(&mgr);

        store.put("post:1", "# Hello").unwrap();

        assert_eq!(store.get("post:1").unwrap().as_deref(), Some("# Hello"));
        assert!(protect::is_protected(&mgr.cache_root().unwrap()));
    }

    #[test]
    fn get_missing_is_none() {
        let base = TempDir::new().unwrap();
        let mgr = manager(&base);
        assert!(CacheStore::new(&mgr).get("post:9").unwrap().is_none());
    }

    #[test]
    fn flush_invalidates_entries() {
        let base = TempDir::new().unwrap();
        let mgr = manager(&base);
        let store = CacheStore::new(&mgr);
        store.put("post:1", "# One").unwrap();
        store.put("page:2", "# Two").unwrap();

        mgr.flush_all();

        assert!(store.get("post:1").unwrap().is_none());
        assert!(store.get("page:2").unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn get_ignores_symlinked_entry() {
        use std::os::unix::fs::symlink;

        let base = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let mgr = manager(&base);
        let store = CacheStore::new(&mgr);
        mgr.ensure_root().unwrap();
        fs::write(outside.path().join("secret"), "secret").unwrap();
        symlink(
            outside.path().join("secret"),
            store.entry_path("post:1").unwrap(),
        )
        .unwrap();

        assert!(store.get("post:1").unwrap().is_none());
        assert!(store.put("post:1", "# x").is_err());
        assert_eq!(
            fs::read_to_string(outside.path().join("secret")).unwrap(),
            "secret"
        );
    }
}
