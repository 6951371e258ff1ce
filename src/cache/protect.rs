//! Web-server protection markers for the cache directory
//!
//! The cache lives under the host's public upload tree, so a front-facing
//! server would happily list or serve it. Two markers close that off:
//!
//! - `.htaccess` denies all direct access (Apache 2.2 and 2.4 syntax) and
//!   turns off auto-indexing.
//! - `index.html` is an empty document, so servers that ignore `.htaccess`
//!   (nginx, Caddy) serve a blank page instead of a directory listing.
//!
//! Writing the markers is idempotent. A clear removes them along with
//! everything else, so protection is always re-applied after a flush.

use crate::cache::fsops;
use crate::error::{AgentmdError, AgentmdResult};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Deny-all marker file name
pub const DENY_MARKER: &str = ".htaccess";

/// Directory-listing suppressor file name
pub const INDEX_MARKER: &str = "index.html";

const DENY_CONTENT: &str = "\
# agentmd cache: direct access is not allowed
Options -Indexes
<IfModule mod_authz_core.c>
    Require all denied
</IfModule>
<IfModule !mod_authz_core.c>
    Order allow,deny
    Deny from all
</IfModule>
";

const INDEX_CONTENT: &str = "<!DOCTYPE html><title></title>\n";

/// What a front-facing web server would return for the directory URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebAccess {
    /// Directory does not exist
    NotFound,
    /// Request rejected by the deny-all marker
    Denied,
    /// Blank index document served, no listing
    EmptyIndex,
    /// Auto-generated listing exposing these entry names
    Listing(Vec<String>),
}

/// Whether a file name is one of the protection markers
pub fn is_marker(name: &str) -> bool {
    name == DENY_MARKER || name == INDEX_MARKER
}

/// Write both protection markers into `dir`
pub fn protect(dir: &Path) -> AgentmdResult<()> {
    write_marker(dir, DENY_MARKER, DENY_CONTENT)?;
    write_marker(dir, INDEX_MARKER, INDEX_CONTENT)?;
    debug!("Protected {}", dir.display());
    Ok(())
}

/// Check that both markers are present as regular files with the expected content
pub fn is_protected(dir: &Path) -> bool {
    marker_matches(dir, DENY_MARKER, DENY_CONTENT) && marker_matches(dir, INDEX_MARKER, INDEX_CONTENT)
}

/// Simulate a web request for the directory itself
pub fn web_probe(dir: &Path) -> WebAccess {
    match fs::symlink_metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        _ => return WebAccess::NotFound,
    }

    if marker_matches(dir, DENY_MARKER, DENY_CONTENT) {
        return WebAccess::Denied;
    }
    if regular_file(&dir.join(INDEX_MARKER)) {
        return WebAccess::EmptyIndex;
    }

    let mut names: Vec<String> = fsops::list_entries(dir)
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    names.sort();
    WebAccess::Listing(names)
}

fn write_marker(dir: &Path, name: &str, content: &str) -> AgentmdResult<()> {
    let path = dir.join(name);

    if let Ok(meta) = fs::symlink_metadata(&path) {
        if !meta.file_type().is_file() {
            // Never write through a link or into a directory planted under a marker name
            warn!("Replacing non-file protection marker {}", path.display());
            if !fsops::delete_entry(&path).is_clean() {
                return Err(AgentmdError::CacheEntryInvalid(path));
            }
        } else if marker_matches(dir, name, content) {
            return Ok(());
        }
    }

    fs::write(&path, content).map_err(|e| {
        AgentmdError::io(format!("writing protection marker {}", path.display()), e)
    })
}

fn marker_matches(dir: &Path, name: &str, content: &str) -> bool {
    let path = dir.join(name);
    regular_file(&path) && fs::read_to_string(&path).is_ok_and(|c| c == content)
}

fn regular_file(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn protect_writes_markers() {
        let temp = TempDir::new().unwrap();
        protect(temp.path()).unwrap();

        assert!(temp.path().join(DENY_MARKER).is_file());
        assert!(temp.path().join(INDEX_MARKER).is_file());
        assert!(is_protected(temp.path()));
    }

    #[test]
    fn protect_is_idempotent() {
        let temp = TempDir::new().unwrap();
        protect(temp.path()).unwrap();
        let first = fs::read_to_string(temp.path().join(DENY_MARKER)).unwrap();

        protect(temp.path()).unwrap();
        let second = fs::read_to_string(temp.path().join(DENY_MARKER)).unwrap();

        assert_eq!(first, second);
        assert_eq!(fsops::list_entries(temp.path()).len(), 2);
    }

    #[test]
    fn protect_repairs_tampered_marker() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(DENY_MARKER), "Options +Indexes\n").unwrap();
        assert!(!is_protected(temp.path()));

        protect(temp.path()).unwrap();

        assert!(is_protected(temp.path()));
    }

    #[test]
    fn protect_replaces_directory_marker() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(INDEX_MARKER)).unwrap();
        fs::write(temp.path().join(INDEX_MARKER).join("x"), "x").unwrap();

        protect(temp.path()).unwrap();

        assert!(is_protected(temp.path()));
    }

    #[cfg(unix)]
    #[test]
    fn protect_does_not_write_through_symlink() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let target = outside.path().join("victim.conf");
        fs::write(&target, "original").unwrap();
        symlink(&target, temp.path().join(DENY_MARKER)).unwrap();

        protect(temp.path()).unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "original");
        assert!(is_protected(temp.path()));
    }

    #[test]
    fn web_probe_states() {
        let temp = TempDir::new().unwrap();
        assert_eq!(web_probe(&temp.path().join("missing")), WebAccess::NotFound);

        fs::write(temp.path().join("a.md"), "# a").unwrap();
        assert_eq!(
            web_probe(temp.path()),
            WebAccess::Listing(vec!["a.md".to_string()])
        );

        fs::write(temp.path().join(INDEX_MARKER), INDEX_CONTENT).unwrap();
        assert_eq!(web_probe(temp.path()), WebAccess::EmptyIndex);

        protect(temp.path()).unwrap();
        assert_eq!(web_probe(temp.path()), WebAccess::Denied);
    }

    #[test]
    fn marker_names() {
        assert!(is_marker(".htaccess"));
        assert!(is_marker("index.html"));
        assert!(!is_marker("a.md"));
    }
}
