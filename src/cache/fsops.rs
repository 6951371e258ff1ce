//! Symlink-aware deletion primitives
//!
//! Every routine here is fail-soft: an entry that cannot be removed is
//! logged and counted, and the walk moves on to its siblings. Links are
//! inspected with `symlink_metadata` and removed as links, so a crafted
//! symlink inside the cache can never redirect a deletion outside it.

use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Tally of a deletion pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Entries (files, links, directories) removed
    pub removed: usize,
    /// Entries that could not be removed
    pub failed: usize,
}

impl DeleteOutcome {
    /// Whether every entry visited was removed
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, path: &Path, what: &str, result: io::Result<()>) {
        match result {
            Ok(()) => {
                debug!("Removed {} {}", what, path.display());
                self.removed += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} {} vanished before removal", what, path.display());
            }
            Err(e) => {
                warn!("Failed to remove {} {}: {}", what, path.display(), e);
                self.failed += 1;
            }
        }
    }
}

/// List the direct children of `dir`
///
/// Returns an empty list when the directory cannot be read; callers treat
/// that as nothing left to do.
pub fn list_entries(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to scan directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                warn!("Failed to read entry in {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|path| !is_self_or_parent(path))
        .collect()
}

/// Delete a single entry without following symlinks
///
/// Directories are emptied first and then removed.
pub fn delete_entry(path: &Path) -> DeleteOutcome {
    walk(vec![Step::Visit(path.to_path_buf())])
}

/// Delete everything inside `dir`, keeping `dir` itself
pub fn clear_contents(dir: &Path) -> DeleteOutcome {
    let mut steps: Vec<Step> = list_entries(dir).into_iter().map(Step::Visit).collect();
    steps.reverse();
    walk(steps)
}

enum Step {
    Visit(PathBuf),
    RemoveDir(PathBuf),
}

enum EntryKind {
    Link,
    Dir,
    File,
}

/// Post-order deletion driven by an explicit stack
///
/// A directory's `RemoveDir` step is pushed beneath its children, so it
/// only runs once they have all been visited.
fn walk(mut stack: Vec<Step>) -> DeleteOutcome {
    let mut outcome = DeleteOutcome::default();

    while let Some(step) = stack.pop() {
        match step {
            Step::Visit(path) => {
                let (kind, meta) = match classify(&path) {
                    Ok(found) => found,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        debug!("Entry {} vanished before removal", path.display());
                        continue;
                    }
                    Err(e) => {
                        warn!("Failed to inspect {}: {}", path.display(), e);
                        outcome.failed += 1;
                        continue;
                    }
                };

                match kind {
                    EntryKind::Link => outcome.record(&path, "link", remove_link(&path)),
                    EntryKind::File => outcome.record(&path, "file", fs::remove_file(&path)),
                    EntryKind::Dir => {
                        let listed = list_entries(&path);
                        // The listing follows links; refuse it if the entry was swapped meanwhile
                        if !still_same_dir(&path, &meta) {
                            warn!("{} changed while being cleared, skipping", path.display());
                            outcome.failed += 1;
                            continue;
                        }
                        let mut children: Vec<Step> =
                            listed.into_iter().map(Step::Visit).collect();
                        children.reverse();
                        stack.push(Step::RemoveDir(path));
                        stack.extend(children);
                    }
                }
            }
            Step::RemoveDir(path) => {
                outcome.record(&path, "directory", fs::remove_dir(&path));
            }
        }
    }

    outcome
}

fn classify(path: &Path) -> io::Result<(EntryKind, Metadata)> {
    let meta = fs::symlink_metadata(path)?;
    let file_type = meta.file_type();
    let kind = if file_type.is_symlink() {
        EntryKind::Link
    } else if file_type.is_dir() {
        EntryKind::Dir
    } else {
        EntryKind::File
    };
    Ok((kind, meta))
}

/// Whether `path` is still the real directory described by `before`
fn still_same_dir(path: &Path, before: &Metadata) -> bool {
    let Ok(now) = fs::symlink_metadata(path) else {
        return false;
    };
    if !now.file_type().is_dir() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        now.dev() == before.dev() && now.ino() == before.ino()
    }
    #[cfg(not(unix))]
    {
        before.file_type().is_dir()
    }
}

/// Remove a symlink itself, never its target
fn remove_link(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        // Directory symlinks and junctions on Windows are removed as directories
        #[cfg(windows)]
        Err(_) => fs::remove_dir(path),
        #[cfg(not(windows))]
        Err(e) => Err(e),
    }
}

fn is_self_or_parent(path: &Path) -> bool {
    match path.file_name() {
        Some(name) => name == "." || name == "..",
        None => true,
    }
}
