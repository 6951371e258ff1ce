//! On-disk markdown cache
//!
//! Rendered markdown is a derived artifact: any entry can be deleted at
//! any time and will be regenerated on the next read. That makes the
//! invalidation policy coarse on purpose. Whenever the surrounding
//! configuration changes, the whole cache root is cleared.
//!
//! # Safety Model
//!
//! - Links inside the cache are removed as links, never followed
//! - The cache root itself is never deleted, only its contents
//! - Protection markers are re-applied as the last step of every flush
//! - Individual deletion failures are logged and skipped
//!
//! # Layout
//!
//! | Path | Purpose |
//! |------|---------|
//! | `<base>/mfa-cache/` | cache root |
//! | `<base>/mfa-cache/.htaccess` | deny-all marker |
//! | `<base>/mfa-cache/index.html` | listing suppressor |
//! | `<base>/mfa-cache/<sha256-prefix>.md` | cached entry |

pub mod fsops;
pub mod manager;
pub mod protect;
pub mod store;

pub use fsops::{clear_contents, delete_entry, list_entries, DeleteOutcome};
pub use manager::{
    format_bytes, validate_subdir, CacheDirectoryManager, CacheStatus, FixedLocator, FlushReport,
    StorageLocator,
};
pub use protect::{is_protected, protect, web_probe, WebAccess};
pub use store::{entry_name, CacheStore};
