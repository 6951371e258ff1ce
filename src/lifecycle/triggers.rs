//! Full-cache invalidation triggers
//!
//! Cached markdown may depend on filters contributed by other active
//! extensions or by the theme. There is no way to tell which entries a
//! change affected without re-rendering them, so any such change flushes
//! everything.

use crate::audit::Journal;
use crate::cache::{CacheDirectoryManager, FlushReport};
use crate::lifecycle::{EventBus, EventKind, HostEvent};
use std::sync::Arc;
use tracing::info;

/// Binds extension and theme changes to a full cache flush
pub struct InvalidationTriggerRegistry {
    cache: Arc<CacheDirectoryManager>,
    journal: Arc<Journal>,
}

impl InvalidationTriggerRegistry {
    pub fn new(cache: Arc<CacheDirectoryManager>, journal: Arc<Journal>) -> Self {
        Self { cache, journal }
    }

    /// Another extension was activated or deactivated
    pub fn on_plugin_state_changed(&self, plugin: &str) -> FlushReport {
        self.flush(&format!("plugin {}", plugin))
    }

    /// The active theme changed
    pub fn on_theme_changed(&self, theme: &str) -> FlushReport {
        self.flush(&format!("theme {}", theme))
    }

    fn flush(&self, reason: &str) -> FlushReport {
        info!("Invalidating markdown cache: {} changed", reason);
        let report = self.cache.flush_all();

        if report.performed {
            self.journal.record(
                "cache.flushed",
                &serde_json::json!({
                    "reason": reason,
                    "root": report.root,
                    "removed": report.removed,
                    "failed": report.failed,
                    "protected": report.protected,
                }),
            );
        }
        report
    }

    /// Subscribe the flush to extension and theme events
    pub fn register(self: Arc<Self>, bus: &mut EventBus) {
        for kind in [EventKind::PluginActivated, EventKind::PluginDeactivated] {
            let this = Arc::clone(&self);
            bus.subscribe(kind, move |event| {
                if let HostEvent::PluginActivated { name } | HostEvent::PluginDeactivated { name } =
                    event
                {
                    this.on_plugin_state_changed(name);
                }
                Ok(())
            });
        }

        bus.subscribe(EventKind::ThemeSwitched, move |event| {
            if let HostEvent::ThemeSwitched { theme } = event {
                self.on_theme_changed(theme);
            }
            Ok(())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{list_entries, protect, FixedLocator};
    use std::fs;
    use tempfile::TempDir;

    fn registry(base: &TempDir, journal: Journal) -> Arc<InvalidationTriggerRegistry> {
        let cache = CacheDirectoryManager::new(
            Box::new(FixedLocator(base.path().to_path_buf())),
            "mfa-cache",
        );
        Arc::new(InvalidationTriggerRegistry::new(
            Arc::new(cache),
            Arc::new(journal),
        ))
    }

    #[test]
    fn plugin_change_flushes() {
        let base = TempDir::new().unwrap();
        let root = base.path().join("mfa-cache");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("sub").join("b.md"), "# b").unwrap();

        let report = registry(&base, Journal::disabled()).on_plugin_state_changed("seo-tools");

        assert!(report.performed);
        assert_eq!(report.removed, 2);
        assert!(!root.join("sub").exists());
    }

    #[test]
    fn theme_change_without_cache_is_noop() {
        let base = TempDir::new().unwrap();

        let report = registry(&base, Journal::disabled()).on_theme_changed("classic");

        assert!(!report.performed);
        assert!(list_entries(base.path()).is_empty());
    }

    #[test]
    fn bus_events_reach_flush() {
        let base = TempDir::new().unwrap();
        let journal_dir = TempDir::new().unwrap();
        let journal = Journal::with_path(journal_dir.path().join("journal.log"));
        let root = base.path().join("mfa-cache");
        fs::create_dir_all(&root).unwrap();

        let mut bus = EventBus::new();
        registry(&base, journal).register(&mut bus);

        for event in [
            HostEvent::PluginActivated {
                name: "a".to_string(),
            },
            HostEvent::PluginDeactivated {
                name: "a".to_string(),
            },
            HostEvent::ThemeSwitched {
                theme: "b".to_string(),
            },
        ] {
            fs::write(root.join("entry.md"), "# cached").unwrap();
            assert_eq!(bus.dispatch(&event).unwrap(), 1);
            assert!(!root.join("entry.md").exists());
            assert!(protect::is_protected(&root));
        }

        let journal = fs::read_to_string(journal_dir.path().join("journal.log")).unwrap();
        assert_eq!(journal.lines().count(), 3);
        assert!(journal.contains("cache.flushed"));
    }
}
