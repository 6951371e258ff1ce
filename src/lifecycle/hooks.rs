//! Install and uninstall route hooks

use crate::audit::Journal;
use crate::error::AgentmdResult;
use crate::lifecycle::{EventBus, EventKind};
use crate::routes::{RouteRegistry, RouteRule};
use std::sync::Arc;
use tracing::info;

/// Keeps the persisted route table in step with install state
///
/// Install registers the `.md` rule and rebuilds unconditionally, so the
/// rule exists before the first request can need it. Uninstall removes
/// every rule this system owns, so nothing is left dispatching to a
/// handler that no longer exists.
pub struct LifecycleHookController {
    routes: Arc<dyn RouteRegistry>,
    rule: RouteRule,
    journal: Arc<Journal>,
}

impl LifecycleHookController {
    pub fn new(routes: Arc<dyn RouteRegistry>, rule: RouteRule, journal: Arc<Journal>) -> Self {
        Self {
            routes,
            rule,
            journal,
        }
    }

    /// Register the rule in-process (done on every load, like any routing setup)
    pub fn register_rule(&self) -> AgentmdResult<()> {
        self.routes.register(self.rule.clone())
    }

    /// Register the rule and rebuild the persisted table
    pub fn on_install(&self) -> AgentmdResult<()> {
        self.rebuild_with_rule("install")
    }

    /// Operator-requested rebuild, same effect as an install
    pub fn repair(&self) -> AgentmdResult<()> {
        self.rebuild_with_rule("manual")
    }

    fn rebuild_with_rule(&self, reason: &str) -> AgentmdResult<()> {
        self.register_rule()?;
        self.routes.rebuild()?;

        info!("Registered route {} ({})", self.rule.pattern, reason);
        self.journal.record(
            "routes.rebuilt",
            &serde_json::json!({"reason": reason, "pattern": self.rule.pattern}),
        );
        Ok(())
    }

    /// Remove this system's rules and rebuild, returning how many were dropped
    pub fn on_uninstall(&self) -> AgentmdResult<usize> {
        let removed = self.routes.remove_all(&self.rule.owner)?;
        self.routes.rebuild()?;

        info!("Removed {} route rule(s) owned by {}", removed, self.rule.owner);
        self.journal.record(
            "routes.removed",
            &serde_json::json!({"owner": self.rule.owner, "removed": removed}),
        );
        Ok(removed)
    }

    /// Subscribe to install, uninstall, activation and bootstrap events
    pub fn register(self: Arc<Self>, bus: &mut EventBus) {
        for kind in [EventKind::Installed, EventKind::Activated] {
            let this = Arc::clone(&self);
            bus.subscribe(kind, move |_| this.on_install());
        }

        for kind in [EventKind::Uninstalled, EventKind::Deactivated] {
            let this = Arc::clone(&self);
            bus.subscribe(kind, move |_| this.on_uninstall().map(|_| ()));
        }

        bus.subscribe(EventKind::Bootstrap, move |_| self.register_rule());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::testing::RecordingRoutes;
    use crate::lifecycle::HostEvent;
    use crate::routes::{FileRouteTable, OWNER};
    use tempfile::TempDir;

    fn controller(routes: &Arc<RecordingRoutes>) -> LifecycleHookController {
        LifecycleHookController::new(
            Arc::clone(routes) as Arc<dyn RouteRegistry>,
            RouteRule::markdown("mfa_markdown"),
            Arc::new(Journal::disabled()),
        )
    }

    #[test]
    fn install_registers_before_rebuild() {
        let routes = Arc::new(RecordingRoutes::default());

        controller(&routes).on_install().unwrap();

        assert_eq!(routes.rebuilds(), 1);
        assert_eq!(
            routes.rules().unwrap(),
            vec![RouteRule::markdown("mfa_markdown")]
        );
    }

    #[test]
    fn uninstall_removes_rules() {
        let routes = Arc::new(RecordingRoutes::default());
        let hooks = controller(&routes);
        hooks.on_install().unwrap();

        assert_eq!(hooks.on_uninstall().unwrap(), 1);
        assert!(routes.rules().unwrap().is_empty());
    }

    #[test]
    fn uninstall_without_install_is_harmless() {
        let routes = Arc::new(RecordingRoutes::default());
        assert_eq!(controller(&routes).on_uninstall().unwrap(), 0);
    }

    #[test]
    fn activation_events_use_file_table() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("routes.json");
        let routes: Arc<dyn RouteRegistry> = Arc::new(FileRouteTable::open(&path));
        let hooks = Arc::new(LifecycleHookController::new(
            Arc::clone(&routes),
            RouteRule::markdown("mfa_markdown"),
            Arc::new(Journal::disabled()),
        ));
        let mut bus = EventBus::new();
        hooks.register(&mut bus);

        bus.dispatch(&HostEvent::Activated).unwrap();
        assert_eq!(routes.rules().unwrap()[0].owner, OWNER);

        bus.dispatch(&HostEvent::Deactivated).unwrap();
        assert!(FileRouteTable::open(&path).rules().unwrap().is_empty());
    }

    #[test]
    fn repair_is_journaled_as_manual() {
        let temp = TempDir::new().unwrap();
        let journal_path = temp.path().join("journal.log");
        let routes = Arc::new(RecordingRoutes::default());
        let hooks = LifecycleHookController::new(
            Arc::clone(&routes) as Arc<dyn RouteRegistry>,
            RouteRule::markdown("mfa_markdown"),
            Arc::new(Journal::with_path(&journal_path)),
        );

        hooks.repair().unwrap();

        assert_eq!(routes.rebuilds(), 1);
        let line = std::fs::read_to_string(&journal_path).unwrap();
        let entry: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(entry["event"], "routes.rebuilt");
        assert_eq!(entry["data"]["reason"], "manual");
    }
}
