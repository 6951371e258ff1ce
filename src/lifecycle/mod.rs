//! Host lifecycle events and their handlers
//!
//! The host delivers zero-argument notifications (activation, bootstrap,
//! theme switch, ...). Handlers subscribe on an [`EventBus`] by event
//! kind and run synchronously in registration order. The host is expected
//! to serialize events; nothing here locks against concurrent dispatch.

pub mod hooks;
pub mod triggers;
pub mod version;

pub use hooks::LifecycleHookController;
pub use triggers::InvalidationTriggerRegistry;
pub use version::{GateOutcome, VersionGate, VERSION_OPTION};

use crate::audit::Journal;
use crate::cache::CacheDirectoryManager;
use crate::config::Config;
use crate::error::AgentmdResult;
use crate::options::{FileOptionStore, OptionStore};
use crate::routes::{FileRouteTable, RouteRegistry, RouteRule};
use semver::Version;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// A notification delivered by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// This system was activated
    Activated,
    /// This system was deactivated
    Deactivated,
    /// This system was installed
    Installed,
    /// This system was uninstalled
    Uninstalled,
    /// Host startup / request-cycle bootstrap
    Bootstrap,
    /// Another extension became active
    PluginActivated { name: String },
    /// Another extension became inactive
    PluginDeactivated { name: String },
    /// The presentation theme changed
    ThemeSwitched { theme: String },
}

impl HostEvent {
    /// Kind used for subscription
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Activated => EventKind::Activated,
            Self::Deactivated => EventKind::Deactivated,
            Self::Installed => EventKind::Installed,
            Self::Uninstalled => EventKind::Uninstalled,
            Self::Bootstrap => EventKind::Bootstrap,
            Self::PluginActivated { .. } => EventKind::PluginActivated,
            Self::PluginDeactivated { .. } => EventKind::PluginDeactivated,
            Self::ThemeSwitched { .. } => EventKind::ThemeSwitched,
        }
    }
}

/// Event kinds handlers subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Activated,
    Deactivated,
    Installed,
    Uninstalled,
    Bootstrap,
    PluginActivated,
    PluginDeactivated,
    ThemeSwitched,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Activated => "activated",
            Self::Deactivated => "deactivated",
            Self::Installed => "installed",
            Self::Uninstalled => "uninstalled",
            Self::Bootstrap => "bootstrap",
            Self::PluginActivated => "plugin-activated",
            Self::PluginDeactivated => "plugin-deactivated",
            Self::ThemeSwitched => "theme-switched",
        };
        write!(f, "{}", name)
    }
}

/// Event handler signature
pub type Handler = Box<dyn Fn(&HostEvent) -> AgentmdResult<()> + Send + Sync>;

/// Synchronous observer registry
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<(EventKind, Handler)>,
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a handler to one event kind
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F)
    where
        F: Fn(&HostEvent) -> AgentmdResult<()> + Send + Sync + 'static,
    {
        self.handlers.push((kind, Box::new(handler)));
    }

    /// Number of handlers subscribed to `kind`
    pub fn subscribers(&self, kind: EventKind) -> usize {
        self.handlers.iter().filter(|(k, _)| *k == kind).count()
    }

    /// Deliver an event to every matching handler
    ///
    /// All handlers run even if one fails; the first error is returned.
    /// On success returns the number of handlers invoked.
    pub fn dispatch(&self, event: &HostEvent) -> AgentmdResult<usize> {
        let kind = event.kind();
        let mut invoked = 0;
        let mut first_error = None;

        for (_, handler) in self.handlers.iter().filter(|(k, _)| *k == kind) {
            invoked += 1;
            if let Err(e) = handler(event) {
                warn!("Handler for {} failed: {}", kind, e);
                first_error.get_or_insert(e);
            }
        }

        debug!("Dispatched {} to {} handler(s)", kind, invoked);
        match first_error {
            Some(e) => Err(e),
            None => Ok(invoked),
        }
    }
}

/// Everything the lifecycle handlers operate on
pub struct Lifecycle {
    pub cache: Arc<CacheDirectoryManager>,
    pub routes: Arc<dyn RouteRegistry>,
    pub options: Arc<dyn OptionStore>,
    pub journal: Arc<Journal>,
    pub rule: RouteRule,
    pub current_version: Version,
}

impl Lifecycle {
    /// Assemble the file-backed lifecycle described by configuration
    pub fn from_config(config: &Config) -> AgentmdResult<Self> {
        Ok(Self {
            cache: Arc::new(CacheDirectoryManager::from_config(config)),
            routes: Arc::new(FileRouteTable::open(config.route_table_path())),
            options: Arc::new(FileOptionStore::new(config.options_path())),
            journal: Arc::new(Journal::new(config)),
            rule: RouteRule::markdown(&config.routes.query_var),
            current_version: version::running_version()?,
        })
    }

    /// Cache flush triggers bound to this lifecycle
    pub fn triggers(&self) -> Arc<InvalidationTriggerRegistry> {
        Arc::new(InvalidationTriggerRegistry::new(
            Arc::clone(&self.cache),
            Arc::clone(&self.journal),
        ))
    }

    /// Install/uninstall hooks bound to this lifecycle
    pub fn hooks(&self) -> Arc<LifecycleHookController> {
        Arc::new(LifecycleHookController::new(
            Arc::clone(&self.routes),
            self.rule.clone(),
            Arc::clone(&self.journal),
        ))
    }

    /// Version gate bound to this lifecycle
    pub fn version_gate(&self) -> Arc<VersionGate> {
        Arc::new(VersionGate::new(
            Arc::clone(&self.options),
            Arc::clone(&self.routes),
            self.current_version.clone(),
            Arc::clone(&self.journal),
        ))
    }

    /// Build a bus with every lifecycle handler subscribed
    ///
    /// Hooks subscribe before the version gate so the route rule is
    /// registered in-process before a bootstrap rebuild persists it.
    pub fn event_bus(&self) -> EventBus {
        let mut bus = EventBus::new();
        self.triggers().register(&mut bus);
        self.hooks().register(&mut bus);
        self.version_gate().register(&mut bus);
        bus
    }
}
