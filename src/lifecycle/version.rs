//! Version-gated route rebuild
//!
//! A rebuild may rewrite server configuration, so it is far too expensive
//! to run on every bootstrap. The gate compares a persisted marker with
//! the running version and pays for the rebuild once per upgrade.

use crate::audit::Journal;
use crate::error::AgentmdResult;
use crate::lifecycle::{EventBus, EventKind};
use crate::options::OptionStore;
use crate::routes::RouteRegistry;
use semver::Version;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Option key holding the last version that completed its rebuild
pub const VERSION_OPTION: &str = "mfa_version";

/// Marker value assumed when nothing is stored
pub const FLOOR_VERSION: Version = Version::new(0, 0, 0);

/// Version of the running artifact
pub fn running_version() -> AgentmdResult<Version> {
    Ok(Version::parse(env!("CARGO_PKG_VERSION"))?)
}

/// What a bootstrap check did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Routes were rebuilt and the marker advanced
    Upgraded { from: Version, to: Version },
    /// Stored marker is current; nothing ran
    UpToDate { stored: Version },
}

/// Compares the stored marker with the running version
pub struct VersionGate {
    options: Arc<dyn OptionStore>,
    routes: Arc<dyn RouteRegistry>,
    current: Version,
    journal: Arc<Journal>,
}

impl VersionGate {
    pub fn new(
        options: Arc<dyn OptionStore>,
        routes: Arc<dyn RouteRegistry>,
        current: Version,
        journal: Arc<Journal>,
    ) -> Self {
        Self {
            options,
            routes,
            current,
            journal,
        }
    }

    /// Running version this gate compares against
    pub fn current(&self) -> &Version {
        &self.current
    }

    /// Read the persisted marker, falling back to the floor version
    ///
    /// Read failures and unparsable values are logged and treated as
    /// unset, which at worst costs one extra rebuild.
    pub fn stored_version(&self) -> Version {
        let raw = match self.options.get(VERSION_OPTION) {
            Ok(Some(raw)) => raw,
            Ok(None) => return FLOOR_VERSION,
            Err(e) => {
                warn!("Failed to read {}: {}", VERSION_OPTION, e);
                return FLOOR_VERSION;
            }
        };

        match Version::parse(raw.trim()) {
            Ok(version) => version,
            Err(e) => {
                warn!("Ignoring unparsable {} {:?}: {}", VERSION_OPTION, raw, e);
                FLOOR_VERSION
            }
        }
    }

    /// Run the gate for one bootstrap
    pub fn on_bootstrap(&self) -> GateOutcome {
        let stored = self.stored_version();

        if self.current <= stored {
            debug!("Routes current for {} (stored {})", self.current, stored);
            return GateOutcome::UpToDate { stored };
        }

        info!("Upgrade {} -> {}, rebuilding routes", stored, self.current);
        // No rollback: the marker advances even if the rebuild reported an error
        if let Err(e) = self.routes.rebuild() {
            warn!("Route rebuild failed during upgrade: {}", e);
        }

        if let Err(e) = self.options.set(VERSION_OPTION, &self.current.to_string()) {
            warn!(
                "Failed to persist {}, rebuild will repeat on next bootstrap: {}",
                VERSION_OPTION, e
            );
        }

        self.journal.record(
            "version.upgraded",
            &serde_json::json!({
                "from": stored.to_string(),
                "to": self.current.to_string(),
            }),
        );

        GateOutcome::Upgraded {
            from: stored,
            to: self.current.clone(),
        }
    }

    /// Subscribe the gate to bootstrap events
    pub fn register(self: Arc<Self>, bus: &mut EventBus) {
        bus.subscribe(EventKind::Bootstrap, move |_| {
            self.on_bootstrap();
            Ok(())
        });
    }
}
