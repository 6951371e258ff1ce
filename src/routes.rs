//! Route rules and the route registry port
//!
//! The host keeps two views of its routes: the rules registered in the
//! current process, and the persisted table the request dispatcher reads.
//! `rebuild` copies the first into the second and is the expensive global
//! operation (on Apache hosts it rewrites server configuration), so
//! callers gate it carefully.

use crate::error::{AgentmdError, AgentmdResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Owner tag for the rules this crate registers
pub const OWNER: &str = "agentmd";

/// Pattern matching a `.md`-suffixed request path
pub const MARKDOWN_PATTERN: &str = r"^(.+)\.md/?$";

/// A dispatch-table entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    /// Anchored request-path pattern
    pub pattern: String,
    /// Rewrite target handed to the dispatcher
    pub target: String,
    /// Component that registered the rule
    pub owner: String,
}

impl RouteRule {
    /// The `.md` suffix rule, forwarding the captured path in `query_var`
    pub fn markdown(query_var: &str) -> Self {
        Self {
            pattern: MARKDOWN_PATTERN.to_string(),
            target: format!("index.php?{}=$matches[1]", query_var),
            owner: OWNER.to_string(),
        }
    }

    /// Reject rules the dispatcher could not anchor
    pub fn validate(&self) -> AgentmdResult<()> {
        if !self.pattern.starts_with('^') {
            return Err(AgentmdError::RouteRuleInvalid {
                pattern: self.pattern.clone(),
                reason: "pattern must be anchored with '^'".to_string(),
            });
        }
        if self.target.is_empty() {
            return Err(AgentmdError::RouteRuleInvalid {
                pattern: self.pattern.clone(),
                reason: "target must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Route registry exposed by the host
pub trait RouteRegistry: Send + Sync {
    /// Register a rule in-process; re-registering a pattern replaces it
    fn register(&self, rule: RouteRule) -> AgentmdResult<()>;

    /// Drop every in-process rule registered by `owner`, returning how many
    fn remove_all(&self, owner: &str) -> AgentmdResult<usize>;

    /// Rules currently persisted for the dispatcher
    fn rules(&self) -> AgentmdResult<Vec<RouteRule>>;

    /// Persist the in-process rules (expensive, idempotent)
    fn rebuild(&self) -> AgentmdResult<()>;
}

/// On-disk form of the route table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteTable {
    /// Number of rebuilds that produced this table
    pub generation: u64,
    /// When the table was last rebuilt
    pub rebuilt_at: Option<DateTime<Utc>>,
    /// Persisted rules
    pub rules: Vec<RouteRule>,
}

/// Route registry persisting to a JSON file
pub struct FileRouteTable {
    path: PathBuf,
    registered: Mutex<Vec<RouteRule>>,
}

impl FileRouteTable {
    /// Open the table, seeding the in-process set from what is persisted
    ///
    /// A corrupt table is logged and ignored so a rebuild can repair it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let registered = match read_table(&path) {
            Ok(table) => table.rules,
            Err(e) => {
                warn!("Ignoring unreadable route table: {}", e);
                Vec::new()
            }
        };

        Self {
            path,
            registered: Mutex::new(registered),
        }
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted table
    pub fn table(&self) -> AgentmdResult<RouteTable> {
        read_table(&self.path)
    }

    fn lock(&self) -> AgentmdResult<std::sync::MutexGuard<'_, Vec<RouteRule>>> {
        self.registered
            .lock()
            .map_err(|_| AgentmdError::Internal("route registry lock poisoned".to_string()))
    }
}

impl RouteRegistry for FileRouteTable {
    fn register(&self, rule: RouteRule) -> AgentmdResult<()> {
        rule.validate()?;
        let mut registered = self.lock()?;
        registered.retain(|r| r.pattern != rule.pattern);
        debug!("Registered route {} -> {}", rule.pattern, rule.target);
        registered.push(rule);
        Ok(())
    }

    fn remove_all(&self, owner: &str) -> AgentmdResult<usize> {
        let mut registered = self.lock()?;
        let before = registered.len();
        registered.retain(|r| r.owner != owner);
        Ok(before - registered.len())
    }

    fn rules(&self) -> AgentmdResult<Vec<RouteRule>> {
        Ok(self.table()?.rules)
    }

    fn rebuild(&self) -> AgentmdResult<()> {
        let rules = self.lock()?.clone();
        let generation = read_table(&self.path).map(|t| t.generation).unwrap_or(0) + 1;
        let table = RouteTable {
            generation,
            rebuilt_at: Some(Utc::now()),
            rules,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AgentmdError::io(format!("creating directory {}", parent.display()), e)
            })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&table)?)
            .map_err(|e| AgentmdError::io(format!("writing route table {}", tmp.display()), e))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            AgentmdError::io(format!("replacing route table {}", self.path.display()), e)
        })?;

        info!(
            "Rebuilt route table {} (generation {}, {} rules)",
            self.path.display(),
            table.generation,
            table.rules.len()
        );
        Ok(())
    }
}

fn read_table(path: &Path) -> AgentmdResult<RouteTable> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(RouteTable::default()),
        Err(e) => {
            return Err(AgentmdError::io(
                format!("reading route table {}", path.display()),
                e,
            ))
        }
    };

    serde_json::from_str(&content).map_err(|e| AgentmdError::RouteTableCorrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
