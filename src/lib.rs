//! agentmd - Markdown cache lifecycle for agent-facing content
//!
//! Keeps a rendered-markdown cache honest across site changes: flushes it
//! when extensions or themes change, keeps its directory closed to web
//! browsing, and keeps the `.md` route registered across upgrades.

pub mod audit;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod options;
pub mod routes;
pub mod ui;

pub use error::{AgentmdError, AgentmdResult};
