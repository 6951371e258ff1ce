//! Command-line adapter
//!
//! Each invocation delivers one host notification or one admin action to
//! the library; the CLI itself holds no state between runs.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};
