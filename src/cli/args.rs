//! CLI argument definitions using clap derive

use crate::lifecycle::HostEvent;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// agentmd - Markdown cache lifecycle for agent-facing content
///
/// Flushes the rendered-markdown cache when the site's configuration
/// changes and keeps the `.md` route registered across upgrades. Host
/// hooks deliver lifecycle events with `agentmd event <kind>`.
#[derive(Parser, Debug)]
#[command(name = "agentmd")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "AGENTMD_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deliver a host lifecycle event
    Event(EventArgs),

    /// Inspect or flush the markdown cache
    Cache(CacheArgs),

    /// Inspect or rebuild the persisted route table
    Routes(RoutesArgs),

    /// Show running and stored versions
    Version,

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the event command
#[derive(Parser, Debug)]
pub struct EventArgs {
    #[command(subcommand)]
    pub kind: EventCommand,
}

/// Lifecycle events a host can deliver
#[derive(Subcommand, Debug, Clone)]
pub enum EventCommand {
    /// This system was activated
    Activated,
    /// This system was deactivated
    Deactivated,
    /// This system was installed
    Install,
    /// This system was uninstalled
    Uninstall,
    /// Host startup or request-cycle bootstrap
    Bootstrap,
    /// Another extension was activated
    PluginActivated {
        /// Extension identifier
        name: String,
    },
    /// Another extension was deactivated
    PluginDeactivated {
        /// Extension identifier
        name: String,
    },
    /// The presentation theme changed
    ThemeSwitched {
        /// New theme identifier
        theme: String,
    },
}

impl From<EventCommand> for HostEvent {
    fn from(cmd: EventCommand) -> Self {
        match cmd {
            EventCommand::Activated => Self::Activated,
            EventCommand::Deactivated => Self::Deactivated,
            EventCommand::Install => Self::Installed,
            EventCommand::Uninstall => Self::Uninstalled,
            EventCommand::Bootstrap => Self::Bootstrap,
            EventCommand::PluginActivated { name } => Self::PluginActivated { name },
            EventCommand::PluginDeactivated { name } => Self::PluginDeactivated { name },
            EventCommand::ThemeSwitched { theme } => Self::ThemeSwitched { theme },
        }
    }
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Delete every cached entry and re-protect the cache directory
    Flush {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show cache location, size and protection state
    Status {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Store rendered markdown for a content identity
    Put {
        /// Content identity (e.g. post:42)
        identity: String,

        /// Read markdown from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print cached markdown for a content identity
    Get {
        /// Content identity (e.g. post:42)
        identity: String,
    },
}

/// Arguments for the routes command
#[derive(Parser, Debug)]
pub struct RoutesArgs {
    #[command(subcommand)]
    pub action: RoutesAction,
}

/// Routes subcommands
#[derive(Subcommand, Debug)]
pub enum RoutesAction {
    /// List persisted route rules
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Register the markdown rule and rebuild the route table
    Rebuild,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., storage.base_dir)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_plugin_event() {
        let cli = Cli::parse_from(["agentmd", "event", "plugin-activated", "seo-tools"]);
        match cli.command {
            Commands::Event(args) => assert_eq!(
                HostEvent::from(args.kind),
                HostEvent::PluginActivated {
                    name: "seo-tools".to_string()
                }
            ),
            _ => panic!("expected Event command"),
        }
    }

    #[test]
    fn cli_parses_bootstrap() {
        let cli = Cli::parse_from(["agentmd", "event", "bootstrap"]);
        match cli.command {
            Commands::Event(args) => {
                assert_eq!(HostEvent::from(args.kind), HostEvent::Bootstrap)
            }
            _ => panic!("expected Event command"),
        }
    }

    #[test]
    fn cli_event_requires_theme_name() {
        assert!(Cli::try_parse_from(["agentmd", "event", "theme-switched"]).is_err());
    }

    #[test]
    fn cli_parses_cache_flush_yes() {
        let cli = Cli::parse_from(["agentmd", "cache", "flush", "-y"]);
        match cli.command {
            Commands::Cache(CacheArgs {
                action: CacheAction::Flush { yes },
            }) => assert!(yes),
            _ => panic!("expected Cache Flush command"),
        }
    }

    #[test]
    fn cli_parses_cache_status_json() {
        let cli = Cli::parse_from(["agentmd", "cache", "status", "--format", "json"]);
        assert!(matches!(
            cli.command,
            Commands::Cache(CacheArgs {
                action: CacheAction::Status {
                    format: OutputFormat::Json
                }
            })
        ));
    }

    #[test]
    fn cli_parses_version() {
        let cli = Cli::parse_from(["agentmd", "version"]);
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["agentmd", "version"]);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["agentmd", "-vv", "version"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_global_config_flag() {
        let cli = Cli::parse_from(["agentmd", "cache", "status", "--config", "/tmp/a.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/a.toml")));
    }
}
