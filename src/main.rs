//! agentmd - Markdown cache lifecycle controller
//!
//! CLI entry point that dispatches to subcommands.

use agentmd::cli::{Cli, Commands};
use agentmd::config::ConfigManager;
use agentmd::error::AgentmdResult;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            } else if e.is_retryable() {
                eprintln!("{} Safe to retry", style("Hint:").yellow());
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> AgentmdResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    // 0 = warn, 1 = info, 2+ = debug; RUST_LOG wins when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("agentmd=warn"),
        1 => EnvFilter::new("agentmd=info"),
        _ => EnvFilter::new("agentmd=debug"),
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if config.general.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.without_time().init();
    }

    debug!("Using config {}", config_manager.path().display());

    match cli.command {
        Commands::Event(args) => agentmd::cli::commands::event(args, &config).await,
        Commands::Cache(args) => agentmd::cli::commands::cache(args, &config).await,
        Commands::Routes(args) => agentmd::cli::commands::routes(args, &config).await,
        Commands::Version => agentmd::cli::commands::version(&config).await,
        Commands::Config(args) => {
            agentmd::cli::commands::config(args, &config_manager, &config).await
        }
    }
}
