//! Routes command - inspect or rebuild the persisted route table

use crate::cli::args::{OutputFormat, RoutesAction, RoutesArgs};
use crate::config::Config;
use crate::error::AgentmdResult;
use crate::lifecycle::Lifecycle;
use crate::routes::{FileRouteTable, RouteTable};
use crate::ui::{self, UiContext};

/// Execute the routes command
pub async fn execute(args: RoutesArgs, config: &Config) -> AgentmdResult<()> {
    match args.action {
        RoutesAction::List { format } => list(config, format),
        RoutesAction::Rebuild => rebuild(config),
    }
}

fn list(config: &Config, format: OutputFormat) -> AgentmdResult<()> {
    let table = FileRouteTable::open(config.route_table_path()).table()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&table)?),
        OutputFormat::Plain => {
            for rule in &table.rules {
                println!("{}", rule.pattern);
            }
        }
        OutputFormat::Table => print_table(&table),
    }

    Ok(())
}

fn print_table(table: &RouteTable) {
    if table.rules.is_empty() {
        println!("No route rules persisted.");
        return;
    }

    println!("{:<28} {:<44} {:<12}", "PATTERN", "TARGET", "OWNER");
    println!("{}", "-".repeat(84));
    for rule in &table.rules {
        println!("{:<28} {:<44} {:<12}", rule.pattern, rule.target, rule.owner);
    }
    println!();

    let rebuilt = table
        .rebuilt_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string());
    println!("Generation {} (rebuilt {})", table.generation, rebuilt);
}

/// Register in-process, then persist, like an install
fn rebuild(config: &Config) -> AgentmdResult<()> {
    let ctx = UiContext::detect();
    Lifecycle::from_config(config)?.hooks().repair()?;
    ui::step_ok_detail(
        &ctx,
        "Route table rebuilt",
        &config.route_table_path().display().to_string(),
    );
    Ok(())
}
