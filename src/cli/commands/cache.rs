//! Cache command - inspect, flush and fill the markdown cache

use crate::audit::Journal;
use crate::cache::{format_bytes, CacheDirectoryManager, CacheStatus, CacheStore, WebAccess};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::error::{AgentmdError, AgentmdResult};
use crate::ui::{self, UiContext};
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> AgentmdResult<()> {
    let manager = CacheDirectoryManager::from_config(config);

    match args.action {
        CacheAction::Flush { yes } => flush(&manager, config, yes).await,
        CacheAction::Status { format } => status(&manager, format),
        CacheAction::Put { identity, file } => put(&manager, &identity, file),
        CacheAction::Get { identity } => get(&manager, &identity),
    }
}

async fn flush(manager: &CacheDirectoryManager, config: &Config, yes: bool) -> AgentmdResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);
    let root = manager.cache_root()?;

    if !ui::confirm(
        &ctx,
        &format!("Delete every cached entry in {}?", root.display()),
        false,
    )
    .await?
    {
        ui::outro_warn(&ctx, "Aborted, nothing removed");
        return Ok(());
    }

    let report = manager.flush_all();

    if !report.performed {
        ui::step_info(&ctx, "Cache directory does not exist, nothing to flush");
        return Ok(());
    }

    Journal::new(config).record(
        "cache.flushed",
        &serde_json::json!({"reason": "manual", "removed": report.removed, "failed": report.failed}),
    );

    ui::step_ok_detail(
        &ctx,
        "Cache flushed",
        &format!("{} entries removed", report.removed),
    );
    if report.failed > 0 {
        ui::step_warn_hint(
            &ctx,
            &format!("{} entries could not be removed", report.failed),
            "Run with -v to see which",
        );
    }
    if !report.protected {
        ui::step_error(&ctx, "Protection markers could not be written");
    }

    Ok(())
}

fn status(manager: &CacheDirectoryManager, format: OutputFormat) -> AgentmdResult<()> {
    let status = manager.status()?;

    match format {
        OutputFormat::Json => print_status_json(&status)?,
        OutputFormat::Plain => println!("{}", status.root.display()),
        OutputFormat::Table => print_status_table(&status),
    }

    Ok(())
}

fn print_status_table(status: &CacheStatus) {
    let ctx = UiContext::detect();

    ui::intro(&ctx, "Markdown cache");
    ui::key_value(&ctx, "root", &status.root.display().to_string());

    if !status.exists {
        ui::remark(&ctx, "Cache directory has not been created yet");
        return;
    }

    ui::key_value(&ctx, "entries", &status.entries.to_string());
    ui::key_value(&ctx, "size", &format_bytes(status.bytes));
    ui::key_value_status(
        &ctx,
        "protected",
        if status.protected { "yes" } else { "no" },
        status.protected,
    );
    ui::key_value_status(
        &ctx,
        "web access",
        &web_access_label(&status.web_access),
        matches!(status.web_access, WebAccess::Denied | WebAccess::EmptyIndex),
    );

    if !status.protected {
        ui::step_warn_hint(
            &ctx,
            "Cache directory may be browsable",
            "Run: agentmd cache flush --yes",
        );
    }
}

fn print_status_json(status: &CacheStatus) -> AgentmdResult<()> {
    let json = serde_json::json!({
        "root": status.root,
        "exists": status.exists,
        "protected": status.protected,
        "entries": status.entries,
        "bytes": status.bytes,
        "web_access": web_access_label(&status.web_access),
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn web_access_label(access: &WebAccess) -> String {
    match access {
        WebAccess::NotFound => "not found".to_string(),
        WebAccess::Denied => "denied".to_string(),
        WebAccess::EmptyIndex => "empty index".to_string(),
        WebAccess::Listing(names) => format!("listing ({} entries)", names.len()),
    }
}

fn put(manager: &CacheDirectoryManager, identity: &str, file: Option<PathBuf>) -> AgentmdResult<()> {
    let markdown = match file {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|e| AgentmdError::io(format!("reading {}", path.display()), e))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| AgentmdError::io("reading markdown from stdin", e))?;
            buf
        }
    };

    let path = CacheStore::new(manager).put(identity, &markdown)?;
    debug!("Stored {} bytes for {}", markdown.len(), identity);
    println!("{}", path.display());
    Ok(())
}

fn get(manager: &CacheDirectoryManager, identity: &str) -> AgentmdResult<()> {
    match CacheStore::new(manager).get(identity)? {
        Some(markdown) => {
            print!("{}", markdown);
            Ok(())
        }
        None => Err(AgentmdError::User(format!("Cache miss: {}", identity))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn web_access_labels() {
        assert_eq!(web_access_label(&WebAccess::Denied), "denied");
        assert_eq!(
            web_access_label(&WebAccess::Listing(vec!["a.md".to_string()])),
            "listing (1 entries)"
        );
    }
}
