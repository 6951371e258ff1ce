//! Confirmation prompt with non-interactive fallback

use super::context::UiContext;
use crate::error::{AgentmdError, AgentmdResult};

/// Ask for confirmation
///
/// Returns `true` under `--yes`, and `default` when nobody is there to
/// answer.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> AgentmdResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    // cliclack blocks on stdin
    let message = message.to_string();
    let result = tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| AgentmdError::User(format!("Prompt task failed: {}", e)))?;

    result.map_err(|e| AgentmdError::User(format!("Prompt failed: {}", e)))
}
