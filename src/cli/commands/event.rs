//! Event command - deliver one host lifecycle notification

use crate::cli::args::EventArgs;
use crate::config::Config;
use crate::error::AgentmdResult;
use crate::lifecycle::{HostEvent, Lifecycle};
use crate::ui::{self, UiContext};
use tracing::info;

/// Execute the event command
///
/// Host hooks call this without a terminal, so it never prompts.
pub async fn execute(args: EventArgs, config: &Config) -> AgentmdResult<()> {
    let ctx = UiContext::non_interactive();
    let event = HostEvent::from(args.kind);
    let lifecycle = Lifecycle::from_config(config)?;
    let bus = lifecycle.event_bus();

    info!("Delivering {} event", event.kind());
    match bus.dispatch(&event) {
        Ok(handlers) => {
            ui::step_ok_detail(
                &ctx,
                &format!("Handled {}", event.kind()),
                &format!("{} handler(s)", handlers),
            );
            Ok(())
        }
        Err(e) => {
            ui::step_error(&ctx, &format!("Handling {} failed", event.kind()));
            Err(e)
        }
    }
}
