//! Version command - compare running and stored versions

use crate::config::Config;
use crate::error::AgentmdResult;
use crate::lifecycle::Lifecycle;
use crate::ui::{self, UiContext};

/// Execute the version command
pub async fn execute(config: &Config) -> AgentmdResult<()> {
    let ctx = UiContext::detect();
    let gate = Lifecycle::from_config(config)?.version_gate();
    let stored = gate.stored_version();

    ui::key_value(&ctx, "running", &gate.current().to_string());
    ui::key_value_status(&ctx, "stored", &stored.to_string(), *gate.current() <= stored);

    if *gate.current() > stored {
        ui::remark(&ctx, "Next bootstrap rebuilds the route table");
    }

    Ok(())
}
