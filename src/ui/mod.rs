//! Terminal output for agentmd commands
//!
//! Uses `cliclack` for styled output and prompts when attached to a
//! terminal, and plain `[OK]`/`[WARN]` lines when a host script or CI job
//! is driving the CLI.
//!
//! # Example
//!
//! ```rust,ignore
//! use agentmd::ui::{self, UiContext};
//!
//! let ctx = UiContext::detect().with_auto_yes(args.yes);
//!
//! ui::intro(&ctx, "Cache flush");
//! if ui::confirm(&ctx, "Delete every cached entry?", false).await? {
//!     ui::step_ok_detail(&ctx, "Flushed", "12 entries removed");
//! }
//! ui::step_ok(&ctx, "Done");
//! ```

mod context;
mod output;
mod prompts;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, outro_warn, remark, step_error, step_info, step_ok,
    step_ok_detail, step_warn_hint,
};
pub use prompts::confirm;
