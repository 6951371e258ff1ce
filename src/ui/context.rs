//! Interactive vs scripted environment detection

use std::io::IsTerminal;

/// Environment variables set by common CI systems
const CI_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "BUILDKITE",
    "JENKINS_URL",
    "TF_BUILD",
];

/// Decides how commands talk to the user
#[derive(Debug, Clone)]
pub struct UiContext {
    interactive: bool,
    auto_yes: bool,
}

impl UiContext {
    /// Detect the current environment
    ///
    /// Hosts usually deliver lifecycle events from hooks and cron jobs with
    /// no terminal attached; those get plain output and never block on a
    /// prompt.
    pub fn detect() -> Self {
        let attached = std::io::stdout().is_terminal() && std::io::stdin().is_terminal();
        let in_ci = CI_VARS.iter().any(|var| std::env::var_os(var).is_some());

        Self {
            interactive: attached && !in_ci,
            auto_yes: false,
        }
    }

    /// A context that never prompts (tests, host hooks)
    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            auto_yes: false,
        }
    }

    /// Approve every prompt (`--yes`)
    pub fn with_auto_yes(mut self, yes: bool) -> Self {
        self.auto_yes = yes;
        self
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn auto_yes(&self) -> bool {
        self.auto_yes
    }

    /// Whether to use cliclack styling instead of plain lines
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }
}
