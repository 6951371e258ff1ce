//! Config command - show or edit configuration

use crate::cache::validate_subdir;
use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{AgentmdError, AgentmdResult};
use crate::ui::{self, UiContext};
use std::path::PathBuf;

/// Keys accepted by `config set`
const VALID_KEYS: &[&str] = &[
    "general.log_format",
    "general.audit_log",
    "storage.base_dir",
    "storage.cache_subdir",
    "options.path",
    "routes.table_path",
    "routes.query_var",
];

/// Execute the config command
pub async fn execute(args: ConfigArgs, manager: &ConfigManager, config: &Config) -> AgentmdResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, config, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> AgentmdResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> AgentmdResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;

    ui::step_ok_detail(
        &ctx,
        "Configuration initialized",
        &path.display().to_string(),
    );

    Ok(())
}

async fn set_value(
    manager: &ConfigManager,
    config: &Config,
    key: &str,
    value: &str,
) -> AgentmdResult<()> {
    let ctx = UiContext::detect();
    let mut config = config.clone();

    if let Err(e) = apply(&mut config, key, value) {
        if matches!(e, AgentmdError::ConfigKeyUnknown(_)) {
            ui::remark(&ctx, "Valid keys:");
            for key in VALID_KEYS {
                eprintln!("  {}", key);
            }
        }
        return Err(e);
    }
    manager.save(&config).await?;

    ui::step_ok(&ctx, &format!("Set {} = {}", key, value));
    Ok(())
}

/// Apply one dot-separated key to a config
///
/// An empty value clears optional path keys back to their defaults.
fn apply(config: &mut Config, key: &str, value: &str) -> AgentmdResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => {
            config.general.log_format = match value {
                "text" | "json" => value.to_string(),
                _ => {
                    return Err(AgentmdError::User(format!(
                        "Invalid log format: {}. Use text or json",
                        value
                    )))
                }
            }
        }
        ["general", "audit_log"] => config.general.audit_log = parse_bool(value)?,

        ["storage", "base_dir"] => config.storage.base_dir = optional_path(value),
        ["storage", "cache_subdir"] => {
            validate_subdir(value)?;
            config.storage.cache_subdir = value.to_string();
        }

        ["options", "path"] => config.options.path = optional_path(value),

        ["routes", "table_path"] => config.routes.table_path = optional_path(value),
        ["routes", "query_var"] => {
            if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(AgentmdError::User(format!(
                    "Invalid query variable: {:?}. Use letters, digits and underscores",
                    value
                )));
            }
            config.routes.query_var = value.to_string();
        }

        _ => return Err(AgentmdError::ConfigKeyUnknown(key.to_string())),
    }

    Ok(())
}

fn optional_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

fn parse_bool(value: &str) -> AgentmdResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(AgentmdError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_key_is_settable() {
        for key in VALID_KEYS {
            let mut config = Config::default();
            let value = match *key {
                "general.log_format" => "json",
                "general.audit_log" => "false",
                "routes.query_var" => "md_path",
                "storage.cache_subdir" => "md-cache",
                _ => "/tmp/agentmd-test",
            };
            apply(&mut config, key, value).unwrap_or_else(|e| panic!("{key}: {e}"));
        }
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut config = Config::default();
        let err = apply(&mut config, "vm.name", "x").unwrap_err();
        assert!(matches!(err, AgentmdError::ConfigKeyUnknown(k) if k == "vm.name"));
    }

    #[test]
    fn cache_subdir_must_be_a_single_component() {
        let mut config = Config::default();
        assert!(apply(&mut config, "storage.cache_subdir", "..").is_err());
        assert!(apply(&mut config, "storage.cache_subdir", "a/b").is_err());
        assert_eq!(config.storage.cache_subdir, "mfa-cache");
    }

    #[test]
    fn empty_value_clears_path() {
        let mut config = Config::default();
        apply(&mut config, "storage.base_dir", "/srv/uploads").unwrap();
        assert_eq!(config.storage.base_dir, Some(PathBuf::from("/srv/uploads")));
        apply(&mut config, "storage.base_dir", "").unwrap();
        assert_eq!(config.storage.base_dir, None);
    }

    #[test]
    fn log_format_is_checked() {
        let mut config = Config::default();
        assert!(apply(&mut config, "general.log_format", "xml").is_err());
        apply(&mut config, "general.audit_log", "no").unwrap();
        assert!(!config.general.audit_log);
    }
}
