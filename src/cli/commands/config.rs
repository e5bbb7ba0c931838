//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{MintdevError, MintdevResult};
use crate::ui::{self, UiContext};

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> MintdevResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> MintdevResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> MintdevResult<()> {
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
    ui::step_ok(
        &ctx,
        &format!("Configuration initialized at {}", path.display()),
    );

    Ok(())
}

async fn set_value(manager: &ConfigManager, key: &str, value: &str) -> MintdevResult<()> {
    let ctx = UiContext::detect();

    match manager.set_value(key, value).await {
        Ok(()) => {
            ui::step_ok(&ctx, &format!("Set {} = {}", key, value));
            Ok(())
        }
        Err(e @ MintdevError::ConfigKey(_)) => {
            ui::remark(&ctx, "Valid keys:");
            for key in ConfigManager::settable_keys() {
                ui::remark(&ctx, &format!("  {}", key));
            }
            Err(e)
        }
        Err(e) => Err(e),
    }
}
