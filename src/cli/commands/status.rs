//! Status command - report tools, cache state and paths
//!
//! Read-only: nothing is created, pulled or installed.

use crate::config::Config;
use crate::error::MintdevResult;
use crate::exec::SystemRunner;
use crate::preview::probe;
use crate::preview::state::{self, InstallationState};
use crate::preview::{CacheLayout, SystemEnvironment};
use crate::ui::{self, UiContext};
use std::path::Path;

/// Execute the status command
pub async fn execute(config: &Config, config_path: &Path) -> MintdevResult<()> {
    let ctx = UiContext::detect();
    let layout = CacheLayout::from_config(config)?;

    ui::intro(&ctx, "mintdev status");

    let tools = probe::probe(&SystemEnvironment, &config.tools).await;
    ui::section(&ctx, "Tools");
    ui::key_value_status(&ctx, &config.tools.git, found(tools.git_present), tools.git_present);
    ui::key_value_status(
        &ctx,
        &config.tools.package_manager,
        found(tools.package_manager_present),
        tools.package_manager_present,
    );
    ui::key_value_status(
        &ctx,
        "network",
        if tools.internet_reachable {
            "reachable"
        } else {
            "offline"
        },
        tools.internet_reachable,
    );

    let installation =
        state::classify(&SystemRunner, &config.tools.git, layout.mint_dir()).await;
    let materialized = layout.dependency_dir().is_dir();

    ui::section(&ctx, "Local client");
    ui::key_value_status(
        &ctx,
        "installation",
        &installation.to_string(),
        installation == InstallationState::Current,
    );
    ui::key_value_status(
        &ctx,
        "dependencies",
        if materialized { "installed" } else { "missing" },
        materialized,
    );

    ui::section(&ctx, "Paths");
    ui::key_value(&ctx, "cache", &layout.root().display().to_string());
    ui::key_value(&ctx, "client", &layout.client_dir().display().to_string());
    ui::key_value(&ctx, "config", &config_path.display().to_string());

    if installation == InstallationState::Current && materialized {
        ui::outro_success(&ctx, "Ready to preview");
    } else {
        ui::outro_warn(&ctx, "Run `mintdev dev` to set up the local preview");
    }

    Ok(())
}

fn found(present: bool) -> &'static str {
    if present {
        "found"
    } else {
        "missing"
    }
}
