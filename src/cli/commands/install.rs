//! Install command - reinstall the local client's dependencies

use crate::audit::AuditLog;
use crate::cli::args::InstallArgs;
use crate::config::Config;
use crate::error::{MintdevError, MintdevResult};
use crate::exec::SystemRunner;
use crate::preview::{CacheLayout, Environment, Installer, SystemEnvironment};
use crate::ui::{self, UiContext};

/// Execute the install command
///
/// Always runs the package manager, regardless of whether the last sync
/// brought anything new.
pub async fn execute(args: InstallArgs, config: &Config) -> MintdevResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let layout = CacheLayout::from_config(config)?;
    let audit = AuditLog::new(config);
    let env = SystemEnvironment;

    ui::intro(&ctx, "mintdev install");

    if !layout.client_dir().is_dir() {
        return Err(MintdevError::ClientMissing(layout.client_dir().to_path_buf()));
    }

    let installer = Installer::new(
        &SystemRunner,
        &config.tools,
        &config.server,
        layout.client_dir(),
        &ctx,
    );

    let name = &config.tools.package_manager;
    let mut present = env.has_tool(name);
    if !present {
        let prompt = format!("{} must be globally installed. Install {}?", name, name);
        if ui::confirm(&ctx, &prompt, true).await? {
            present = installer.provision_package_manager(layout.root()).await?
                && env.has_tool(name);
        }
    }

    match installer.install(present).await {
        Ok(_) => {
            audit
                .log(
                    "install.completed",
                    &serde_json::json!({ "client": layout.client_dir().display().to_string() }),
                )
                .await;
            ui::outro_success(&ctx, "Dependencies installed");
            Ok(())
        }
        Err(e) => {
            audit
                .log(
                    "install.failed",
                    &serde_json::json!({ "kind": e.kind(), "message": e.to_string() }),
                )
                .await;
            Err(e)
        }
    }
}
