//! Dev command - bootstrap the local client and serve the docs

use crate::audit::AuditLog;
use crate::cli::args::DevArgs;
use crate::config::Config;
use crate::error::{MintdevError, MintdevResult};
use crate::exec::SystemRunner;
use crate::preview::{Bootstrap, CacheLayout, LaunchOptions, SystemEnvironment};
use crate::ui::{self, UiContext};
use tracing::{debug, info};

/// Execute the dev command
///
/// Returns once the user presses Ctrl-C. The dev server keeps running; only
/// the change listener stops.
pub async fn execute(args: DevArgs, config: &Config) -> MintdevResult<()> {
    let mut config = config.clone();
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let project_dir =
        std::env::current_dir().map_err(|e| MintdevError::io("getting current directory", e))?;
    let layout = CacheLayout::from_config(&config)?;
    let audit = AuditLog::new(&config);

    debug!("Cache root: {}", layout.root().display());
    let (report, session) = Bootstrap::new(
        &SystemRunner,
        &SystemEnvironment,
        &config,
        &layout,
        &ctx,
        &audit,
    )
    .with_options(LaunchOptions {
        open_browser: !args.no_open,
    })
    .run(&project_dir)
    .await?;
    debug!("Bootstrap finished: {:?}", report.stages);

    if let Some(listener) = &session.listener {
        ui::remark(
            &ctx,
            &format!(
                "Watching {} for changes. Press Ctrl+C to stop.",
                listener.watched().display()
            ),
        );
    }

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| MintdevError::io("waiting for Ctrl+C", e))?;

    info!(
        "Stopping listener; dev server {} keeps running",
        session.dev_server.command
    );
    drop(session);
    Ok(())
}
