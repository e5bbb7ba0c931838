//! Bootstrap state machine
//!
//! ```text
//! Init → Probed → Classified → Synced → DepsEnsured → Launched
//!                                 │           │
//!                                 ▼           ▼
//!                          NoVersionControl  MissingDependenciesAfterInstall
//! ```
//!
//! There is no retry loop. A fatal exit is returned as an error to the
//! entry point, and the next invocation starts over at `Init`, deriving
//! everything from disk again.

use crate::audit::AuditLog;
use crate::config::Config;
use crate::error::MintdevResult;
use crate::exec::CommandRunner;
use crate::preview::deps::{DependencyState, Installer};
use crate::preview::launch::{Launcher, Session};
use crate::preview::probe::{self, Environment, ToolAvailability};
use crate::preview::state::{self, InstallationState};
use crate::preview::sync::{SyncOutcome, Synchronizer};
use crate::preview::CacheLayout;
use crate::ui::{self, TaskSpinner, UiContext};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// Bootstrap progress markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapStage {
    Init,
    Probed,
    Classified,
    Synced,
    DepsEnsured,
    Launched,
}

impl fmt::Display for BootstrapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Probed => "probed",
            Self::Classified => "classified",
            Self::Synced => "synced",
            Self::DepsEnsured => "deps_ensured",
            Self::Launched => "launched",
        };
        f.write_str(name)
    }
}

/// Launch-time switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchOptions {
    pub open_browser: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self { open_browser: true }
    }
}

/// What a bootstrap run observed and decided
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    pub stages: Vec<BootstrapStage>,
    pub tools: ToolAvailability,
    pub installation: InstallationState,
    pub sync: SyncOutcome,
    pub dependencies: DependencyState,
    pub first_installation: bool,
}

/// Sequences probe, classify, sync, install and launch
pub struct Bootstrap<'a> {
    runner: &'a dyn CommandRunner,
    env: &'a dyn Environment,
    config: &'a Config,
    layout: &'a CacheLayout,
    ui: &'a UiContext,
    audit: &'a AuditLog,
    options: LaunchOptions,
}

impl<'a> Bootstrap<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        env: &'a dyn Environment,
        config: &'a Config,
        layout: &'a CacheLayout,
        ui: &'a UiContext,
        audit: &'a AuditLog,
    ) -> Self {
        Self {
            runner,
            env,
            config,
            layout,
            ui,
            audit,
            options: LaunchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: LaunchOptions) -> Self {
        self.options = options;
        self
    }

    /// Run every stage and launch the preview for `project_dir`
    pub async fn run(&self, project_dir: &Path) -> MintdevResult<(BootstrapReport, Session)> {
        let result = self.run_stages(project_dir).await;
        self.audit_failure(result).await
    }

    /// Run every stage up to and including dependency installation
    pub async fn prepare(&self) -> MintdevResult<BootstrapReport> {
        let result = self.prepare_stages().await;
        self.audit_failure(result).await
    }

    async fn run_stages(&self, project_dir: &Path) -> MintdevResult<(BootstrapReport, Session)> {
        let mut report = self.prepare_stages().await?;
        let session = Launcher::new(self.runner, self.config, self.ui, self.options.open_browser)
            .launch(self.layout.client_dir(), project_dir)
            .await?;
        self.advance(&mut report.stages, BootstrapStage::Launched)
            .await;

        self.audit
            .log(
                "bootstrap.launched",
                &serde_json::json!({
                    "url": session.url,
                    "pid": session.dev_server.pid,
                    "project": project_dir.display().to_string(),
                }),
            )
            .await;
        Ok((report, session))
    }

    async fn prepare_stages(&self) -> MintdevResult<BootstrapReport> {
        let mut stages = Vec::new();
        self.advance(&mut stages, BootstrapStage::Init).await;
        self.layout.ensure_mint_dir().await?;

        let mut spinner = TaskSpinner::new(self.ui);
        spinner.start("Starting a local Mintlify instance...");

        let mut tools = probe::probe(self.env, &self.config.tools).await;
        if !tools.package_manager_present {
            spinner.clear();
            tools.package_manager_present = self.provision_package_manager().await?;
            spinner.start("Starting a local Mintlify instance...");
        }
        self.advance(&mut stages, BootstrapStage::Probed).await;

        let mint_dir = self.layout.mint_dir();
        let installation = state::classify(self.runner, &self.config.tools.git, mint_dir).await;
        let first_installation = installation != InstallationState::Current;
        info!("Local client is {}", installation);
        self.advance(&mut stages, BootstrapStage::Classified).await;

        if first_installation {
            spinner.message("Initializing local Mintlify instance...");
        } else {
            spinner.message("Syncing local Mintlify instance...");
        }
        let sync = match Synchronizer::new(self.runner, &self.config.tools.git, &self.config.upstream)
            .sync(mint_dir, &tools, installation)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                spinner.stop_error(&e.to_string());
                return Err(e);
            }
        };
        if first_installation {
            spinner.stop("Mintlify client downloaded");
        } else {
            spinner.clear();
        }
        info!("Sync outcome: {}", sync);
        self.advance(&mut stages, BootstrapStage::Synced).await;

        let dependencies = match self.installer().ensure_dependencies(&tools, sync).await {
            Ok(state) => state,
            Err(e) => {
                ui::step_error(self.ui, &e.to_string());
                return Err(e);
            }
        };
        if dependencies.install_ran {
            if first_installation {
                ui::step_ok(self.ui, "Installation complete");
            } else {
                ui::step_ok(self.ui, "Dependencies updated");
            }
        }
        self.advance(&mut stages, BootstrapStage::DepsEnsured).await;

        Ok(BootstrapReport {
            stages,
            tools,
            installation,
            sync,
            dependencies,
            first_installation,
        })
    }

    /// Offer to install a missing package manager; returns whether it is present now
    async fn provision_package_manager(&self) -> MintdevResult<bool> {
        let name = &self.config.tools.package_manager;
        let prompt = format!("{} must be globally installed. Install {}?", name, name);
        if !ui::confirm(self.ui, &prompt, true).await? {
            ui::step_warn(self.ui, "Installation cancelled.");
            return Ok(false);
        }

        match self
            .installer()
            .provision_package_manager(self.layout.root())
            .await
        {
            Ok(true) => Ok(self.env.has_tool(name)),
            Ok(false) => Ok(false),
            Err(e) => {
                warn!("Could not install {}: {}", name, e);
                Ok(false)
            }
        }
    }

    fn installer(&self) -> Installer<'_> {
        Installer::new(
            self.runner,
            &self.config.tools,
            &self.config.server,
            self.layout.client_dir(),
            self.ui,
        )
    }

    async fn advance(&self, stages: &mut Vec<BootstrapStage>, stage: BootstrapStage) {
        info!("Bootstrap stage: {}", stage);
        stages.push(stage);
        self.audit
            .log("bootstrap.stage", &serde_json::json!({ "stage": stage }))
            .await;
    }

    async fn audit_failure<T>(&self, result: MintdevResult<T>) -> MintdevResult<T> {
        if let Err(e) = &result {
            let event = if e.is_fatal_bootstrap() {
                "bootstrap.fatal"
            } else {
                "bootstrap.error"
            };
            self.audit
                .log(
                    event,
                    &serde_json::json!({ "kind": e.kind(), "message": e.to_string() }),
                )
                .await;
        }
        result
    }
}
