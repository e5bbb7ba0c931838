//! Client dependency installation
//!
//! Installing the client's dependencies is the most expensive step of a
//! run, so it is skipped when the pull reported nothing new and the
//! dependency directory is already there. Whatever happens, the directory
//! is checked again afterwards: launching without it would fail in ways
//! that are hard to diagnose.

use crate::config::schema::{ServerConfig, ToolsConfig};
use crate::error::{MintdevError, MintdevResult};
use crate::exec::{CommandRunner, ExternalCommand};
use crate::preview::probe::ToolAvailability;
use crate::preview::sync::SyncOutcome;
use crate::preview::DEPENDENCY_DIR;
use crate::ui::{InstallProgress, UiContext};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Dependency directory state after the install stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DependencyState {
    pub dependencies_materialized: bool,
    /// Whether an install command ran during this stage
    pub install_ran: bool,
}

/// Whether the install command should run this time
pub fn should_install(tools: &ToolAvailability, outcome: SyncOutcome, materialized: bool) -> bool {
    tools.internet_reachable && (outcome != SyncOutcome::AlreadyUpToDate || !materialized)
}

/// Installs the client's third-party dependencies
pub struct Installer<'a> {
    runner: &'a dyn CommandRunner,
    tools: &'a ToolsConfig,
    server: &'a ServerConfig,
    client_dir: &'a Path,
    ui: &'a UiContext,
}

impl<'a> Installer<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        tools: &'a ToolsConfig,
        server: &'a ServerConfig,
        client_dir: &'a Path,
        ui: &'a UiContext,
    ) -> Self {
        Self {
            runner,
            tools,
            server,
            client_dir,
            ui,
        }
    }

    /// Directory the package manager installs into
    pub fn dependency_dir(&self) -> PathBuf {
        self.client_dir.join(DEPENDENCY_DIR)
    }

    /// Whether the dependency directory exists
    pub fn dependencies_materialized(&self) -> bool {
        self.dependency_dir().is_dir()
    }

    /// Install when needed, then verify the dependency directory
    ///
    /// A missing package manager skips the install; the verification that
    /// follows decides whether that is fatal.
    ///
    /// # Errors
    ///
    /// - [`MintdevError::MissingDependenciesAfterInstall`] if the
    ///   dependency directory still does not exist.
    pub async fn ensure_dependencies(
        &self,
        tools: &ToolAvailability,
        outcome: SyncOutcome,
    ) -> MintdevResult<DependencyState> {
        let mut install_ran = false;

        if should_install(tools, outcome, self.dependencies_materialized()) {
            if tools.package_manager_present {
                self.run_install().await?;
                install_ran = true;
            } else {
                warn!(
                    "{} is not installed, skipping dependency install",
                    self.tools.package_manager
                );
            }
        } else {
            debug!("Dependencies unchanged (sync: {}), skipping install", outcome);
        }

        self.verify(install_ran)
    }

    /// Install unconditionally into an existing client
    ///
    /// # Errors
    ///
    /// - [`MintdevError::ClientMissing`] if the client has never been
    ///   acquired.
    /// - [`MintdevError::PackageManagerMissing`] if the package manager is
    ///   not installed.
    /// - [`MintdevError::MissingDependenciesAfterInstall`] if the install
    ///   did not produce the dependency directory.
    pub async fn install(&self, package_manager_present: bool) -> MintdevResult<DependencyState> {
        if !self.client_dir.is_dir() {
            return Err(MintdevError::ClientMissing(self.client_dir.to_path_buf()));
        }
        if !package_manager_present {
            return Err(MintdevError::PackageManagerMissing(
                self.tools.package_manager.clone(),
            ));
        }

        self.run_install().await?;
        self.verify(true)
    }

    /// Globally install the package manager through npm
    ///
    /// Returns whether the install command succeeded.
    pub async fn provision_package_manager(&self, cwd: &Path) -> MintdevResult<bool> {
        let cmd = ExternalCommand::new(&self.tools.npm, cwd).args([
            "install",
            "--global",
            self.tools.package_manager.as_str(),
        ]);

        info!("Installing {} globally", self.tools.package_manager);
        let output = self.runner.run(&cmd).await?;
        if !output.success {
            warn!("{} failed: {}", cmd, output.stderr.trim());
        }
        Ok(output.success)
    }

    async fn run_install(&self) -> MintdevResult<()> {
        let cmd = ExternalCommand::new(&self.tools.package_manager, self.client_dir)
            .args(self.server.install_args.iter().cloned());

        let progress = InstallProgress::new(self.ui, "dependencies");
        let output = self
            .runner
            .run_streaming(&cmd, &|line: String| progress.on_line(line))
            .await;
        progress.finish();

        let output = output?;
        if !output.success {
            warn!("{} exited with an error: {}", cmd, output.stderr.trim());
        }
        Ok(())
    }

    fn verify(&self, install_ran: bool) -> MintdevResult<DependencyState> {
        if !self.dependencies_materialized() {
            return Err(MintdevError::MissingDependenciesAfterInstall {
                client_dir: self.client_dir.to_path_buf(),
            });
        }

        Ok(DependencyState {
            dependencies_materialized: true,
            install_ran,
        })
    }
}
