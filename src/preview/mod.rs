//! Local preview bootstrap
//!
//! Provisions a cached copy of the upstream client application, keeps it in
//! sync, installs its dependencies and launches the dev server.
//!
//! # Pipeline
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Probe | [`probe`] | [`ToolAvailability`] |
//! | Classify | [`state`] | [`InstallationState`] |
//! | Sync | [`sync`] | [`SyncOutcome`] |
//! | Install | [`deps`] | [`DependencyState`] |
//! | Launch | [`launch`] | [`Session`] |
//!
//! Stages run strictly in order and none is re-entered within a run. Every
//! run derives its state from disk again, so a failed run is recovered by
//! simply running again.
//!
//! Two bootstrap runs must not target the same cache directory at once.
//! This is assumed, not enforced.

pub mod deps;
pub mod launch;
pub mod listener;
pub mod orchestrator;
pub mod probe;
pub mod state;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use deps::{DependencyState, Installer};
pub use launch::{Launcher, Session};
pub use listener::ListenerHandle;
pub use orchestrator::{Bootstrap, BootstrapReport, BootstrapStage, LaunchOptions};
pub use probe::{Environment, SystemEnvironment, ToolAvailability};
pub use state::{InstallationState, STALE_SNAPSHOT_COMMIT};
pub use sync::{SyncOutcome, Synchronizer};

use crate::config::{Config, ConfigManager};
use crate::error::{MintdevError, MintdevResult};
use std::path::{Path, PathBuf};

/// Name of the directory holding installed client dependencies
pub const DEPENDENCY_DIR: &str = "node_modules";

/// On-disk layout of the preview cache
///
/// ```text
/// <root>/mint                      repository checkout
/// <root>/mint/<client>             client application
/// <root>/mint/<client>/node_modules
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLayout {
    root: PathBuf,
    mint_dir: PathBuf,
    client_dir: PathBuf,
}

impl CacheLayout {
    /// Build the layout under `root`, with the client at `client_subdir`
    pub fn new(root: impl Into<PathBuf>, client_subdir: &str) -> Self {
        let root = root.into();
        let mint_dir = root.join("mint");
        let client_dir = mint_dir.join(client_subdir.trim_matches('/'));
        Self {
            root,
            mint_dir,
            client_dir,
        }
    }

    /// Resolve the layout from configuration
    pub fn from_config(config: &Config) -> MintdevResult<Self> {
        Ok(Self::new(
            ConfigManager::cache_root(config)?,
            &config.upstream.sparse_path,
        ))
    }

    /// Cache root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Repository checkout (the cache directory proper)
    pub fn mint_dir(&self) -> &Path {
        &self.mint_dir
    }

    /// Client application inside the checkout
    pub fn client_dir(&self) -> &Path {
        &self.client_dir
    }

    /// Installed dependencies of the client
    pub fn dependency_dir(&self) -> PathBuf {
        self.client_dir.join(DEPENDENCY_DIR)
    }

    /// Create the checkout directory if needed
    pub async fn ensure_mint_dir(&self) -> MintdevResult<()> {
        tokio::fs::create_dir_all(&self.mint_dir)
            .await
            .map_err(|e| {
                MintdevError::io(format!("creating {}", self.mint_dir.display()), e)
            })
    }
}
