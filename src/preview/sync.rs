//! Repository synchronization
//!
//! Owns the on-disk mirror of the upstream client. A first run initializes
//! an empty repository with a single remote; every online run then pulls
//! the client subtree through a temporary sparse checkout.
//!
//! # Sparse pull
//!
//! 1. `core.sparseCheckout = true`
//! 2. append the client path to `.git/info/sparse-checkout`
//! 3. `git pull <remote> <branch>`
//! 4. `core.sparseCheckout = false`
//! 5. delete `.git/info/sparse-checkout`
//!
//! Steps 4 and 5 run whatever the pull did, so the checkout is always left
//! with normal full-checkout semantics.

use crate::config::schema::UpstreamConfig;
use crate::error::{MintdevError, MintdevResult};
use crate::exec::{CommandRunner, ExternalCommand};
use crate::preview::probe::ToolAvailability;
use crate::preview::state::{has_vcs_metadata, InstallationState};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Exact stdout of `git pull` when there is nothing to merge
pub const ALREADY_UP_TO_DATE: &str = "Already up to date.\n";

/// Result of the synchronization step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Sync skipped (offline or no git)
    NoActionTaken,
    /// A pull ran and brought in changes
    UpdatedToLatest,
    /// A pull ran and reported nothing to merge
    AlreadyUpToDate,
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoActionTaken => "no action taken",
            Self::UpdatedToLatest => "updated to latest",
            Self::AlreadyUpToDate => "already up to date",
        };
        f.write_str(name)
    }
}

/// Keeps the cache checkout in sync with upstream
pub struct Synchronizer<'a> {
    runner: &'a dyn CommandRunner,
    git: &'a str,
    upstream: &'a UpstreamConfig,
}

impl<'a> Synchronizer<'a> {
    pub fn new(runner: &'a dyn CommandRunner, git: &'a str, upstream: &'a UpstreamConfig) -> Self {
        Self {
            runner,
            git,
            upstream,
        }
    }

    /// Bring `mint_dir` up to date as far as the environment allows
    ///
    /// # Errors
    ///
    /// - [`MintdevError::NoVersionControl`] if the checkout has no metadata
    ///   and git is not installed. Nothing has been written at that point.
    /// - [`MintdevError::CommandExecution`] if `git init` fails.
    pub async fn sync(
        &self,
        mint_dir: &Path,
        tools: &ToolAvailability,
        state: InstallationState,
    ) -> MintdevResult<SyncOutcome> {
        if state == InstallationState::StaleSnapshot {
            warn!(
                "Local client is pinned to a broken snapshot, resetting {}",
                mint_dir.display()
            );
            empty_dir(mint_dir).await?;
        }

        if !has_vcs_metadata(mint_dir) {
            if !tools.git_present {
                return Err(MintdevError::NoVersionControl);
            }
            self.init_repository(mint_dir).await?;
        }

        if !tools.internet_reachable || !tools.git_present {
            info!("Offline or git unavailable, using the existing local client");
            return Ok(SyncOutcome::NoActionTaken);
        }

        self.sparse_pull(mint_dir).await
    }

    async fn init_repository(&self, mint_dir: &Path) -> MintdevResult<()> {
        info!("Initializing local client repository in {}", mint_dir.display());

        let init = self.git(mint_dir).arg("init");
        self.runner.run(&init).await?.check(&init)?;

        // The initial fetch fails when offline; the remote is registered
        // regardless and the next online run pulls through it.
        let remote = self.git(mint_dir).args([
            "remote",
            "add",
            "-f",
            self.upstream.remote.as_str(),
            self.upstream.url.as_str(),
        ]);
        let output = self.runner.run(&remote).await?;
        if !output.success {
            warn!("{} failed: {}", remote, output.stderr.trim());
        }

        Ok(())
    }

    async fn sparse_pull(&self, mint_dir: &Path) -> MintdevResult<SyncOutcome> {
        let sparse_file = sparse_checkout_file(mint_dir);

        let pull = self.git(mint_dir).args([
            "pull",
            self.upstream.remote.as_str(),
            self.upstream.branch.as_str(),
        ]);

        let pulled = match self.set_sparse_checkout(mint_dir, true).await {
            Ok(()) => match append_sparse_rule(&sparse_file, &self.upstream.sparse_path).await {
                Ok(()) => self.runner.run(&pull).await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };

        let disabled = self.set_sparse_checkout(mint_dir, false).await;
        let removed = remove_sparse_file(&sparse_file).await;

        let output = pulled?;
        disabled?;
        removed?;
        if output.stdout == ALREADY_UP_TO_DATE {
            debug!("Local client already up to date");
            return Ok(SyncOutcome::AlreadyUpToDate);
        }

        if !output.success {
            warn!("{} failed: {}", pull, output.stderr.trim());
        } else {
            info!("Local client updated from {}", self.upstream.remote);
        }
        Ok(SyncOutcome::UpdatedToLatest)
    }

    async fn set_sparse_checkout(&self, mint_dir: &Path, enabled: bool) -> MintdevResult<()> {
        let cmd = self.git(mint_dir).args([
            "config",
            "core.sparseCheckout",
            if enabled { "true" } else { "false" },
        ]);
        let output = self.runner.run(&cmd).await?;
        if !output.success {
            warn!("{} failed: {}", cmd, output.stderr.trim());
        }
        Ok(())
    }

    fn git(&self, cwd: &Path) -> ExternalCommand {
        ExternalCommand::new(self.git, cwd)
    }
}

/// Path of the sparse checkout rule file
pub fn sparse_checkout_file(mint_dir: &Path) -> PathBuf {
    mint_dir.join(".git").join("info").join("sparse-checkout")
}

async fn append_sparse_rule(sparse_file: &Path, rule: &str) -> MintdevResult<()> {
    if let Some(parent) = sparse_file.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| MintdevError::io(format!("creating {}", parent.display()), e))?;
    }

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(sparse_file)
        .await
        .map_err(|e| MintdevError::io(format!("opening {}", sparse_file.display()), e))?;

    file.write_all(format!("{}\n", rule).as_bytes())
        .await
        .map_err(|e| MintdevError::io(format!("writing {}", sparse_file.display()), e))?;
    file.flush()
        .await
        .map_err(|e| MintdevError::io(format!("writing {}", sparse_file.display()), e))
}

async fn remove_sparse_file(sparse_file: &Path) -> MintdevResult<()> {
    match fs::remove_file(sparse_file).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(MintdevError::io(
            format!("removing {}", sparse_file.display()),
            e,
        )),
    }
}

/// Remove everything inside `dir`, keeping `dir` itself
pub async fn empty_dir(dir: &Path) -> MintdevResult<()> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| MintdevError::io(format!("reading {}", dir.display()), e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| MintdevError::io(format!("reading {}", dir.display()), e))?
    {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| MintdevError::io(format!("inspecting {}", path.display()), e))?;

        let removed = if file_type.is_dir() {
            fs::remove_dir_all(&path).await
        } else {
            fs::remove_file(&path).await
        };
        removed.map_err(|e| MintdevError::io(format!("removing {}", path.display()), e))?;
    }

    Ok(())
}
