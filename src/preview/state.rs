//! Installation state of the cache directory
//!
//! The state is derived from the filesystem on every run and never stored
//! anywhere else.

use crate::exec::{CommandRunner, ExternalCommand};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// HEAD of a client snapshot that shipped broken.
///
/// A checkout sitting on exactly this commit cannot update itself and has
/// to be re-acquired from scratch. This is a one-time migration guard for
/// that single release, not a general staleness check. If upstream history
/// is ever rewritten the guard simply never fires again.
pub const STALE_SNAPSHOT_COMMIT: &str = "31c9f9374c5f0f2edaf02bb974877706f3c6ff82";

/// Classification of the cache directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallationState {
    /// No version-control metadata
    Absent,
    /// Checkout pinned to [`STALE_SNAPSHOT_COMMIT`]
    StaleSnapshot,
    /// Anything else with metadata present
    Current,
}

impl fmt::Display for InstallationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Absent => "absent",
            Self::StaleSnapshot => "stale snapshot",
            Self::Current => "current",
        };
        f.write_str(name)
    }
}

/// Whether `mint_dir` holds a git repository
pub fn has_vcs_metadata(mint_dir: &Path) -> bool {
    mint_dir.join(".git").exists()
}

/// Classify the cache directory
///
/// Read-only. A HEAD query that cannot run or fails (no git, no commits
/// yet) leaves the checkout classified as `Current`.
pub async fn classify(runner: &dyn CommandRunner, git: &str, mint_dir: &Path) -> InstallationState {
    if !has_vcs_metadata(mint_dir) {
        return InstallationState::Absent;
    }

    let query = ExternalCommand::new(git, mint_dir).args(["rev-parse", "HEAD"]);
    match runner.run(&query).await {
        Ok(output) if output.success && output.stdout.trim() == STALE_SNAPSHOT_COMMIT => {
            InstallationState::StaleSnapshot
        }
        Ok(_) => InstallationState::Current,
        Err(e) => {
            debug!("Could not read HEAD in {}: {}", mint_dir.display(), e);
            InstallationState::Current
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::testing::FakeRunner;
    use tempfile::TempDir;

    #[tokio::test]
    async fn absent_without_metadata() {
        let temp = TempDir::new().unwrap();
        let runner = FakeRunner::new();

        let state = classify(&runner, "git", temp.path()).await;
        assert_eq!(state, InstallationState::Absent);
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn stale_on_known_bad_commit() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        let runner = FakeRunner::new().on(
            "git rev-parse HEAD",
            true,
            &format!("{}\n", STALE_SNAPSHOT_COMMIT),
        );

        let state = classify(&runner, "git", temp.path()).await;
        assert_eq!(state, InstallationState::StaleSnapshot);
    }

    #[tokio::test]
    async fn current_on_other_commit() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        let runner = FakeRunner::new().on(
            "git rev-parse HEAD",
            true,
            "0f2edaf02bb974877706f3c6ff8231c9f9374c5f\n",
        );

        let state = classify(&runner, "git", temp.path()).await;
        assert_eq!(state, InstallationState::Current);
    }

    #[tokio::test]
    async fn current_when_head_unreadable() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        let runner = FakeRunner::new().on("git rev-parse HEAD", false, "HEAD\n");

        let state = classify(&runner, "git", temp.path()).await;
        assert_eq!(state, InstallationState::Current);
    }

    #[tokio::test]
    async fn prefix_of_stale_hash_is_not_stale() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        let runner = FakeRunner::new().on("git rev-parse HEAD", true, "31c9f9374c5f\n");

        let state = classify(&runner, "git", temp.path()).await;
        assert_eq!(state, InstallationState::Current);
    }
}
