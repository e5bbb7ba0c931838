//! Change listener
//!
//! Watches the docs project and keeps the client's copy of the docs
//! config current. Whenever the config file is created or modified it is
//! copied into the client ("reconfigure"); the running dev server picks the
//! change up on its own.
//!
//! The notify callback runs on the watcher's own thread and forwards paths
//! over a channel to a tokio task that performs the copy.

use crate::error::{MintdevError, MintdevResult};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Directories whose changes never matter to the preview
const IGNORED_DIRS: &[&str] = &["node_modules", ".git", ".mintlify"];

/// Keeps the watcher alive; dropping it stops listening
pub struct ListenerHandle {
    watched: PathBuf,
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    /// Directory being watched
    pub fn watched(&self) -> &Path {
        &self.watched
    }
}

impl fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("watched", &self.watched)
            .finish_non_exhaustive()
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start watching `project_dir`
///
/// An existing config file is copied into the client before this returns.
/// Must be called from within a tokio runtime.
pub async fn start(
    project_dir: &Path,
    client_dir: &Path,
    config_file: &str,
) -> MintdevResult<ListenerHandle> {
    let source = project_dir.join(config_file);
    if source.is_file() {
        reconfigure(&source, client_dir).await?;
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<PathBuf>();
    let mut watcher =
        notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                    for path in event.paths {
                        if tx.send(path).is_err() {
                            return;
                        }
                    }
                }
            }
            Err(err) => warn!("file watcher error: {err}"),
        })
        .map_err(|source| MintdevError::Watch {
            path: project_dir.to_path_buf(),
            source,
        })?;

    watcher
        .watch(project_dir, RecursiveMode::Recursive)
        .map_err(|source| MintdevError::Watch {
            path: project_dir.to_path_buf(),
            source,
        })?;

    let project = project_dir.to_path_buf();
    // Some backends report resolved paths (e.g. /private/var on macOS)
    let canonical = project_dir
        .canonicalize()
        .unwrap_or_else(|_| project.clone());
    let client = client_dir.to_path_buf();
    let config_file = config_file.to_string();
    let task = tokio::spawn(async move {
        while let Some(path) = rx.recv().await {
            if !is_config_change(&path, &project, &config_file)
                && !is_config_change(&path, &canonical, &config_file)
            {
                continue;
            }
            if let Err(e) = reconfigure(&path, &client).await {
                warn!("Reconfigure failed: {}", e);
            }
        }
    });

    info!("Watching {} for changes", project_dir.display());
    Ok(ListenerHandle {
        watched: project_dir.to_path_buf(),
        _watcher: watcher,
        task,
    })
}

/// Whether a changed path is the project's docs config
pub fn is_config_change(path: &Path, project_dir: &Path, config_file: &str) -> bool {
    let Ok(relative) = path.strip_prefix(project_dir) else {
        return false;
    };

    let ignored = relative.components().any(|c| match c {
        Component::Normal(part) => IGNORED_DIRS.iter().any(|d| part == *d),
        _ => false,
    });

    !ignored && relative == Path::new(config_file)
}

/// Copy the docs config into the client's source tree
pub async fn reconfigure(source: &Path, client_dir: &Path) -> MintdevResult<()> {
    let Some(name) = source.file_name() else {
        return Ok(());
    };
    let target_dir = client_dir.join("src");
    let target = target_dir.join(name);

    tokio::fs::create_dir_all(&target_dir)
        .await
        .map_err(|e| MintdevError::io(format!("creating {}", target_dir.display()), e))?;
    tokio::fs::copy(source, &target).await.map_err(|e| {
        MintdevError::io(
            format!("copying {} to {}", source.display(), target.display()),
            e,
        )
    })?;

    debug!("Reconfigured client from {}", source.display());
    Ok(())
}
