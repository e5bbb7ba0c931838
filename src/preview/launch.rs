//! Session launch
//!
//! Hands the project path to the client, starts the dev server in the
//! background, opens the browser and starts the change listener. Launch
//! does no recovery of its own: every prior stage is assumed to have
//! succeeded and any failure here goes straight back to the caller.

use crate::config::Config;
use crate::error::MintdevResult;
use crate::exec::{BackgroundProcess, CommandRunner, ExternalCommand};
use crate::preview::listener::{self, ListenerHandle};
use crate::ui::{self, UiContext};
use chrono::{DateTime, Utc};
use console::style;
use std::path::{Component, Path};
use tracing::{debug, info, warn};

/// A running local preview
///
/// The dev server is detached: it is never joined, and dropping the
/// session does not stop it. Dropping the session does stop the listener.
#[derive(Debug)]
pub struct Session {
    pub url: String,
    pub dev_server: BackgroundProcess,
    pub listener: Option<ListenerHandle>,
    pub launched_at: DateTime<Utc>,
}

/// Starts the dev server and its companions
pub struct Launcher<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a Config,
    ui: &'a UiContext,
    open_browser: bool,
}

impl<'a> Launcher<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        config: &'a Config,
        ui: &'a UiContext,
        open_browser: bool,
    ) -> Self {
        Self {
            runner,
            config,
            ui,
            open_browser,
        }
    }

    /// Launch the preview for `project_dir` from the client in `client_dir`
    pub async fn launch(&self, client_dir: &Path, project_dir: &Path) -> MintdevResult<Session> {
        self.preconfigure(client_dir, project_dir).await?;

        let url = self.config.server.local_url();
        ui::step_ok(self.ui, "Local Mintlify instance initialized");
        println!(
            "🌿 {}",
            style(format!("Navigate to your local preview at {}", url)).green()
        );

        let dev = ExternalCommand::new(&self.config.tools.npm, client_dir)
            .args(["run", self.config.server.dev_script.as_str()]);
        let dev_server = self.runner.spawn(&dev).await?;
        info!("Dev server started: {} (pid {:?})", dev, dev_server.pid);

        if self.open_browser {
            self.open_browser(&url, client_dir).await;
        }

        let listener = if self.config.listener.enabled {
            Some(
                listener::start(
                    project_dir,
                    client_dir,
                    &self.config.listener.config_file,
                )
                .await?,
            )
        } else {
            debug!("Change listener disabled");
            None
        };

        Ok(Session {
            url,
            dev_server,
            listener,
            launched_at: Utc::now(),
        })
    }

    /// Pass the project location into the client's build tooling
    async fn preconfigure(&self, client_dir: &Path, project_dir: &Path) -> MintdevResult<()> {
        let cmd = ExternalCommand::new(&self.config.tools.package_manager, client_dir).args([
            self.config.server.preconfigure_script.clone(),
            handoff_path(client_dir, project_dir),
        ]);

        debug!("Preconfiguring client: {}", cmd);
        self.runner.run(&cmd).await?.check(&cmd)?;
        Ok(())
    }

    async fn open_browser(&self, url: &str, cwd: &Path) {
        let cmd = browser_command(url, cwd);
        if let Err(e) = self.runner.spawn(&cmd).await {
            warn!("Could not open a browser: {}", e);
            ui::step_warn_hint(self.ui, "Could not open a browser", url);
        }
    }
}

/// Path to `project_dir` written relative to `client_dir`
///
/// Climbs from `client_dir` to the filesystem root, then descends along
/// the absolute project path, so it resolves no matter where the cache
/// lives.
pub fn handoff_path(client_dir: &Path, project_dir: &Path) -> String {
    let depth = client_dir
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count();

    let descend: Vec<String> = project_dir
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let mut parts = vec!["..".to_string(); depth];
    parts.extend(descend);
    if parts.is_empty() {
        return ".".to_string();
    }
    parts.join("/")
}

/// Platform command that opens `url` in the default browser
pub fn browser_command(url: &str, cwd: &Path) -> ExternalCommand {
    if cfg!(target_os = "macos") {
        ExternalCommand::new("open", cwd).arg(url)
    } else if cfg!(target_os = "windows") {
        ExternalCommand::new("cmd", cwd).args(["/C", "start", "", url])
    } else {
        ExternalCommand::new("xdg-open", cwd).arg(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::testing::FakeRunner;
    use crate::MintdevError;
    use tempfile::TempDir;

    #[test]
    fn handoff_climbs_then_descends() {
        let path = handoff_path(
            Path::new("/home/u/.mintlify/mint/client"),
            Path::new("/work/docs"),
        );
        assert_eq!(path, "../../../../../work/docs");
    }

    #[test]
    fn handoff_resolves_to_project() {
        let temp = TempDir::new().unwrap();
        let client = temp.path().join("cache").join("mint").join("client");
        let project = temp.path().join("docs");
        std::fs::create_dir_all(&client).unwrap();
        std::fs::create_dir_all(&project).unwrap();

        let relative = handoff_path(&client, &project);
        let resolved = client.join(relative).canonicalize().unwrap();
        assert_eq!(resolved, project.canonicalize().unwrap());
    }

    #[test]
    fn handoff_from_relative_cache_root() {
        let mut config = Config::default();
        config.paths.cache_root = Some(std::path::PathBuf::from("preview-cache"));
        let layout = crate::preview::CacheLayout::from_config(&config).unwrap();
        let project = TempDir::new().unwrap();

        let relative = handoff_path(layout.client_dir(), project.path());

        let mut resolved = std::path::PathBuf::new();
        for component in layout.client_dir().join(&relative).components() {
            match component {
                Component::ParentDir => {
                    resolved.pop();
                }
                other => resolved.push(other),
            }
        }
        assert_eq!(resolved, project.path());
    }

    #[test]
    fn browser_command_targets_url() {
        let cmd = browser_command("http://localhost:3000", Path::new("/tmp"));
        assert_eq!(cmd.args.last().map(String::as_str), Some("http://localhost:3000"));
    }

    #[tokio::test]
    async fn launch_runs_in_order() {
        let temp = TempDir::new().unwrap();
        let client = temp.path().join("client");
        let project = temp.path().join("docs");
        std::fs::create_dir_all(&client).unwrap();
        std::fs::create_dir_all(&project).unwrap();

        let mut config = Config::default();
        config.listener.enabled = false;
        let ui = UiContext::non_interactive();
        let runner = FakeRunner::new();

        let session = Launcher::new(&runner, &config, &ui, true)
            .launch(&client, &project)
            .await
            .unwrap();

        assert_eq!(session.url, "http://localhost:3000");
        assert!(session.listener.is_none());
        assert!(!session.dev_server.is_attached());

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("yarn preconfigure ../"));
        assert_eq!(runner.commands()[0].cwd, client);

        let spawned = runner.spawned();
        assert_eq!(spawned[0], "npm run dev-watch");
        assert!(spawned[1].ends_with("http://localhost:3000"));
    }

    #[tokio::test]
    async fn failed_preconfigure_aborts_launch() {
        let temp = TempDir::new().unwrap();
        let client = temp.path().join("client");
        std::fs::create_dir_all(&client).unwrap();

        let mut config = Config::default();
        config.listener.enabled = false;
        let ui = UiContext::non_interactive();
        let project = temp.path().to_path_buf();
        let preconfigure = format!("yarn preconfigure {}", handoff_path(&client, &project));
        let runner = FakeRunner::new().on(&preconfigure, false, "");

        let err = Launcher::new(&runner, &config, &ui, false)
            .launch(&client, &project)
            .await
            .unwrap_err();

        assert!(matches!(err, MintdevError::CommandExecution { .. }));
        assert!(runner.spawned().is_empty());
    }

    #[tokio::test]
    async fn no_open_skips_browser() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.listener.enabled = false;
        let ui = UiContext::non_interactive();
        let runner = FakeRunner::new();

        Launcher::new(&runner, &config, &ui, false)
            .launch(temp.path(), temp.path())
            .await
            .unwrap();

        assert_eq!(runner.spawned(), vec!["npm run dev-watch"]);
    }
}
