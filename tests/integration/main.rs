//! Integration tests for mintdev

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn mintdev() -> Command {
        cargo_bin_cmd!("mintdev")
    }

    /// Command bound to a throwaway config file
    fn mintdev_with_config(config: &Path) -> Command {
        let mut cmd = mintdev();
        cmd.env("MINTDEV_CONFIG", config);
        cmd
    }

    fn temp_config(dir: &TempDir) -> PathBuf {
        dir.path().join("config.toml")
    }

    #[test]
    fn help_displays() {
        mintdev()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("local preview for Mintlify docs"));
    }

    #[test]
    fn version_displays() {
        mintdev()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("mintdev"));
    }

    #[test]
    fn dev_help_lists_flags() {
        mintdev()
            .args(["dev", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--no-open"))
            .stdout(predicate::str::contains("--port"));
    }

    #[test]
    fn config_path_honors_env() {
        let dir = TempDir::new().unwrap();
        let config = temp_config(&dir);

        mintdev_with_config(&config)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                config.display().to_string(),
            ));
    }

    #[test]
    fn config_path_default() {
        mintdev()
            .env_remove("MINTDEV_CONFIG")
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let dir = TempDir::new().unwrap();

        mintdev_with_config(&temp_config(&dir))
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[upstream]"))
            .stdout(predicate::str::contains("mint-origin"));
    }

    #[test]
    fn config_set_then_show() {
        let dir = TempDir::new().unwrap();
        let config = temp_config(&dir);

        mintdev_with_config(&config)
            .args(["config", "set", "server.port", "4000"])
            .assert()
            .success();

        mintdev_with_config(&config)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("port = 4000"));
    }

    #[test]
    fn config_set_unknown_key_fails() {
        let dir = TempDir::new().unwrap();
        let config = temp_config(&dir);

        mintdev_with_config(&config)
            .args(["config", "set", "server.colour", "green"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));

        assert!(!config.exists());
    }

    #[test]
    fn config_set_rejects_bad_value() {
        let dir = TempDir::new().unwrap();

        mintdev_with_config(&temp_config(&dir))
            .args(["config", "set", "server.port", "lots"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("expected an integer"));
    }

    #[test]
    fn invalid_config_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let config = temp_config(&dir);
        std::fs::write(&config, "[server]\nport = \"not a number\"\n").unwrap();

        mintdev_with_config(&config)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn install_without_client_points_at_dev() {
        let dir = TempDir::new().unwrap();
        let config = temp_config(&dir);
        std::fs::write(
            &config,
            format!(
                "[general]\naudit_log = false\n\n[paths]\ncache_root = {:?}\n",
                dir.path().join("cache").display().to_string()
            ),
        )
        .unwrap();

        mintdev_with_config(&config)
            .arg("install")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Local client not found"))
            .stderr(predicate::str::contains("Run: mintdev dev"));
    }

    #[test]
    fn completions_bash() {
        mintdev()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("mintdev"));
    }

    #[test]
    fn completions_reject_unknown_shell() {
        mintdev().args(["completions", "tcsh"]).assert().failure();
    }
}
