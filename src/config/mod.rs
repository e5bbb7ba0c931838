//! Configuration management for mintdev

pub mod schema;

pub use schema::Config;

use crate::error::{MintdevError, MintdevResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Keys accepted by `config set`, with the value type they take
const SETTABLE_KEYS: &[(&str, ValueKind)] = &[
    ("general.audit_log", ValueKind::Bool),
    ("upstream.url", ValueKind::String),
    ("upstream.remote", ValueKind::String),
    ("upstream.branch", ValueKind::String),
    ("upstream.sparse_path", ValueKind::String),
    ("paths.cache_root", ValueKind::String),
    ("tools.git", ValueKind::String),
    ("tools.package_manager", ValueKind::String),
    ("tools.npm", ValueKind::String),
    ("tools.probe_url", ValueKind::String),
    ("tools.probe_timeout_secs", ValueKind::Integer),
    ("server.port", ValueKind::Integer),
    ("server.dev_script", ValueKind::String),
    ("server.preconfigure_script", ValueKind::String),
    ("listener.enabled", ValueKind::Bool),
    ("listener.config_file", ValueKind::String),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    String,
    Bool,
    Integer,
}

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mintdev")
            .join("config.toml")
    }

    /// Get the state directory path
    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mintdev")
    }

    /// Get the audit log path
    pub fn audit_log_path() -> PathBuf {
        Self::state_dir().join("audit.log")
    }

    /// Resolve the cache root: configured value, else `~/.mintlify`
    ///
    /// Always absolute. A leading `~` expands to the home directory and a
    /// relative value is taken from the current directory.
    pub fn cache_root(config: &Config) -> MintdevResult<PathBuf> {
        let Some(root) = &config.paths.cache_root else {
            return dirs::home_dir()
                .map(|home| home.join(".mintlify"))
                .ok_or(MintdevError::NoHomeDir);
        };

        if let Ok(rest) = root.strip_prefix("~") {
            let home = dirs::home_dir().ok_or(MintdevError::NoHomeDir)?;
            return Ok(home.join(rest));
        }
        if root.is_absolute() {
            return Ok(root.clone());
        }

        let cwd = std::env::current_dir()
            .map_err(|e| MintdevError::io("getting current directory", e))?;
        Ok(cwd.join(root))
    }

    /// Load configuration, falling back to defaults if not exists
    pub async fn load(&self) -> MintdevResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> MintdevResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| MintdevError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| MintdevError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> MintdevResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            MintdevError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Set a single dotted key in the config file, keeping its formatting
    ///
    /// The edited document is validated against the schema before it is
    /// written back.
    pub async fn set_value(&self, key: &str, value: &str) -> MintdevResult<()> {
        let kind = SETTABLE_KEYS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| MintdevError::ConfigKey(key.to_string()))?;

        let (section, field) = key
            .split_once('.')
            .ok_or_else(|| MintdevError::ConfigKey(key.to_string()))?;

        let content = if self.config_path.exists() {
            fs::read_to_string(&self.config_path).await.map_err(|e| {
                MintdevError::io(
                    format!("reading config from {}", self.config_path.display()),
                    e,
                )
            })?
        } else {
            String::new()
        };

        let mut doc: toml_edit::DocumentMut = content.parse()?;
        if !doc.contains_table(section) {
            doc[section] = toml_edit::table();
        }
        doc[section][field] = parse_value(key, value, kind)?;

        let rendered = doc.to_string();
        toml::from_str::<Config>(&rendered).map_err(|e| MintdevError::ConfigInvalid {
            path: self.config_path.clone(),
            reason: e.to_string(),
        })?;

        self.ensure_config_dir().await?;
        fs::write(&self.config_path, rendered).await.map_err(|e| {
            MintdevError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        debug!("Set {} = {} in {}", key, value, self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> MintdevResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| MintdevError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Valid keys for `config set`
    pub fn settable_keys() -> impl Iterator<Item = &'static str> {
        SETTABLE_KEYS.iter().map(|(k, _)| *k)
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_value(key: &str, value: &str, kind: ValueKind) -> MintdevResult<toml_edit::Item> {
    let invalid = |expected: &str| {
        MintdevError::User(format!(
            "Invalid value '{}' for {}: expected {}",
            value, key, expected
        ))
    };

    Ok(match kind {
        ValueKind::String => toml_edit::value(value),
        ValueKind::Bool => match value.to_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => toml_edit::value(true),
            "false" | "no" | "0" | "off" => toml_edit::value(false),
            _ => return Err(invalid("a boolean")),
        },
        ValueKind::Integer => {
            toml_edit::value(value.parse::<i64>().map_err(|_| invalid("an integer"))?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");
        let manager = ConfigManager::with_path(path);

        let config = manager.load().await.unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[tokio::test]
    async fn save_then_load() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("config.toml"));

        let mut config = Config::default();
        config.upstream.branch = "staging".to_string();

        manager.save(&config).await.unwrap();
        let loaded = manager.load().await.unwrap();

        assert_eq!(loaded.upstream.branch, "staging");
    }

    #[tokio::test]
    async fn invalid_file_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(&path, "[server]\nport = \"nope\"\n")
            .await
            .unwrap();

        let err = ConfigManager::with_path(path).load().await.unwrap_err();
        assert!(matches!(err, MintdevError::ConfigInvalid { .. }));
    }

    #[tokio::test]
    async fn set_value_preserves_comments() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(&path, "# my preview\n[server]\nport = 3000\n")
            .await
            .unwrap();

        let manager = ConfigManager::with_path(path.clone());
        manager.set_value("server.port", "4123").await.unwrap();
        manager.set_value("listener.enabled", "off").await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(content.contains("# my preview"));

        let config = manager.load().await.unwrap();
        assert_eq!(config.server.port, 4123);
        assert!(!config.listener.enabled);
    }

    #[tokio::test]
    async fn set_value_rejects_unknown_key() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("config.toml"));

        let err = manager.set_value("server.colour", "red").await.unwrap_err();
        assert!(matches!(err, MintdevError::ConfigKey(_)));
        assert!(!manager.path().exists());
    }

    #[tokio::test]
    async fn set_value_rejects_bad_integer() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("config.toml"));

        assert!(manager.set_value("server.port", "lots").await.is_err());
        assert!(manager.set_value("server.port", "70000").await.is_err());
    }

    #[test]
    fn cache_root_prefers_configured_value() {
        let mut config = Config::default();
        config.paths.cache_root = Some(PathBuf::from("/srv/preview"));
        assert_eq!(
            ConfigManager::cache_root(&config).unwrap(),
            PathBuf::from("/srv/preview")
        );
    }

    #[test]
    #[serial]
    fn cache_root_defaults_under_home() {
        let temp = TempDir::new().unwrap();
        let previous = std::env::var_os("HOME");
        std::env::set_var("HOME", temp.path());

        let root = ConfigManager::cache_root(&Config::default());

        match previous {
            Some(home) => std::env::set_var("HOME", home),
            None => std::env::remove_var("HOME"),
        }
        assert_eq!(root.unwrap(), temp.path().join(".mintlify"));
    }

    #[test]
    fn relative_cache_root_is_made_absolute() {
        let mut config = Config::default();
        config.paths.cache_root = Some(PathBuf::from("preview-cache"));

        let root = ConfigManager::cache_root(&config).unwrap();
        assert!(root.is_absolute());
        assert_eq!(root, std::env::current_dir().unwrap().join("preview-cache"));
    }

    #[test]
    #[serial]
    fn tilde_cache_root_expands_home() {
        let temp = TempDir::new().unwrap();
        let previous = std::env::var_os("HOME");
        std::env::set_var("HOME", temp.path());

        let mut config = Config::default();
        config.paths.cache_root = Some(PathBuf::from("~/previews/mint"));
        let root = ConfigManager::cache_root(&config);

        match previous {
            Some(home) => std::env::set_var("HOME", home),
            None => std::env::remove_var("HOME"),
        }
        assert_eq!(root.unwrap(), temp.path().join("previews").join("mint"));
    }
}
