//! Configuration schema for mintdev
//!
//! Configuration is stored at `~/.config/mintdev/config.toml`. Every
//! section falls back to its defaults, so an empty file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Upstream client repository
    pub upstream: UpstreamConfig,

    /// Cache layout
    pub paths: PathsConfig,

    /// External tools and probing
    pub tools: ToolsConfig,

    /// Dev server settings
    pub server: ServerConfig,

    /// Change listener settings
    pub listener: ListenerConfig,
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Record bootstrap events in the audit log
    pub audit_log: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { audit_log: true }
    }
}

/// Where the client application comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Repository URL
    pub url: String,

    /// Name of the registered remote
    pub remote: String,

    /// Branch to pull
    pub branch: String,

    /// Only this subtree is materialized by the sparse pull
    pub sparse_path: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "https://github.com/mintlify/mint.git".to_string(),
            remote: "mint-origin".to_string(),
            branch: "main".to_string(),
            sparse_path: "client/".to_string(),
        }
    }
}

/// On-disk layout of the cache
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Cache root (default: `~/.mintlify`)
    pub cache_root: Option<PathBuf>,
}

/// External tools consumed by the bootstrap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Version control binary
    pub git: String,

    /// Package manager used for install and scripts
    pub package_manager: String,

    /// Used to provision the package manager and run the dev server
    pub npm: String,

    /// URL requested to decide whether the network is reachable
    pub probe_url: String,

    /// Reachability probe timeout
    pub probe_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            package_manager: "yarn".to_string(),
            npm: "npm".to_string(),
            probe_url: "https://github.com".to_string(),
            probe_timeout_secs: 5,
        }
    }
}

/// Dev server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Local port the client dev server listens on
    pub port: u16,

    /// npm script that starts the dev server
    pub dev_script: String,

    /// Arguments passed to the package manager to install dependencies
    pub install_args: Vec<String>,

    /// Package manager script receiving the project path
    pub preconfigure_script: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            dev_script: "dev-watch".to_string(),
            install_args: vec![],
            preconfigure_script: "preconfigure".to_string(),
        }
    }
}

impl ServerConfig {
    /// Address printed and opened in the browser
    pub fn local_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

/// Change listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Start the listener after launch
    pub enabled: bool,

    /// Docs config file that triggers a reconfigure when it changes
    pub config_file: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            config_file: "mint.json".to_string(),
        }
    }
}
