//! Error types for mintdev
//!
//! All modules use `MintdevResult<T>` as their return type. Lower stages
//! return outcome values; only the orchestrator and the commands decide
//! which conditions are fatal.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for mintdev operations
pub type MintdevResult<T> = Result<T, MintdevError>;

/// All errors that can occur in mintdev
#[derive(Error, Debug)]
pub enum MintdevError {
    // Fatal bootstrap exits
    #[error("git must be installed to set up the local preview")]
    NoVersionControl,

    #[error("Dependencies weren't installed in {}", client_dir.display())]
    MissingDependenciesAfterInstall { client_dir: PathBuf },

    #[error("Local client not found at {}", .0.display())]
    ClientMissing(PathBuf),

    #[error("{0} must be globally installed")]
    PackageManagerMissing(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown config key: {0}")]
    ConfigKey(String),

    #[error("Cannot determine home directory")]
    NoHomeDir,

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    // Listener errors
    #[error("Failed to watch {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML edit error: {0}")]
    TomlEdit(#[from] toml_edit::TomlError),

    // General errors
    #[error("{0}")]
    User(String),
}

impl MintdevError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Whether this error is one of the bootstrap's fatal exits
    pub fn is_fatal_bootstrap(&self) -> bool {
        matches!(
            self,
            Self::NoVersionControl | Self::MissingDependenciesAfterInstall { .. }
        )
    }

    /// Short machine-readable name, used in audit events
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoVersionControl => "no_version_control",
            Self::MissingDependenciesAfterInstall { .. } => "missing_dependencies_after_install",
            Self::ClientMissing(_) => "client_missing",
            Self::PackageManagerMissing(_) => "package_manager_missing",
            Self::CommandFailed { .. } | Self::CommandExecution { .. } => "command",
            Self::Watch { .. } => "watch",
            _ => "internal",
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NoVersionControl => {
                Some("Install git: https://github.com/git-guides/install-git")
            }
            Self::MissingDependenciesAfterInstall { .. } => Some("Run: mintdev install"),
            Self::ClientMissing(_) => Some("Run: mintdev dev"),
            Self::PackageManagerMissing(_) => Some("Run: npm install --global yarn"),
            Self::ConfigKey(_) => Some("Run: mintdev config show"),
            _ => None,
        }
    }
}
