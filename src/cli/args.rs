//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// mintdev - local preview for Mintlify docs
///
/// Keeps a cached copy of the Mintlify client in sync with upstream and
/// serves the docs in the current directory through it.
#[derive(Parser, Debug)]
#[command(name = "mintdev")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute (defaults to `dev`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "MINTDEV_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sync the local client and preview the docs in this directory
    Dev(DevArgs),

    /// Reinstall the local client's dependencies
    Install(InstallArgs),

    /// Show tools, cache state and paths
    Status,

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Print shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

/// Arguments for the dev command
#[derive(Parser, Debug, Default)]
pub struct DevArgs {
    /// Auto-approve installation prompts
    #[arg(short, long)]
    pub yes: bool,

    /// Don't open a browser
    #[arg(long)]
    pub no_open: bool,

    /// Port the preview is served on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the install command
#[derive(Parser, Debug, Default)]
pub struct InstallArgs {
    /// Auto-approve installation prompts
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., server.port)
        key: String,
        /// Value to set
        value: String,
    },
}
