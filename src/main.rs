//! mintdev - local preview for Mintlify docs
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use mintdev::cli::args::DevArgs;
use mintdev::cli::{commands, Cli, Commands};
use mintdev::config::ConfigManager;
use mintdev::MintdevResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> MintdevResult<()> {
    let cli = Cli::parse();

    // 0 = warn (spinners only), 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("mintdev=warn"),
        1 => EnvFilter::new("mintdev=info"),
        _ => EnvFilter::new("mintdev=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let command = cli
        .command
        .unwrap_or_else(|| Commands::Dev(DevArgs::default()));

    // Completions don't need config loading
    if let Commands::Completions { shell } = command {
        return commands::completions(shell);
    }

    let config_manager = match cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };
    debug!("Using config {}", config_manager.path().display());
    let config = config_manager.load().await?;

    mintdev::ui::init_theme();

    match command {
        Commands::Completions { .. } => unreachable!("Completions handled above"),
        Commands::Dev(args) => commands::dev(args, &config).await,
        Commands::Install(args) => commands::install(args, &config).await,
        Commands::Status => commands::status(&config, config_manager.path()).await,
        Commands::Config(args) => commands::config(args, &config, &config_manager).await,
    }
}
