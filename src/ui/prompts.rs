//! Interactive prompts with CI/non-interactive fallback

use super::context::UiContext;
use crate::error::{MintdevError, MintdevResult};

/// Ask a yes/no question
///
/// `--yes` approves without asking; a non-interactive session takes
/// `default`.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> MintdevResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    let message = message.to_string();
    tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| MintdevError::User(format!("Prompt task failed: {}", e)))?
    .map_err(|e| MintdevError::User(format!("Prompt failed: {}", e)))
}
