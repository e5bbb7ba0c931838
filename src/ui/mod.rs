//! Terminal output for mintdev
//!
//! Uses `cliclack` for spinners and prompts when attached to a terminal,
//! and falls back to plain tagged lines (`[OK]`, `[WARN]`) everywhere else.
//!
//! # Example
//!
//! ```rust,ignore
//! use mintdev::ui::{self, UiContext, TaskSpinner};
//!
//! let ctx = UiContext::detect().with_auto_yes(args.yes);
//!
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Starting a local Mintlify instance...");
//! // ... sync ...
//! spinner.stop("Local Mintlify instance initialized");
//!
//! let yes = ui::confirm(&ctx, "yarn must be globally installed. Install yarn?", true).await?;
//! ```

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, outro_success, outro_warn, remark, section, step_error,
    step_info, step_ok, step_warn, step_warn_hint,
};
pub use progress::{InstallProgress, TaskSpinner};
pub use prompts::confirm;
pub use theme::{init_theme, MintdevTheme};
