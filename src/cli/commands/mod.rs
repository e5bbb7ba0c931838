//! CLI command implementations

pub mod completions;
pub mod config;
pub mod dev;
pub mod install;
pub mod status;

pub use completions::execute as completions;
pub use config::execute as config;
pub use dev::execute as dev;
pub use install::execute as install;
pub use status::execute as status;
