//! mintdev - local preview for Mintlify docs
//!
//! Keeps a cached copy of the Mintlify client in sync with upstream,
//! installs its dependencies and serves a docs project through it.

pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod preview;
pub mod ui;

pub use error::{MintdevError, MintdevResult};
