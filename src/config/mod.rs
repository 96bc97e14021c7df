//! Configuration loading and merging
//!
//! Settings come from an optional config file and from CLI arguments, with
//! precedence CLI > File > Defaults. Credentials are never read from files.

pub mod loader;
pub mod merge;

pub use loader::load_config;
pub use merge::{merge_cli_with_config, CliOverrides};
