//! rfchat CLI library
//!
//! Argument parsing, configuration loading and role dispatch for the `rfchat`
//! binary. The chat itself lives in `rfchat-core`; the radio in `rfchat-bluez`.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;

pub use app::Invocation;
pub use cli::{Cli, Commands};
pub use config::AppConfig;
pub use error::{CliError, Result};
