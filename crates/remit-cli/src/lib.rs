//! Remit CLI library.
//!
//! This library provides the core functionality for the `remit` command-line
//! interface: configuration management, the run and status commands, and
//! output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
