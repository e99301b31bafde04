//! CLI module
//!
//! Command-line host for the sync.
//!
//! # Commands
//!
//! - `run` - Sync the configured API into its dataset
//! - `schema` - Print the explicit schema of the configuration
//! - `validate` - Check the configuration file

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
