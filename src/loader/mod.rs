//! Configuration loader module
//!
//! Reads a [`ProcessingConfig`](crate::config::ProcessingConfig) from a YAML
//! or JSON file and validates it.

mod parser;

pub use parser::{load_config, load_config_from_str};
