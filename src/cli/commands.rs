//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sync a paginated JSON API into a REST dataset
#[derive(Parser, Debug)]
#[command(name = "api-dataset-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Processing configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the dataset API (e.g. https://example.com/data-fair/api/v1)
    #[arg(long, global = true, env = "DATASET_API_URL")]
    pub dataset_api_url: Option<String>,

    /// API key sent to the dataset API
    #[arg(long, global = true, env = "DATASET_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the sync
    Run {
        /// Do not write the dataset id back into the configuration file
        #[arg(long)]
        no_patch: bool,

        /// Seconds to wait for the dataset to finalize a structural change
        #[arg(long, default_value = "600")]
        finalize_timeout: u64,
    },

    /// Print the schema computed from the configured columns
    Schema,

    /// Validate the configuration file
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Indented JSON
    Pretty,
}
