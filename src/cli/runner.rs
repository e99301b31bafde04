//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{ProcessingConfig, SchemaMode};
use crate::dataset::{
    ConfigPatcher, DatasetApiConfig, FileConfigPatcher, HttpDatasetApi, JournalWaiter,
    NoopConfigPatcher,
};
use crate::error::{Error, Result};
use crate::loader::load_config;
use crate::report::TracingReporter;
use crate::schema::{build_explicit_schema, STANDARD_TYPE_TABLE};
use crate::sync::SyncOrchestrator;
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run {
                no_patch,
                finalize_timeout,
            } => self.sync(*no_patch, *finalize_timeout).await,
            Commands::Schema => self.schema(),
            Commands::Validate => self.validate(),
        }
    }

    fn config_path(&self) -> Result<&Path> {
        self.cli
            .config
            .as_deref()
            .ok_or_else(|| Error::config("Configuration file not specified (use -c flag)"))
    }

    fn load_config(&self) -> Result<ProcessingConfig> {
        load_config(self.config_path()?)
    }

    fn dataset_api_config(&self) -> Result<DatasetApiConfig> {
        let base_url = self.cli.dataset_api_url.as_deref().ok_or_else(|| {
            Error::config("Dataset API URL not specified (use --dataset-api-url or DATASET_API_URL)")
        })?;
        let mut config = DatasetApiConfig::new(base_url);
        if let Some(key) = &self.cli.api_key {
            config = config.with_api_key(key);
        }
        Ok(config)
    }

    /// Run the sync and print its report
    async fn sync(&self, no_patch: bool, finalize_timeout: u64) -> Result<()> {
        let config = self.load_config()?;
        let api_config = self.dataset_api_config()?;

        let api = Arc::new(HttpDatasetApi::new(&api_config)?);
        let waiter = Arc::new(
            JournalWaiter::new(&api_config)?.with_timeout(Duration::from_secs(finalize_timeout)),
        );
        let patcher: Arc<dyn ConfigPatcher> = if no_patch {
            Arc::new(NoopConfigPatcher)
        } else {
            Arc::new(FileConfigPatcher::new(self.config_path()?))
        };

        let report = SyncOrchestrator::new(config, api, waiter)
            .with_patcher(patcher)
            .with_reporter(Arc::new(TracingReporter))
            .run()
            .await?;

        self.output(&report);
        Ok(())
    }

    /// Print the explicit schema of the configuration
    fn schema(&self) -> Result<()> {
        let config = self.load_config()?;
        if config.schema_mode() == SchemaMode::Inferred {
            return Err(Error::config(
                "The configuration infers its schema from the data (detectSchema is set)",
            ));
        }

        let schema = build_explicit_schema(&config.columns, &STANDARD_TYPE_TABLE)?;
        self.output(&json!({
            "primaryKey": schema.primary_key,
            "schema": schema.fields,
        }));
        Ok(())
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        if config.schema_mode() == SchemaMode::Explicit {
            build_explicit_schema(&config.columns, &STANDARD_TYPE_TABLE)?;
        }

        self.output(&json!({
            "valid": true,
            "datasetMode": config.dataset_mode,
            "schemaMode": match config.schema_mode() {
                SchemaMode::Explicit => "explicit",
                SchemaMode::Inferred => "inferred",
            },
            "pagination": config
                .pagination
                .as_ref()
                .map_or("none", |p| p.method_name()),
        }));
        Ok(())
    }

    fn output<T: Serialize>(&self, value: &T) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(value).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
            }
        }
    }
}
