//! Sync orchestration module
//!
//! Main fetch loop and dataset lifecycle.
//!
//! # Overview
//!
//! A run goes through these steps, any of which may fail the whole run:
//!
//! 1. compute the explicit schema, if columns are configured
//! 2. create the dataset, or fetch it and reconcile its schema
//! 3. resolve source authentication
//! 4. for each page: fetch, extract, transform, persist any pending schema
//!    change, then bulk upload
//!
//! Nothing is rolled back on failure.

mod types;

pub use types::{SyncReport, LARGE_PAGE_ROWS};

use crate::auth::{AuthHeaders, Authenticator};
use crate::config::{ProcessingConfig, SchemaMode};
use crate::dataset::{
    ConfigPatch, ConfigPatcher, Dataset, DatasetApi, DatasetDraft, FinalizeWaiter,
    JournalCheckpoint, NoopConfigPatcher, FINALIZE_END,
};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig, RequestConfig};
use crate::pagination::{build_paginator, PaginationState};
use crate::path;
use crate::report::{ProgressReporter, TracingReporter};
use crate::schema::{
    build_explicit_schema, reconcile, ExplicitSchema, SchemaField, SchemaInferrer, TypeTable,
};
use crate::transform::{ExplicitTransformer, InferredTransformer, RowTransformer};
use crate::types::{DatasetMode, Row, UploadErrorPolicy};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Runs one sync of a source API into a dataset
pub struct SyncOrchestrator {
    config: ProcessingConfig,
    api: Arc<dyn DatasetApi>,
    waiter: Arc<dyn FinalizeWaiter>,
    patcher: Arc<dyn ConfigPatcher>,
    reporter: Arc<dyn ProgressReporter>,
    source: Option<HttpClient>,
    type_table: TypeTable,
}

/// Dataset ready for uploads, with what is left to do on its schema
struct Prepared {
    dataset: Dataset,
    pending_schema: Option<Vec<SchemaField>>,
    transformer: RowTransformer,
}

impl SyncOrchestrator {
    /// Create an orchestrator for `config`
    pub fn new(
        config: ProcessingConfig,
        api: Arc<dyn DatasetApi>,
        waiter: Arc<dyn FinalizeWaiter>,
    ) -> Self {
        Self {
            config,
            api,
            waiter,
            patcher: Arc::new(NoopConfigPatcher),
            reporter: Arc::new(TracingReporter),
            source: None,
            type_table: TypeTable::standard(),
        }
    }

    /// Set where the configuration patch is persisted
    #[must_use]
    pub fn with_patcher(mut self, patcher: Arc<dyn ConfigPatcher>) -> Self {
        self.patcher = patcher;
        self
    }

    /// Set the progress sink
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Use a preconfigured client for source requests
    #[must_use]
    pub fn with_source_client(mut self, client: HttpClient) -> Self {
        self.source = Some(client);
        self
    }

    /// Override the column type mapping
    #[must_use]
    pub fn with_type_table(mut self, table: TypeTable) -> Self {
        self.type_table = table;
        self
    }

    /// The configuration of this run
    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Run the sync to completion
    pub async fn run(&self) -> Result<SyncReport> {
        let start = Instant::now();
        let mut report = SyncReport::new();

        self.reporter.step("Initialisation");
        self.config.validate()?;

        let explicit = match self.config.schema_mode() {
            SchemaMode::Explicit => Some(self.explicit_schema()?),
            SchemaMode::Inferred => None,
        };

        let prepared = match self.config.dataset_mode {
            DatasetMode::Create => {
                self.create_dataset(explicit.as_ref(), &mut report).await?
            }
            DatasetMode::Update => self.verify_dataset(explicit.as_ref()).await?,
        };
        report.dataset = Some(prepared.dataset.reference());

        self.reporter.step("Fetching, transforming and uploading data");
        let auth = Authenticator::new(self.config.resolved_auth())?
            .headers()
            .await?;
        self.fetch_loop(prepared, &auth, &mut report).await?;

        report.set_duration(start.elapsed().as_millis() as u64);
        self.reporter.info(&format!(
            "Sync complete: {} pages, {} lines, {} uploaded, {} upload errors",
            report.pages, report.lines, report.uploaded, report.upload_errors
        ));
        Ok(report)
    }

    fn explicit_schema(&self) -> Result<ExplicitSchema> {
        self.reporter.info("Building schema");
        let schema = build_explicit_schema(&self.config.columns, &self.type_table)?;
        if !schema.has_primary_key() {
            self.reporter
                .warning("No primary key column: every run appends lines instead of updating them");
        }
        Ok(schema)
    }

    fn explicit_transformer(&self) -> RowTransformer {
        RowTransformer::Explicit(
            ExplicitTransformer::new(&self.config.columns)
                .fill_missing_with_empty(self.config.fill_missing_with_empty),
        )
    }

    fn inferred_transformer(&self, existing: &[SchemaField]) -> RowTransformer {
        RowTransformer::Inferred(
            InferredTransformer::new(SchemaInferrer::seeded(existing.iter().cloned()))
                .with_falsy_policy(self.config.falsy_values),
        )
    }

    // ========================================================================
    // Dataset lifecycle
    // ========================================================================

    async fn create_dataset(
        &self,
        explicit: Option<&ExplicitSchema>,
        report: &mut SyncReport,
    ) -> Result<Prepared> {
        self.reporter.info("Creating dataset");

        let draft = DatasetDraft::new(
            self.config.dataset.title.clone(),
            explicit.map(|s| s.fields.clone()).unwrap_or_default(),
        )
        .with_primary_key(explicit.map(|s| s.primary_key.clone()).unwrap_or_default())
        .with_id(self.config.dataset_id().map(String::from))
        .with_processing_id(self.config.processing_id.as_deref());

        let dataset = self.api.create_dataset(&draft).await?;
        self.reporter.info(&format!(
            "Dataset created, id=\"{}\", title=\"{}\"",
            dataset.id, dataset.title
        ));

        let patch = ConfigPatch::update_mode(dataset.reference());
        self.patcher.patch_config(&patch).await?;
        report.config_patch = Some(patch);

        self.waiter
            .wait_for_event(&dataset.id, FINALIZE_END, &JournalCheckpoint::empty())
            .await?;

        let transformer = match explicit {
            Some(_) => self.explicit_transformer(),
            None => self.inferred_transformer(&dataset.schema),
        };
        Ok(Prepared {
            dataset,
            pending_schema: None,
            transformer,
        })
    }

    async fn verify_dataset(&self, explicit: Option<&ExplicitSchema>) -> Result<Prepared> {
        self.reporter.info("Checking dataset");

        let id = self
            .config
            .dataset_id()
            .ok_or_else(|| Error::missing_field("dataset.id"))?;
        let dataset = self
            .api
            .get_dataset(id)
            .await?
            .ok_or_else(|| Error::DatasetNotFound { id: id.to_string() })?;
        self.reporter.info(&format!(
            "Dataset exists, id=\"{}\", title=\"{}\"",
            dataset.id, dataset.title
        ));

        let Some(explicit) = explicit else {
            let transformer = self.inferred_transformer(&dataset.schema);
            return Ok(Prepared {
                dataset,
                pending_schema: None,
                transformer,
            });
        };

        let reconciliation = reconcile(&explicit.fields, &dataset.schema, self.config.force_update)?;
        for key in &reconciliation.appended {
            self.reporter.info(&format!("New column '{key}' will be added"));
        }
        for key in &reconciliation.patched {
            self.reporter.info(&format!("Column '{key}' will be updated"));
        }

        let pending_schema = reconciliation
            .changed()
            .then_some(reconciliation.schema);
        Ok(Prepared {
            dataset,
            pending_schema,
            transformer: self.explicit_transformer(),
        })
    }

    async fn persist_schema(
        &self,
        dataset_id: &str,
        schema: &[SchemaField],
        report: &mut SyncReport,
    ) -> Result<()> {
        self.reporter
            .info(&format!("Updating dataset schema ({} columns)", schema.len()));
        let checkpoint = self.waiter.checkpoint(dataset_id, FINALIZE_END).await?;
        self.api.update_schema(dataset_id, schema).await?;
        self.waiter
            .wait_for_event(dataset_id, FINALIZE_END, &checkpoint)
            .await?;
        report.add_schema_update();
        Ok(())
    }

    // ========================================================================
    // Fetch loop
    // ========================================================================

    fn source_client(&self) -> Result<HttpClient> {
        let mut builder = HttpClientConfig::builder();
        if let Some(rps) = self.config.requests_per_second {
            builder = builder.rate_limit(RateLimiterConfig::per_second(rps));
        }
        HttpClient::with_config(builder.build())
    }

    async fn fetch_loop(
        &self,
        mut prepared: Prepared,
        auth: &AuthHeaders,
        report: &mut SyncReport,
    ) -> Result<()> {
        let owned_client;
        let source = match &self.source {
            Some(client) => client,
            None => {
                owned_client = self.source_client()?;
                &owned_client
            }
        };

        if self.config.uses_legacy_pagination() {
            self.reporter.warning(
                "nextPagePath is deprecated, use pagination with method nextPageData instead",
            );
        }
        let paginator = build_paginator(
            self.config.pagination.as_ref(),
            self.config.next_page_path.as_deref(),
        );

        let mut state = PaginationState::new();
        state.next_page_url = Some(paginator.first_page(&self.config.api_url)?);

        while let Some(url) = state.next_page_url.take() {
            self.reporter.info(&format!("Fetching {url}"));
            let payload = source
                .get_json(&url, RequestConfig::new().headers(auth.iter()))
                .await?;
            report.add_page();

            let Some(payload) = payload else {
                debug!("Empty response from {url}, stopping");
                break;
            };
            let records = self.extract_records(&payload)?;
            if records.is_empty() {
                debug!("No records in response from {url}, stopping");
                break;
            }
            if records.len() > LARGE_PAGE_ROWS {
                self.reporter.warning(&format!(
                    "Page returned {} rows, consider a smaller page size",
                    records.len()
                ));
            }
            state.advance(records.len());

            let rows = prepared.transformer.transform_page(&records);
            report.add_lines(rows.len());

            if report.lines > 0 {
                self.flush_page(&mut prepared, &rows, report).await?;
            }

            state.next_page_url = paginator
                .next_page(&url, &payload, records.len(), &state)?
                .into_url();
        }

        Ok(())
    }

    /// Persist any pending schema change, then upload the rows of a page
    async fn flush_page(
        &self,
        prepared: &mut Prepared,
        rows: &[Row],
        report: &mut SyncReport,
    ) -> Result<()> {
        if let Some(schema) = prepared.pending_schema.take() {
            self.persist_schema(&prepared.dataset.id, &schema, report)
                .await?;
        }
        if let Some(schema) = prepared.transformer.pending_schema().map(<[_]>::to_vec) {
            self.persist_schema(&prepared.dataset.id, &schema, report)
                .await?;
            prepared.transformer.mark_schema_persisted();
        }

        if rows.is_empty() {
            return Ok(());
        }
        self.upload(&prepared.dataset.id, rows, report).await
    }

    /// Pull the record array out of a page payload
    fn extract_records(&self, payload: &Value) -> Result<Vec<Value>> {
        let data = match self.config.result_path() {
            Some(result_path) => path::get(payload, result_path).ok_or_else(|| {
                Error::extraction(result_path, "path does not exist in the API response")
            })?,
            None => payload,
        };

        match data {
            Value::Array(records) => Ok(records.clone()),
            other => {
                self.reporter
                    .warning("The API result is not an array, treating it as a single record");
                Ok(vec![other.clone()])
            }
        }
    }

    async fn upload(&self, dataset_id: &str, rows: &[Row], report: &mut SyncReport) -> Result<()> {
        self.reporter.info(&format!("Uploading {} lines", rows.len()));

        let (failed, message) = match self.api.bulk_lines(dataset_id, rows).await {
            Ok(result) if !result.has_errors() => {
                report.add_uploaded(rows.len());
                return Ok(());
            }
            Ok(result) => {
                let failed = (result.nb_errors as usize).clamp(1, rows.len());
                report.add_uploaded(rows.len() - failed);
                let first = result
                    .errors
                    .first()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                (failed, format!("{failed} lines rejected {first}"))
            }
            Err(e) => (rows.len(), e.to_string()),
        };

        report.add_upload_errors(failed);
        match self.config.upload_error_policy {
            UploadErrorPolicy::Abort => Err(Error::upload(dataset_id, message)),
            UploadErrorPolicy::Skip => {
                self.reporter
                    .error(&format!("Upload failed, continuing: {message}"));
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for SyncOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncOrchestrator")
            .field("config", &self.config)
            .field("has_source_client", &self.source.is_some())
            .finish_non_exhaustive()
    }
}
