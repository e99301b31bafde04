//! Dataset service client

use super::types::{BulkResult, Dataset, DatasetApiConfig, DatasetDraft};
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::schema::SchemaField;
use crate::types::Row;
use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

/// Operations the sync needs from the dataset service
#[async_trait]
pub trait DatasetApi: Send + Sync {
    /// Create a dataset
    async fn create_dataset(&self, draft: &DatasetDraft) -> Result<Dataset>;

    /// Fetch a dataset, `None` when it does not exist
    async fn get_dataset(&self, id: &str) -> Result<Option<Dataset>>;

    /// Replace the schema of a dataset
    async fn update_schema(&self, id: &str, schema: &[SchemaField]) -> Result<Dataset>;

    /// Upload rows
    async fn bulk_lines(&self, id: &str, rows: &[Row]) -> Result<BulkResult>;
}

/// [`DatasetApi`] over HTTP
///
/// Endpoints, relative to the API root:
/// - `POST /datasets`
/// - `GET /datasets/{id}`
/// - `POST /datasets/{id}` (multipart, `schema` field)
/// - `POST /datasets/{id}/_bulk_lines`
#[derive(Debug)]
pub struct HttpDatasetApi {
    client: HttpClient,
}

impl HttpDatasetApi {
    /// Create a client for the given connection
    pub fn new(config: &DatasetApiConfig) -> Result<Self> {
        Ok(Self {
            client: config.http_client()?,
        })
    }

    /// Create a client around an already configured HTTP client
    pub fn with_client(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DatasetApi for HttpDatasetApi {
    async fn create_dataset(&self, draft: &DatasetDraft) -> Result<Dataset> {
        debug!("Creating dataset '{}'", draft.title);
        let body = serde_json::to_value(draft)?;
        self.client
            .request_json(Method::POST, "datasets", RequestConfig::new().json(body))
            .await
    }

    async fn get_dataset(&self, id: &str) -> Result<Option<Dataset>> {
        let url = format!("datasets/{id}");
        match self.client.get_json(&url, RequestConfig::new()).await {
            Ok(Some(value)) => Ok(Some(serde_json::from_value(value)?)),
            Ok(None) | Err(Error::HttpStatus { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn update_schema(&self, id: &str, schema: &[SchemaField]) -> Result<Dataset> {
        debug!("Updating schema of dataset '{}' ({} fields)", id, schema.len());
        let form = Form::new().text("schema", serde_json::to_string(schema)?);
        let response = self
            .client
            .post_multipart(&format!("datasets/{id}"), form)
            .await?;
        Ok(response.json().await?)
    }

    async fn bulk_lines(&self, id: &str, rows: &[Row]) -> Result<BulkResult> {
        debug!("Uploading {} lines to dataset '{}'", rows.len(), id);
        let body = Value::Array(rows.iter().cloned().map(Value::Object).collect());
        let response = self
            .client
            .post(&format!("datasets/{id}/_bulk_lines"), body)
            .await;

        match response {
            Ok(response) => {
                let text = response.text().await?;
                if text.trim().is_empty() {
                    return Ok(BulkResult::default());
                }
                Ok(serde_json::from_str(&text)?)
            }
            // Rejected lines come back as a 400 carrying the usual summary
            Err(Error::HttpStatus { status: 400, body }) => {
                match serde_json::from_str::<BulkResult>(&body) {
                    Ok(result) if result.has_errors() => Ok(result),
                    _ => Err(Error::http_status(400, body)),
                }
            }
            Err(e) => Err(e),
        }
    }
}
