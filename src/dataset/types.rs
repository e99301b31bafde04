//! Dataset API types

use crate::http::{HttpClient, HttpClientConfig};
use crate::error::Result;
use crate::schema::SchemaField;
use crate::types::{DatasetMode, JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

/// Header carrying the dataset API key
pub const API_KEY_HEADER: &str = "x-apiKey";

// ============================================================================
// Connection
// ============================================================================

/// Connection to the dataset service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetApiConfig {
    /// API root, e.g. `https://example.com/data-fair/api/v1`
    pub base_url: String,
    /// API key sent as `x-apiKey`
    pub api_key: Option<String>,
}

impl DatasetApiConfig {
    /// Create a connection config
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
        }
    }

    /// Set the API key
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Build an HTTP client pointed at the API root
    pub fn http_client(&self) -> Result<HttpClient> {
        let mut builder = HttpClientConfig::builder().base_url(self.base_url.clone());
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            builder = builder.header(API_KEY_HEADER, key);
        }
        HttpClient::with_config(builder.build())
    }
}

// ============================================================================
// Datasets
// ============================================================================

/// A dataset as returned by the dataset service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub schema: Vec<SchemaField>,
    #[serde(default)]
    pub is_rest: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// Attributes this crate does not model
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl Dataset {
    /// Reference to this dataset, as persisted in the processing config
    pub fn reference(&self) -> DatasetRef {
        DatasetRef {
            id: self.id.clone(),
            title: self.title.clone(),
        }
    }
}

/// Body of a dataset creation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetDraft {
    pub is_rest: bool,
    pub title: String,
    pub primary_key: Vec<String>,
    pub schema: Vec<SchemaField>,
    /// Requested id; the service picks one when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "JsonObject::is_empty")]
    pub extras: JsonObject,
}

impl DatasetDraft {
    /// Create a draft for a REST dataset
    pub fn new(title: impl Into<String>, schema: Vec<SchemaField>) -> Self {
        Self {
            is_rest: true,
            title: title.into(),
            primary_key: Vec::new(),
            schema,
            id: None,
            extras: JsonObject::new(),
        }
    }

    /// Set the primary key
    #[must_use]
    pub fn with_primary_key(mut self, primary_key: Vec<String>) -> Self {
        self.primary_key = primary_key;
        self
    }

    /// Request a specific id
    #[must_use]
    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    /// Record the processing that owns the dataset
    #[must_use]
    pub fn with_processing_id(mut self, processing_id: Option<&str>) -> Self {
        if let Some(id) = processing_id {
            self.extras
                .insert("processingId".to_string(), JsonValue::String(id.to_string()));
        }
        self
    }
}

/// Outcome of a bulk lines request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResult {
    #[serde(default)]
    pub nb_ok: u64,
    #[serde(default)]
    pub nb_not_modified: u64,
    #[serde(default)]
    pub nb_errors: u64,
    #[serde(default)]
    pub errors: Vec<JsonValue>,
}

impl BulkResult {
    /// Whether some lines were rejected
    pub fn has_errors(&self) -> bool {
        self.nb_errors > 0 || !self.errors.is_empty()
    }
}

// ============================================================================
// Configuration patch
// ============================================================================

/// Id and title of the target dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRef {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// Change applied to the processing configuration after a dataset is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    pub dataset_mode: DatasetMode,
    pub dataset: DatasetRef,
}

impl ConfigPatch {
    /// Switch the configuration to update mode on `dataset`
    pub fn update_mode(dataset: DatasetRef) -> Self {
        Self {
            dataset_mode: DatasetMode::Update,
            dataset,
        }
    }
}
