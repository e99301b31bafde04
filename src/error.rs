//! Error types for api-dataset-sync
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for api-dataset-sync
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Schema Errors
    // ============================================================================
    /// The configuration changed in a way the existing dataset cannot absorb
    #[error("Incompatible schema change for column '{key}': {message}")]
    SchemaIncompatible { key: String, message: String },

    /// The existing dataset needs a patch that is only applied with forceUpdate
    #[error("Schema change for column '{key}' requires forceUpdate: {message}")]
    SchemaForceUpdateRequired { key: String, message: String },

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("OAuth2 error: {message}")]
    OAuth2 { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Upstream Data Errors
    // ============================================================================
    #[error("Failed to extract records from path '{path}': {message}")]
    RecordExtraction { path: String, message: String },

    // ============================================================================
    // Dataset Errors
    // ============================================================================
    #[error("Dataset '{id}' does not exist")]
    DatasetNotFound { id: String },

    #[error("Dataset '{dataset_id}' did not report '{event}' within {timeout_secs}s")]
    FinalizeTimeout {
        dataset_id: String,
        event: String,
        timeout_secs: u64,
    },

    #[error("Bulk upload to dataset '{dataset_id}' failed: {message}")]
    Upload { dataset_id: String, message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create an incompatible schema error
    pub fn schema_incompatible(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaIncompatible {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a force-update-required error
    pub fn force_update_required(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaForceUpdateRequired {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a record extraction error
    pub fn extraction(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RecordExtraction {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an upload error
    pub fn upload(dataset_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upload {
            dataset_id: dataset_id.into(),
            message: message.into(),
        }
    }

    /// Whether this error comes from a schema reconciliation
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Error::SchemaIncompatible { .. } | Error::SchemaForceUpdateRequired { .. }
        )
    }

    /// Whether this error was raised while resolving credentials
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth { .. } | Error::OAuth2 { .. })
    }
}

/// Result type alias for api-dataset-sync
pub type Result<T> = std::result::Result<T, Error>;
