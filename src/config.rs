//! Processing configuration
//!
//! These types mirror the configuration of one sync: where to read, how to
//! paginate and authenticate, and which dataset to write to.

use crate::auth::AuthConfig;
use crate::error::{Error, Result};
use crate::pagination::PaginationConfig;
use crate::schema::ColumnSpec;
use crate::types::{DatasetMode, FalsyPolicy, UploadErrorPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Processing Config
// ============================================================================

/// Configuration of one sync
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingConfig {
    /// Create the dataset, or update an existing one
    #[serde(default)]
    pub dataset_mode: DatasetMode,

    /// Target dataset
    #[serde(default)]
    pub dataset: DatasetTarget,

    /// First page of the source API
    #[serde(rename = "apiURL")]
    pub api_url: String,

    /// Dotted path of the result array inside each payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_path: Option<String>,

    /// Infer the schema from the records instead of using `columns`
    #[serde(default)]
    pub detect_schema: bool,

    /// Configured columns (explicit mode)
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,

    /// Pagination strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationConfig>,

    /// Deprecated: path of the next page URL, use `pagination` instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_path: Option<String>,

    /// Source API authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,

    /// Deprecated: raw `Authorization` header value, use `auth` instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_header: Option<String>,

    /// Apply cosmetic schema changes and new columns to an existing dataset
    #[serde(default)]
    pub force_update: bool,

    /// What to do when a bulk upload fails
    #[serde(default)]
    pub upload_error_policy: UploadErrorPolicy,

    /// How inferred rows treat `0`, `false` and `""`
    #[serde(default)]
    pub falsy_values: FalsyPolicy,

    /// Write `""` instead of omitting absent explicit columns
    #[serde(default)]
    pub fill_missing_with_empty: bool,

    /// Id of the processing owning the dataset, stored in its extras
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_id: Option<String>,

    /// Rate limit on source requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_per_second: Option<u32>,
}

/// Id and title of the target dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetTarget {
    /// Dataset id; required in update mode, optional in create mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Dataset title
    #[serde(default)]
    pub title: String,
}

/// How the destination schema is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaMode {
    /// From `columns`
    Explicit,
    /// From the records themselves
    Inferred,
}

impl ProcessingConfig {
    /// Create a config reading `api_url` into a new dataset titled `title`
    pub fn new(api_url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            dataset: DatasetTarget {
                id: None,
                title: title.into(),
            },
            ..Self::default()
        }
    }

    /// Schema mode of this config
    pub fn schema_mode(&self) -> SchemaMode {
        if self.detect_schema {
            SchemaMode::Inferred
        } else {
            SchemaMode::Explicit
        }
    }

    /// Dataset id, if set and non-empty
    pub fn dataset_id(&self) -> Option<&str> {
        self.dataset.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Result path, if set and non-empty
    pub fn result_path(&self) -> Option<&str> {
        self.result_path.as_deref().filter(|p| !p.is_empty())
    }

    /// Whether the deprecated top-level `nextPagePath` drives pagination
    pub fn uses_legacy_pagination(&self) -> bool {
        self.pagination.is_none() && self.next_page_path.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Source authentication, falling back to the raw `authorizationHeader`
    pub fn resolved_auth(&self) -> AuthConfig {
        if let Some(auth) = &self.auth {
            return auth.clone();
        }
        match self.authorization_header.clone().filter(|h| !h.is_empty()) {
            Some(value) => AuthConfig::ApiKey {
                header: "Authorization".to_string(),
                value,
            },
            None => AuthConfig::None,
        }
    }

    /// Check the configuration before any request is made
    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(Error::missing_field("apiURL"));
        }
        url::Url::parse(&self.api_url)
            .map_err(|e| Error::invalid_value("apiURL", format!("'{}': {e}", self.api_url)))?;

        if self.dataset_mode == DatasetMode::Update && self.dataset_id().is_none() {
            return Err(Error::missing_field("dataset.id"));
        }

        if self.schema_mode() == SchemaMode::Explicit && self.columns.is_empty() {
            return Err(Error::invalid_value(
                "columns",
                "at least one column is required unless detectSchema is set",
            ));
        }

        match &self.pagination {
            Some(PaginationConfig::QueryParams { offset_key, .. }) if offset_key.is_empty() => {
                return Err(Error::missing_field("pagination.offsetKey"));
            }
            Some(PaginationConfig::NextPageData { next_page_path, .. })
                if next_page_path.is_empty() =>
            {
                return Err(Error::missing_field("pagination.nextPagePath"));
            }
            _ => {}
        }

        if self.requests_per_second == Some(0) {
            return Err(Error::invalid_value(
                "requestsPerSecond",
                "must be greater than 0",
            ));
        }

        Ok(())
    }
}

// ============================================================================
// File format
// ============================================================================

/// Serialization format of a configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Format implied by the file extension; anything but `.json` is YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnType;

    fn explicit() -> ProcessingConfig {
        let mut config = ProcessingConfig::new("http://api.test/items", "Items");
        config.columns = vec![ColumnSpec::new("id", ColumnType::Integer)];
        config
    }

    #[test]
    fn test_validate_ok() {
        explicit().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_empty_api_url() {
        let mut config = explicit();
        config.api_url = String::new();
        assert!(matches!(
            config.validate(),
            Err(Error::MissingConfigField { ref field }) if field == "apiURL"
        ));
    }

    #[test]
    fn test_validate_update_needs_id() {
        let mut config = explicit();
        config.dataset_mode = DatasetMode::Update;
        assert!(config.validate().is_err());

        config.dataset.id = Some("ds1".to_string());
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_explicit_needs_columns() {
        let mut config = explicit();
        config.columns.clear();
        assert!(config.validate().is_err());

        config.detect_schema = true;
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_pagination_keys() {
        let mut config = explicit();
        config.pagination = Some(PaginationConfig::query_params(""));
        assert!(config.validate().is_err());

        config.pagination = Some(PaginationConfig::next_page_data(""));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolved_auth_legacy_header() {
        let mut config = explicit();
        assert_eq!(config.resolved_auth(), AuthConfig::None);

        config.authorization_header = Some("Token abc".to_string());
        assert_eq!(
            config.resolved_auth(),
            AuthConfig::ApiKey {
                header: "Authorization".to_string(),
                value: "Token abc".to_string()
            }
        );

        config.auth = Some(AuthConfig::Bearer {
            token: "t".to_string(),
        });
        assert_eq!(config.resolved_auth().method_name(), "bearerAuth");
    }

    #[test]
    fn test_legacy_pagination_detection() {
        let mut config = explicit();
        assert!(!config.uses_legacy_pagination());
        config.next_page_path = Some("next".to_string());
        assert!(config.uses_legacy_pagination());
        config.pagination = Some(PaginationConfig::None);
        assert!(!config.uses_legacy_pagination());
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.yml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a")), ConfigFormat::Yaml);
    }
}
