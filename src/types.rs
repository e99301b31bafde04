//! Common types used throughout api-dataset-sync
//!
//! This module contains shared type definitions, type aliases,
//! and small policy enums used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A transformed row: schema key to scalar value. Absent keys are null cells.
pub type Row = serde_json::Map<String, JsonValue>;

// ============================================================================
// Dataset Mode
// ============================================================================

/// Whether the run creates the destination dataset or updates an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetMode {
    /// Create a new dataset on the first run
    #[default]
    Create,
    /// Target an existing dataset by id
    Update,
}

// ============================================================================
// Upload Error Policy
// ============================================================================

/// What to do when a bulk upload request fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadErrorPolicy {
    /// Propagate the error and abort the run
    #[default]
    Abort,
    /// Log the error and continue with the next page
    Skip,
}

// ============================================================================
// Falsy Policy
// ============================================================================

/// How inferred-mode rows treat `0`, `false`, `""` and `null`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FalsyPolicy {
    /// Falsy values are omitted from the row (null cell)
    #[default]
    #[serde(alias = "treat_as_absent")]
    Absent,
    /// Falsy values are written as-is; only `null` is omitted
    Keep,
}

impl FalsyPolicy {
    /// Check whether a value counts as "no value" under this policy
    pub fn is_absent(self, value: &JsonValue) -> bool {
        match self {
            FalsyPolicy::Absent => is_falsy(value),
            FalsyPolicy::Keep => value.is_null(),
        }
    }
}

/// JavaScript-style falsiness for JSON values
pub fn is_falsy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Bool(b) => !b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => false,
    }
}

// ============================================================================
// Log Level
// ============================================================================

/// Level of an operator-facing progress message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dataset_mode_serde() {
        let mode: DatasetMode = serde_json::from_str("\"update\"").unwrap();
        assert_eq!(mode, DatasetMode::Update);

        let json = serde_json::to_string(&DatasetMode::Create).unwrap();
        assert_eq!(json, "\"create\"");
    }

    #[test]
    fn test_upload_policy_default() {
        assert_eq!(UploadErrorPolicy::default(), UploadErrorPolicy::Abort);
        let policy: UploadErrorPolicy = serde_json::from_str("\"skip\"").unwrap();
        assert_eq!(policy, UploadErrorPolicy::Skip);
    }

    #[test]
    fn test_is_falsy() {
        assert!(is_falsy(&json!(null)));
        assert!(is_falsy(&json!(0)));
        assert!(is_falsy(&json!(0.0)));
        assert!(is_falsy(&json!(false)));
        assert!(is_falsy(&json!("")));
        assert!(!is_falsy(&json!(1)));
        assert!(!is_falsy(&json!("0")));
        assert!(!is_falsy(&json!([])));
        assert!(!is_falsy(&json!({})));
    }

    #[test]
    fn test_falsy_policy() {
        assert!(FalsyPolicy::Absent.is_absent(&json!(0)));
        assert!(!FalsyPolicy::Keep.is_absent(&json!(0)));
        assert!(FalsyPolicy::Keep.is_absent(&json!(null)));
    }
}
