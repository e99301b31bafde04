//! Schema types
//!
//! `ColumnSpec` is the user-facing column configuration; `SchemaField` is one
//! column of the destination dataset, in the dataset API's wire shape.

use crate::types::JsonObject;
use serde::{Deserialize, Serialize};

/// Separator used to serialize multivalued cells
pub const MULTIVALUE_SEPARATOR: &str = ";";

// ============================================================================
// Column configuration
// ============================================================================

/// Nominal type of a configured column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColumnType {
    #[default]
    #[serde(alias = "Texte", alias = "string", alias = "text")]
    Text,
    #[serde(alias = "Nombre", alias = "number")]
    Number,
    #[serde(alias = "Nombre entier", alias = "Entier", alias = "integer")]
    Integer,
    #[serde(alias = "date")]
    Date,
    #[serde(alias = "Date et heure", alias = "date-time", alias = "datetime")]
    DateTime,
    #[serde(alias = "Booléen", alias = "boolean")]
    Boolean,
    #[serde(alias = "Objet", alias = "object")]
    Object,
}

/// One configured column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    /// Dotted path of the value inside a source record
    pub column_path: String,
    /// Human-readable title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
    /// Nominal type
    #[serde(default)]
    pub column_type: ColumnType,
    /// Source value is an array serialized as a `;`-joined string
    #[serde(default)]
    pub multivalued: bool,
    /// Index of the path segment holding the array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_of_the_array: Option<usize>,
    /// Part of the dataset primary key
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time_format: Option<String>,
}

impl ColumnSpec {
    /// Create a scalar column
    pub fn new(column_path: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            column_path: column_path.into(),
            column_name: None,
            column_type,
            multivalued: false,
            level_of_the_array: None,
            is_primary_key: false,
            date_format: None,
            date_time_format: None,
        }
    }

    /// Set the title
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.column_name = Some(name.into());
        self
    }

    /// Mark as multivalued, with the array at path segment `level`
    #[must_use]
    pub fn multivalued_at(mut self, level: usize) -> Self {
        self.multivalued = true;
        self.level_of_the_array = Some(level);
        self
    }

    /// Mark as part of the primary key
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Array level, defaulting to the first segment
    pub fn array_level(&self) -> usize {
        self.level_of_the_array.unwrap_or(0)
    }
}

// ============================================================================
// Destination schema
// ============================================================================

/// Storage type of a schema field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    /// A type this crate never produces, kept as-is from an existing dataset
    Other(String),
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "string" => FieldType::String,
            "number" => FieldType::Number,
            "integer" => FieldType::Integer,
            "boolean" => FieldType::Boolean,
            _ => FieldType::Other(s),
        }
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.to_string()
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Number => write!(f, "number"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Format hint of a string field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldFormat {
    Date,
    DateTime,
    /// Any other format found on an existing dataset (e.g. `uri-reference`)
    Other(String),
}

impl From<String> for FieldFormat {
    fn from(s: String) -> Self {
        match s.as_str() {
            "date" => FieldFormat::Date,
            "date-time" => FieldFormat::DateTime,
            _ => FieldFormat::Other(s),
        }
    }
}

impl From<FieldFormat> for String {
    fn from(f: FieldFormat) -> Self {
        f.to_string()
    }
}

impl std::fmt::Display for FieldFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldFormat::Date => write!(f, "date"),
            FieldFormat::DateTime => write!(f, "date-time"),
            FieldFormat::Other(s) => write!(f, "{s}"),
        }
    }
}

/// One column of a destination dataset schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Column key, unique within the schema
    pub key: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FieldFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    /// Source path, when it differs from `key`
    #[serde(
        rename = "x-originalName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub original_name: Option<String>,
    #[serde(
        rename = "dateFormat",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub date_format: Option<String>,
    #[serde(
        rename = "dateTimeFormat",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub date_time_format: Option<String>,
    /// Attributes owned by the dataset service, preserved verbatim
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl SchemaField {
    /// Create a field with the given key and type; title defaults to the key
    pub fn new(key: impl Into<String>, field_type: FieldType) -> Self {
        let key = key.into();
        Self {
            title: key.clone(),
            key,
            field_type,
            format: None,
            separator: None,
            original_name: None,
            date_format: None,
            date_time_format: None,
            extra: JsonObject::new(),
        }
    }

    /// Set the format
    #[must_use]
    pub fn with_format(mut self, format: FieldFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Set the multivalue separator
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// Set the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Whether the field holds a date or date-time
    pub fn is_temporal(&self) -> bool {
        matches!(self.format, Some(FieldFormat::Date | FieldFormat::DateTime))
    }

    /// Whether the field is computed by the dataset service itself
    pub fn is_calculated(&self) -> bool {
        self.extra
            .get("x-calculated")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}

// ============================================================================
// Type table
// ============================================================================

/// Schema type and format for one column type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    pub field_type: FieldType,
    pub format: Option<FieldFormat>,
}

/// Immutable mapping from [`ColumnType`] to schema type and format
#[derive(Debug, Clone)]
pub struct TypeTable {
    entries: [(ColumnType, TypeMapping); 7],
}

/// The mapping used by explicit mode
pub static STANDARD_TYPE_TABLE: TypeTable = TypeTable::standard();

impl TypeTable {
    /// Text→string, Number→number, Integer→integer, Date→string+date,
    /// DateTime→string+date-time, Boolean→boolean, Object→string
    pub const fn standard() -> Self {
        Self {
            entries: [
                (ColumnType::Text, mapping(FieldType::String, None)),
                (ColumnType::Number, mapping(FieldType::Number, None)),
                (ColumnType::Integer, mapping(FieldType::Integer, None)),
                (
                    ColumnType::Date,
                    mapping(FieldType::String, Some(FieldFormat::Date)),
                ),
                (
                    ColumnType::DateTime,
                    mapping(FieldType::String, Some(FieldFormat::DateTime)),
                ),
                (ColumnType::Boolean, mapping(FieldType::Boolean, None)),
                (ColumnType::Object, mapping(FieldType::String, None)),
            ],
        }
    }

    /// Look up the mapping of a column type
    pub fn lookup(&self, column_type: ColumnType) -> &TypeMapping {
        self.entries
            .iter()
            .find(|(t, _)| *t == column_type)
            .map(|(_, m)| m)
            .unwrap_or(&self.entries[0].1)
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::standard()
    }
}

const fn mapping(field_type: FieldType, format: Option<FieldFormat>) -> TypeMapping {
    TypeMapping { field_type, format }
}
