//! Schema built from explicit column configuration

use super::types::{
    ColumnSpec, ColumnType, FieldFormat, FieldType, SchemaField, TypeTable, MULTIVALUE_SEPARATOR,
};
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Derive a schema key from a source path: strip every `.`, then one leading `_`
pub fn normalize_key(path: &str) -> String {
    let key: String = path.chars().filter(|c| *c != '.').collect();
    match key.strip_prefix('_') {
        Some(stripped) => stripped.to_string(),
        None => key,
    }
}

/// Schema computed from the configured columns
#[derive(Debug, Clone, PartialEq)]
pub struct ExplicitSchema {
    /// One field per column, in configuration order
    pub fields: Vec<SchemaField>,
    /// Keys of the primary key columns
    pub primary_key: Vec<String>,
}

impl ExplicitSchema {
    /// Whether any column is part of the primary key
    pub fn has_primary_key(&self) -> bool {
        !self.primary_key.is_empty()
    }
}

/// Build the destination schema for `columns`
///
/// Fails when a column path is empty or two columns normalize to the same key.
pub fn build_explicit_schema(columns: &[ColumnSpec], table: &TypeTable) -> Result<ExplicitSchema> {
    let mut fields = Vec::with_capacity(columns.len());
    let mut primary_key = Vec::new();
    let mut seen: HashMap<String, &str> = HashMap::new();

    for column in columns {
        let field = column_field(column, table)?;

        if let Some(previous) = seen.insert(field.key.clone(), &column.column_path) {
            return Err(Error::invalid_value(
                "columns",
                format!(
                    "columns '{previous}' and '{}' both map to key '{}'",
                    column.column_path, field.key
                ),
            ));
        }

        if column.is_primary_key {
            primary_key.push(field.key.clone());
        }
        fields.push(field);
    }

    Ok(ExplicitSchema {
        fields,
        primary_key,
    })
}

/// Build the schema field of a single column
pub fn column_field(column: &ColumnSpec, table: &TypeTable) -> Result<SchemaField> {
    if column.column_path.is_empty() {
        return Err(Error::invalid_value("columnPath", "column path cannot be empty"));
    }

    let key = normalize_key(&column.column_path);
    if key.is_empty() {
        return Err(Error::invalid_value(
            "columnPath",
            format!("'{}' does not yield a usable key", column.column_path),
        ));
    }

    let mapping = table.lookup(column.column_type);
    let title = column
        .column_name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| column.column_path.clone());

    let mut field = if column.multivalued {
        SchemaField::new(key.clone(), FieldType::String).with_separator(MULTIVALUE_SEPARATOR)
    } else {
        let mut field = SchemaField::new(key.clone(), mapping.field_type.clone());
        field.format.clone_from(&mapping.format);
        field
    };
    field.title = title;

    if key != column.column_path {
        field.original_name = Some(column.column_path.clone());
    }

    match (column.column_type, &field.format) {
        (ColumnType::Date, Some(FieldFormat::Date)) => {
            field.date_format.clone_from(&column.date_format);
        }
        (ColumnType::DateTime, Some(FieldFormat::DateTime)) => {
            field.date_time_format.clone_from(&column.date_time_format);
        }
        _ => {}
    }

    Ok(field)
}
