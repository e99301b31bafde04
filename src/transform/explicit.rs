//! Row transformation driven by configured columns

use crate::path;
use crate::schema::{normalize_key, ColumnSpec, ColumnType, MULTIVALUE_SEPARATOR};
use crate::types::Row;
use serde_json::{Number, Value};
use tracing::debug;

/// Reshapes records into rows, one cell per configured column
#[derive(Debug, Clone)]
pub struct ExplicitTransformer {
    columns: Vec<(String, ColumnSpec)>,
    fill_missing_with_empty: bool,
}

impl ExplicitTransformer {
    /// Create a transformer for `columns`
    pub fn new(columns: &[ColumnSpec]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|c| (normalize_key(&c.column_path), c.clone()))
                .collect(),
            fill_missing_with_empty: false,
        }
    }

    /// Write `""` for absent values instead of omitting the key
    #[must_use]
    pub fn fill_missing_with_empty(mut self, enabled: bool) -> Self {
        self.fill_missing_with_empty = enabled;
        self
    }

    /// Transform one source record
    pub fn transform(&self, record: &Value) -> Row {
        let mut row = Row::new();
        for (key, column) in &self.columns {
            if column.multivalued {
                row.insert(key.clone(), Value::String(multivalued_cell(record, column)));
                continue;
            }

            match path::get(record, &column.column_path) {
                Some(value) if !is_empty_string(value) => {
                    if let Some(cell) = coerce(value, column) {
                        row.insert(key.clone(), cell);
                    }
                }
                _ => {
                    if self.fill_missing_with_empty {
                        row.insert(key.clone(), Value::String(String::new()));
                    }
                }
            }
        }
        row
    }
}

fn multivalued_cell(record: &Value, column: &ColumnSpec) -> String {
    path::get_array(record, &column.column_path, column.array_level())
        .iter()
        .map(|element| render_element(element, column.column_type))
        .collect::<Vec<_>>()
        .join(MULTIVALUE_SEPARATOR)
}

fn render_element(element: &Value, column_type: ColumnType) -> String {
    match (element, column_type) {
        (Value::Null, _) => String::new(),
        (_, ColumnType::Number) => to_f64(element).map_or_else(|| text(element), |f| f.to_string()),
        (_, ColumnType::Integer) => {
            to_i64(element).map_or_else(|| text(element), |i| i.to_string())
        }
        (_, ColumnType::Object) => serde_json::to_string(element).unwrap_or_default(),
        _ => text(element),
    }
}

/// Coerce a present scalar value; `None` drops the cell
fn coerce(value: &Value, column: &ColumnSpec) -> Option<Value> {
    match column.column_type {
        ColumnType::Number => {
            let coerced = to_f64(value).and_then(Number::from_f64).map(Value::Number);
            if coerced.is_none() {
                debug!(
                    "Dropping non-numeric value {} for column '{}'",
                    value, column.column_path
                );
            }
            coerced
        }
        ColumnType::Integer => {
            let coerced = to_i64(value).map(Value::from);
            if coerced.is_none() {
                debug!(
                    "Dropping non-integer value {} for column '{}'",
                    value, column.column_path
                );
            }
            coerced
        }
        ColumnType::Object => Some(match value {
            Value::String(_) => value.clone(),
            _ => Value::String(serde_json::to_string(value).unwrap_or_default()),
        }),
        ColumnType::Text | ColumnType::Date | ColumnType::DateTime | ColumnType::Boolean => {
            Some(match value {
                Value::Array(_) | Value::Object(_) => {
                    Value::String(serde_json::to_string(value).unwrap_or_default())
                }
                _ => value.clone(),
            })
        }
    }
}

fn is_empty_string(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.is_empty())
}

fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// Plain text of a value: strings unquoted, everything else as JSON
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        _ => value.to_string(),
    }
}
