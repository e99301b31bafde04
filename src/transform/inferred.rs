//! Row transformation for inferred schemas

use crate::schema::{normalize_key, parse_iso_datetime, SchemaField, SchemaInferrer};
use crate::types::{FalsyPolicy, Row};
use chrono::SecondsFormat;
use serde_json::Value;

/// Reshapes records into rows while growing the schema from their keys
#[derive(Debug, Clone, Default)]
pub struct InferredTransformer {
    inferrer: SchemaInferrer,
    falsy: FalsyPolicy,
}

impl InferredTransformer {
    /// Create a transformer around an inferrer
    pub fn new(inferrer: SchemaInferrer) -> Self {
        Self {
            inferrer,
            falsy: FalsyPolicy::default(),
        }
    }

    /// Set how `0`, `false` and `""` are written
    #[must_use]
    pub fn with_falsy_policy(mut self, policy: FalsyPolicy) -> Self {
        self.falsy = policy;
        self
    }

    /// The inferrer holding the schema seen so far
    pub fn inferrer(&self) -> &SchemaInferrer {
        &self.inferrer
    }

    /// Mutable access, used to mark the schema persisted
    pub fn inferrer_mut(&mut self) -> &mut SchemaInferrer {
        &mut self.inferrer
    }

    /// Register the keys of `record`, then transform it
    pub fn transform(&mut self, record: &Value) -> Row {
        self.inferrer.observe(record);

        let mut row = Row::new();
        let Value::Object(map) = record else {
            return row;
        };

        for (source_key, value) in map {
            let key = normalize_key(source_key);
            if self.inferrer.source_of(&key) != Some(source_key.as_str()) {
                continue;
            }
            let Some(field) = self.inferrer.field(&key) else {
                continue;
            };
            if let Some(cell) = format_value(field, value, self.falsy) {
                row.insert(key, cell);
            }
        }
        row
    }
}

fn format_value(field: &SchemaField, value: &Value, falsy: FalsyPolicy) -> Option<Value> {
    if field.is_temporal() {
        return match value {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(Value::String(
                parse_iso_datetime(s)
                    .map_or_else(|| s.clone(), |dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            )),
            Value::Bool(_) | Value::Number(_) => Some(Value::String(value.to_string())),
            Value::Array(_) | Value::Object(_) => Some(to_text(field, value)),
        };
    }

    if falsy.is_absent(value) {
        return None;
    }

    Some(match value {
        Value::Array(_) | Value::Object(_) => to_text(field, value),
        _ => value.clone(),
    })
}

/// Arrays join their JSON-encoded items with the field separator; objects become JSON text
fn to_text(field: &SchemaField, value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::String(
            items
                .iter()
                .map(|item| serde_json::to_string(item).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(field.separator.as_deref().unwrap_or(";")),
        ),
        _ => Value::String(serde_json::to_string(value).unwrap_or_default()),
    }
}
