//! Incremental schema inference from JSON records

use super::explicit::normalize_key;
use super::types::{FieldFormat, FieldType, SchemaField, MULTIVALUE_SEPARATOR};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

static ISO_DATE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}([T ]\d{2}:\d{2}(:\d{2}(\.\d+)?)?)?(Z|[+-]\d{2}:?\d{2})?$")
        .unwrap()
});

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Grows a schema from the records it observes
///
/// Fields are only ever appended: a key keeps the type of the first
/// non-null value seen for it. Each key is bound to the first source key
/// that normalized to it; other source keys mapping to the same key are
/// skipped.
#[derive(Debug, Clone)]
pub struct SchemaInferrer {
    fields: Vec<SchemaField>,
    index: HashMap<String, usize>,
    /// Normalized key -> source key it was registered from
    sources: HashMap<String, String>,
    collisions: BTreeSet<String>,
    dirty: bool,
}

impl Default for SchemaInferrer {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaInferrer {
    /// Create an inferrer with an empty schema
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            index: HashMap::new(),
            sources: HashMap::new(),
            collisions: BTreeSet::new(),
            dirty: false,
        }
    }

    /// Create an inferrer seeded with the schema of an existing dataset
    pub fn seeded(existing: impl IntoIterator<Item = SchemaField>) -> Self {
        let mut inferrer = Self::new();
        for field in existing {
            if let Some(original) = &field.original_name {
                inferrer.sources.insert(field.key.clone(), original.clone());
            }
            inferrer.index.insert(field.key.clone(), inferrer.fields.len());
            inferrer.fields.push(field);
        }
        inferrer
    }

    /// Register the top-level keys of `record` that are not known yet
    ///
    /// Returns the keys added by this record.
    pub fn observe(&mut self, record: &Value) -> Vec<String> {
        let Value::Object(map) = record else {
            return Vec::new();
        };

        let mut added = Vec::new();
        for (source_key, value) in map {
            let key = normalize_key(source_key);
            if key.is_empty() {
                continue;
            }
            match self.sources.get(&key) {
                Some(bound) if bound == source_key => continue,
                Some(bound) => {
                    if self.collisions.insert(source_key.clone()) {
                        warn!(
                            "Skipping key '{}': it normalizes to '{}', already taken by '{}'",
                            source_key, key, bound
                        );
                    }
                    continue;
                }
                None => {}
            }
            if self.index.contains_key(&key) {
                // seeded field without a recorded source name
                self.sources.insert(key, source_key.clone());
                continue;
            }
            let Some(mut field) = classify(&key, value) else {
                continue;
            };
            if key != *source_key {
                field.original_name = Some(source_key.clone());
            }
            self.sources.insert(key.clone(), source_key.clone());
            self.index.insert(key.clone(), self.fields.len());
            self.fields.push(field);
            self.dirty = true;
            added.push(key);
        }
        added
    }

    /// Field registered under `key`
    pub fn field(&self, key: &str) -> Option<&SchemaField> {
        self.index.get(key).map(|i| &self.fields[*i])
    }

    /// Source key whose values are written under `key`
    pub fn source_of(&self, key: &str) -> Option<&str> {
        self.sources.get(key).map(String::as_str)
    }

    /// Source keys skipped because their normalized key was already taken
    pub fn collisions(&self) -> impl Iterator<Item = &str> {
        self.collisions.iter().map(String::as_str)
    }

    /// All fields, in registration order
    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    /// Whether fields were added since the last [`mark_clean`](Self::mark_clean)
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the current schema as persisted
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

fn classify(key: &str, value: &Value) -> Option<SchemaField> {
    let field = match value {
        Value::Null => return None,
        Value::Bool(_) => SchemaField::new(key, FieldType::Boolean),
        Value::Number(n) => {
            if is_whole(n) {
                SchemaField::new(key, FieldType::Integer)
            } else {
                SchemaField::new(key, FieldType::Number)
            }
        }
        Value::Array(_) => {
            SchemaField::new(key, FieldType::String).with_separator(MULTIVALUE_SEPARATOR)
        }
        Value::Object(_) => SchemaField::new(key, FieldType::String),
        Value::String(s) => {
            let field = SchemaField::new(key, FieldType::String);
            match parse_iso_datetime(s) {
                Some(dt) if is_midnight(&dt) => field.with_format(FieldFormat::Date),
                Some(_) => field.with_format(FieldFormat::DateTime),
                None => field,
            }
        }
    };
    Some(field)
}

fn is_whole(n: &serde_json::Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

fn is_midnight(dt: &DateTime<Utc>) -> bool {
    dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 && dt.nanosecond() == 0
}

/// Parse an ISO-8601 date or date-time; values without an offset are taken as UTC
pub fn parse_iso_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if !ISO_DATE_PREFIX.is_match(s) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
