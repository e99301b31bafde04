//! Dotted-path navigation over nested JSON
//!
//! Paths look like `data.items` or `metrics.views`. A leading `$.` is
//! accepted and ignored. Numeric segments index into arrays.
//!
//! Lookups never fail: an absent segment or a `null` along the way is
//! simply `None`, since missing data is routine in API payloads.

use serde_json::Value;

/// Split a dotted path into its segments
pub fn segments(path: &str) -> Vec<&str> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Vec::new();
    }
    path.split('.').collect()
}

/// Resolve `path` inside `value`
///
/// Returns `None` as soon as a segment is absent or `null`.
pub fn get<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    walk(value, &segments(path))
}

/// Resolve `path` and render the result as a string (strings, numbers, booleans)
pub fn get_string(value: &Value, path: &str) -> Option<String> {
    match get(value, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Resolve `path` treating the segment at index `level` as an array
///
/// The prefix up to and including segment `level` must resolve to an array,
/// otherwise the result is empty. Each element is then mapped through the
/// remaining suffix; elements where the suffix is absent yield `Value::Null`.
///
/// ```text
/// {"a": {"b": [{"c": 1}, {"c": 2}]}}  get_array("a.b.c", 1) -> [1, 2]
/// ```
pub fn get_array(value: &Value, path: &str, level: usize) -> Vec<Value> {
    let segs = segments(path);
    if segs.is_empty() {
        return match value {
            Value::Array(items) => items.clone(),
            _ => Vec::new(),
        };
    }

    let split = level.min(segs.len() - 1) + 1;
    let (prefix, suffix) = segs.split_at(split);

    let Some(Value::Array(items)) = walk(value, prefix) else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| {
            if suffix.is_empty() {
                item.clone()
            } else {
                walk(item, suffix).cloned().unwrap_or(Value::Null)
            }
        })
        .collect()
}

fn walk<'a>(value: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(*segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
        if current.is_null() {
            return None;
        }
    }
    Some(current)
}
