//! Reconciliation of a computed schema against an existing dataset schema

use super::types::SchemaField;
use crate::error::{Error, Result};

/// Outcome of [`reconcile`]
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Merged schema: existing fields in their order, patched in place, then appended fields
    pub schema: Vec<SchemaField>,
    /// Keys appended to the existing schema
    pub appended: Vec<String>,
    /// Keys whose cosmetic attributes were patched
    pub patched: Vec<String>,
}

impl Reconciliation {
    /// Whether the merged schema differs from the existing one
    pub fn changed(&self) -> bool {
        !self.appended.is_empty() || !self.patched.is_empty()
    }
}

/// Compare `computed` against `existing`, field by field
///
/// A changed `type` or `format` is always fatal. Cosmetic differences and
/// new fields are applied when `force_update` is set and fatal otherwise.
/// Existing fields that `computed` does not mention are kept untouched.
pub fn reconcile(
    computed: &[SchemaField],
    existing: &[SchemaField],
    force_update: bool,
) -> Result<Reconciliation> {
    // Incompatibilities win over anything forceUpdate could fix
    for field in computed {
        if let Some(current) = existing.iter().find(|f| f.key == field.key) {
            check_compatible(field, current)?;
        }
    }

    let mut schema = existing.to_vec();
    let mut appended = Vec::new();
    let mut patched = Vec::new();

    for field in computed {
        match schema.iter_mut().find(|f| f.key == field.key) {
            Some(current) => {
                let diffs = cosmetic_diffs(field, current);
                if diffs.is_empty() {
                    continue;
                }
                if !force_update {
                    return Err(Error::force_update_required(
                        &field.key,
                        format!("{} changed", diffs.join(", ")),
                    ));
                }
                apply_cosmetics(field, current);
                patched.push(field.key.clone());
            }
            None => {
                if !force_update {
                    return Err(Error::force_update_required(
                        &field.key,
                        "column is missing from the existing dataset",
                    ));
                }
                schema.push(field.clone());
                appended.push(field.key.clone());
            }
        }
    }

    Ok(Reconciliation {
        schema,
        appended,
        patched,
    })
}

fn check_compatible(computed: &SchemaField, existing: &SchemaField) -> Result<()> {
    if computed.field_type != existing.field_type {
        return Err(Error::schema_incompatible(
            &computed.key,
            format!(
                "type changed from {} to {}",
                existing.field_type, computed.field_type
            ),
        ));
    }
    if computed.format != existing.format {
        return Err(Error::schema_incompatible(
            &computed.key,
            format!(
                "format changed from {} to {}",
                display_opt(existing.format.as_ref()),
                display_opt(computed.format.as_ref())
            ),
        ));
    }
    Ok(())
}

fn cosmetic_diffs(computed: &SchemaField, existing: &SchemaField) -> Vec<&'static str> {
    let mut diffs = Vec::new();
    if computed.separator != existing.separator {
        diffs.push("separator");
    }
    if computed.original_name != existing.original_name {
        diffs.push("x-originalName");
    }
    if computed.date_format != existing.date_format {
        diffs.push("dateFormat");
    }
    if computed.date_time_format != existing.date_time_format {
        diffs.push("dateTimeFormat");
    }
    diffs
}

fn apply_cosmetics(computed: &SchemaField, existing: &mut SchemaField) {
    existing.separator.clone_from(&computed.separator);
    existing.original_name.clone_from(&computed.original_name);
    existing.date_format.clone_from(&computed.date_format);
    existing.date_time_format.clone_from(&computed.date_time_format);
}

fn display_opt<T: std::fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| "none".to_string(), ToString::to_string)
}
