//! Dataset schema module
//!
//! Computes the destination schema of a sync run and keeps it consistent
//! with the schema already stored on the dataset.
//!
//! # Features
//!
//! - **Explicit mode**: one field per configured column, typed through a [`TypeTable`]
//! - **Inferred mode**: fields appended as new keys show up in records
//! - **Reconciliation**: append or patch an existing schema, never drop or retype

mod explicit;
mod inference;
mod reconcile;
mod types;

pub use explicit::{build_explicit_schema, column_field, normalize_key, ExplicitSchema};
pub use inference::{parse_iso_datetime, SchemaInferrer};
pub use reconcile::{reconcile, Reconciliation};
pub use types::{
    ColumnSpec, ColumnType, FieldFormat, FieldType, SchemaField, TypeMapping, TypeTable,
    MULTIVALUE_SEPARATOR, STANDARD_TYPE_TABLE,
};
