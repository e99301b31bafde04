//! Record to row transformation
//!
//! Rows are flat maps of schema key to scalar. A key missing from a row is a
//! null cell on the dataset side.

mod explicit;
mod inferred;

pub use explicit::ExplicitTransformer;
pub use inferred::InferredTransformer;

use crate::schema::SchemaField;
use crate::types::Row;
use serde_json::Value;

/// Transformer for the schema mode of a run
#[derive(Debug, Clone)]
pub enum RowTransformer {
    /// Configured columns
    Explicit(ExplicitTransformer),
    /// Schema grown from the records
    Inferred(InferredTransformer),
}

impl RowTransformer {
    /// Transform one page of records
    pub fn transform_page(&mut self, records: &[Value]) -> Vec<Row> {
        records.iter().map(|record| self.transform(record)).collect()
    }

    /// Transform one record
    pub fn transform(&mut self, record: &Value) -> Row {
        match self {
            Self::Explicit(t) => t.transform(record),
            Self::Inferred(t) => t.transform(record),
        }
    }

    /// Inferred schema awaiting persistence, if any
    pub fn pending_schema(&self) -> Option<&[SchemaField]> {
        match self {
            Self::Inferred(t) if t.inferrer().is_dirty() => Some(t.inferrer().fields()),
            _ => None,
        }
    }

    /// Mark the inferred schema as persisted
    pub fn mark_schema_persisted(&mut self) {
        if let Self::Inferred(t) = self {
            t.inferrer_mut().mark_clean();
        }
    }
}
