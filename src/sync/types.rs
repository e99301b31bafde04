//! Sync types
//!
//! Report returned by a sync run.

use crate::dataset::{ConfigPatch, DatasetRef};
use serde::Serialize;

/// Page size above which an advisory is reported
pub const LARGE_PAGE_ROWS: usize = 10_000;

/// Outcome of a sync run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Source pages fetched
    pub pages: usize,
    /// Rows produced from the source records
    pub lines: usize,
    /// Rows accepted by the dataset service
    pub uploaded: usize,
    /// Rows rejected, or lost to a failed upload request
    pub upload_errors: usize,
    /// Schema updates sent to the dataset service
    pub schema_updates: usize,
    /// Target dataset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<DatasetRef>,
    /// Configuration change emitted after creating the dataset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_patch: Option<ConfigPatch>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page
    pub fn add_page(&mut self) {
        self.pages += 1;
    }

    /// Add transformed lines
    pub fn add_lines(&mut self, count: usize) {
        self.lines += count;
    }

    /// Add uploaded lines
    pub fn add_uploaded(&mut self, count: usize) {
        self.uploaded += count;
    }

    /// Add failed lines
    pub fn add_upload_errors(&mut self, count: usize) {
        self.upload_errors += count;
    }

    /// Add a schema update
    pub fn add_schema_update(&mut self) {
        self.schema_updates += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
