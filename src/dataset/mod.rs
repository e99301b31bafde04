//! Dataset service module
//!
//! Everything the sync talks to besides the source API: the dataset REST
//! API, the processing journal, and the configuration store.
//!
//! Each collaborator is a trait with an HTTP or file implementation, so the
//! sync can be embedded with other backends.

mod client;
mod journal;
mod patcher;
mod types;

pub use client::{DatasetApi, HttpDatasetApi};
pub use journal::{FinalizeWaiter, JournalCheckpoint, JournalWaiter, FINALIZE_END};
pub use patcher::{apply_patch, ConfigPatcher, FileConfigPatcher, NoopConfigPatcher};
pub use types::{
    BulkResult, ConfigPatch, Dataset, DatasetApiConfig, DatasetDraft, DatasetRef, API_KEY_HEADER,
};
