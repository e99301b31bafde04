// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # api-dataset-sync
//!
//! Walks a paginated JSON API and writes its records into a REST tabular
//! dataset, creating the dataset or keeping its schema in line with the
//! configuration.
//!
//! ## Features
//!
//! - **Explicit or inferred schema**: configured columns, or a schema grown from the records
//! - **Schema reconciliation**: incompatible changes are fatal, others need `forceUpdate`
//! - **Pagination**: offset query parameters or a next URL inside the payload
//! - **Multiple Auth Types**: Bearer, Basic, API key, OAuth2, Session
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use api_dataset_sync::dataset::{DatasetApiConfig, HttpDatasetApi, JournalWaiter};
//! use api_dataset_sync::{load_config, Result, SyncOrchestrator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = load_config("sync.yaml")?;
//!     let api_config = DatasetApiConfig::new("https://example.com/data-fair/api/v1")
//!         .with_api_key("...");
//!
//!     let report = SyncOrchestrator::new(
//!         config,
//!         Arc::new(HttpDatasetApi::new(&api_config)?),
//!         Arc::new(JournalWaiter::new(&api_config)?),
//!     )
//!     .run()
//!     .await?;
//!
//!     println!("{} lines uploaded", report.uploaded);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       SyncOrchestrator                          │
//! │  ensure dataset → fetch → extract → transform → schema → upload │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │   Paginate    │ Transform │   Dataset   │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ API Key  │ GET/POST  │ Query params  │ Explicit  │ Create      │
//! │ OAuth2   │ Multipart │ Next URL      │ Inferred  │ Schema      │
//! │ Session  │ Rate Limit│               │           │ Bulk lines  │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: Add docs before 1.0 release

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Dotted path lookups in JSON documents
pub mod path;

/// Authentication implementations
pub mod auth;

/// HTTP client with rate limiting
pub mod http;

/// Dataset schema computation and reconciliation
pub mod schema;

/// Pagination strategies
pub mod pagination;

/// Record to row transformation
pub mod transform;

/// Dataset service client and collaborators
pub mod dataset;

/// Operator-facing progress reporting
pub mod report;

/// Main sync orchestration
pub mod sync;

/// Processing configuration
pub mod config;

/// Configuration file loader
pub mod loader;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::ProcessingConfig;
pub use loader::{load_config, load_config_from_str};
pub use sync::{SyncOrchestrator, SyncReport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
