//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Fetch this URL next
    Continue {
        /// Absolute URL of the next page
        url: String,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Create a continuation with a new URL
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::Continue { url: url.into() }
    }

    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// URL of the next page, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Continue { url } => Some(url),
            Self::Done => None,
        }
    }

    /// Consume into the URL of the next page, if any
    pub fn into_url(self) -> Option<String> {
        match self {
            Self::Continue { url } => Some(url),
            Self::Done => None,
        }
    }
}

/// Configuration for pagination behavior (`pagination.method`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum PaginationConfig {
    /// Single request
    #[default]
    None,

    /// Offset written to a query parameter
    #[serde(rename_all = "camelCase")]
    QueryParams {
        /// Query parameter receiving the offset
        offset_key: String,
        /// Count pages instead of lines
        #[serde(default)]
        offset_pages: bool,
        /// First offset is 0 instead of 1
        #[serde(default, rename = "offsetFrom0")]
        offset_from_0: bool,
        /// Query parameter receiving the page size
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit_key: Option<String>,
        /// Page size
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit_value: Option<u64>,
    },

    /// Next page URL found in the previous payload
    #[serde(rename_all = "camelCase")]
    NextPageData {
        /// Dotted path of the next URL in the raw payload
        next_page_path: String,
        /// Query parameter receiving the page size on the first request
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit_key: Option<String>,
        /// Page size
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit_value: Option<u64>,
    },
}

impl PaginationConfig {
    /// Create query parameter pagination config, offsets counted in lines from 1
    pub fn query_params(offset_key: impl Into<String>) -> Self {
        Self::QueryParams {
            offset_key: offset_key.into(),
            offset_pages: false,
            offset_from_0: false,
            limit_key: None,
            limit_value: None,
        }
    }

    /// Create next-page-in-payload pagination config
    pub fn next_page_data(next_page_path: impl Into<String>) -> Self {
        Self::NextPageData {
            next_page_path: next_page_path.into(),
            limit_key: None,
            limit_value: None,
        }
    }

    /// Set the page size parameter (no-op for `None`)
    #[must_use]
    pub fn with_limit(mut self, key: impl Into<String>, value: u64) -> Self {
        match &mut self {
            Self::QueryParams {
                limit_key,
                limit_value,
                ..
            }
            | Self::NextPageData {
                limit_key,
                limit_value,
                ..
            } => {
                *limit_key = Some(key.into());
                *limit_value = Some(value);
            }
            Self::None => {}
        }
        self
    }

    /// Name used in configuration files
    pub fn method_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::QueryParams { .. } => "queryParams",
            Self::NextPageData { .. } => "nextPageData",
        }
    }
}

/// Tracks pagination state during a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationState {
    /// Rows returned by the pages fetched so far
    pub lines_offset: u64,
    /// Pages fetched so far
    pub pages_offset: u64,
    /// URL of the next page to fetch; `None` once pagination is over
    pub next_page_url: Option<String>,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fetched page of `records_count` rows
    pub fn advance(&mut self, records_count: usize) {
        self.lines_offset += records_count as u64;
        self.pages_offset += 1;
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.next_page_url = None;
    }

    /// Whether pagination is complete
    pub fn is_done(&self) -> bool {
        self.next_page_url.is_none()
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync {
    /// URL of the first request
    fn first_page(&self, api_url: &str) -> Result<String>;

    /// Process a fetched page and determine if there's a next page
    ///
    /// `state` has already been advanced past the current page.
    fn next_page(
        &self,
        current_url: &str,
        body: &Value,
        records_count: usize,
        state: &PaginationState,
    ) -> Result<NextPage>;
}
