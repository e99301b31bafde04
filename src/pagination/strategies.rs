//! Pagination strategy implementations
//!
//! Each strategy handles a specific pagination pattern.

use super::types::{NextPage, PaginationConfig, PaginationState, Paginator};
use crate::error::Result;
use crate::path;
use serde_json::Value;
use url::Url;

// ============================================================================
// Query Parameter Pagination
// ============================================================================

/// Offset pagination through query parameters
///
/// Common patterns:
/// - `?page=3` (pages, from 1)
/// - `?start=200&rows=100` (lines, from 0)
#[derive(Debug, Clone)]
pub struct QueryParamsPaginator {
    /// Query parameter name for the offset
    pub offset_key: String,
    /// Count pages instead of lines
    pub offset_pages: bool,
    /// First offset is 0 instead of 1
    pub offset_from_0: bool,
    /// Query parameter name and value for the page size
    pub limit: Option<(String, u64)>,
}

impl QueryParamsPaginator {
    /// Create a paginator counting lines from 1
    pub fn new(offset_key: impl Into<String>) -> Self {
        Self {
            offset_key: offset_key.into(),
            offset_pages: false,
            offset_from_0: false,
            limit: None,
        }
    }

    /// Count pages instead of lines
    #[must_use]
    pub fn counting_pages(mut self) -> Self {
        self.offset_pages = true;
        self
    }

    /// Start counting at 0
    #[must_use]
    pub fn from_zero(mut self) -> Self {
        self.offset_from_0 = true;
        self
    }

    /// Set page size parameter
    #[must_use]
    pub fn with_limit(mut self, key: impl Into<String>, value: u64) -> Self {
        self.limit = Some((key.into(), value));
        self
    }

    /// Offset written for the given state
    pub fn offset(&self, state: &PaginationState) -> u64 {
        let base = if self.offset_pages {
            state.pages_offset
        } else {
            state.lines_offset
        };
        if self.offset_from_0 {
            base
        } else {
            base + 1
        }
    }

    fn page_url(&self, api_url: &str, state: &PaginationState) -> Result<String> {
        let mut params = vec![(self.offset_key.clone(), self.offset(state).to_string())];
        if let Some((key, value)) = &self.limit {
            params.push((key.clone(), value.to_string()));
        }
        set_query_params(api_url, &params)
    }
}

impl Paginator for QueryParamsPaginator {
    fn first_page(&self, api_url: &str) -> Result<String> {
        self.page_url(api_url, &PaginationState::new())
    }

    fn next_page(
        &self,
        current_url: &str,
        _body: &Value,
        records_count: usize,
        state: &PaginationState,
    ) -> Result<NextPage> {
        // A short page is the last one
        if let Some((_, limit)) = &self.limit {
            if (records_count as u64) < *limit {
                return Ok(NextPage::Done);
            }
        }

        Ok(NextPage::with_url(self.page_url(current_url, state)?))
    }
}

// ============================================================================
// Next Page Data Pagination
// ============================================================================

/// Next URL pagination (URL in response body)
///
/// Extracts next page URL from a field in the response body.
/// Common patterns:
/// - `{ "next": "https://api.example.com/items?page=2" }`
/// - `{ "links": { "next": "/items?page=2" } }` (resolved against the current URL)
#[derive(Debug, Clone)]
pub struct NextPageDataPaginator {
    /// Dotted path of the next URL in the raw payload
    pub path: String,
    /// Page size injected into the first request only
    pub limit: Option<(String, u64)>,
}

impl NextPageDataPaginator {
    /// Create a new next URL paginator
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            limit: None,
        }
    }

    /// Set page size parameter
    #[must_use]
    pub fn with_limit(mut self, key: impl Into<String>, value: u64) -> Self {
        self.limit = Some((key.into(), value));
        self
    }
}

impl Paginator for NextPageDataPaginator {
    fn first_page(&self, api_url: &str) -> Result<String> {
        match &self.limit {
            Some((key, value)) => set_query_params(api_url, &[(key.clone(), value.to_string())]),
            None => Ok(api_url.to_string()),
        }
    }

    fn next_page(
        &self,
        current_url: &str,
        body: &Value,
        _records_count: usize,
        _state: &PaginationState,
    ) -> Result<NextPage> {
        match path::get_string(body, &self.path) {
            Some(next) if !next.trim().is_empty() => {
                Ok(NextPage::with_url(resolve_url(current_url, next.trim())?))
            }
            _ => Ok(NextPage::Done),
        }
    }
}

// ============================================================================
// No Pagination
// ============================================================================

/// No pagination - single request
#[derive(Debug, Clone, Default)]
pub struct NoPaginator;

impl Paginator for NoPaginator {
    fn first_page(&self, api_url: &str) -> Result<String> {
        Ok(api_url.to_string())
    }

    fn next_page(
        &self,
        _current_url: &str,
        _body: &Value,
        _records_count: usize,
        _state: &PaginationState,
    ) -> Result<NextPage> {
        Ok(NextPage::Done)
    }
}

// ============================================================================
// Construction
// ============================================================================

/// Build the paginator for a configuration
///
/// `legacy_next_page_path` is only used when no `pagination` block is set.
pub fn build_paginator(
    config: Option<&PaginationConfig>,
    legacy_next_page_path: Option<&str>,
) -> Box<dyn Paginator> {
    match config {
        Some(PaginationConfig::QueryParams {
            offset_key,
            offset_pages,
            offset_from_0,
            limit_key,
            limit_value,
        }) => {
            let mut paginator = QueryParamsPaginator::new(offset_key.clone());
            paginator.offset_pages = *offset_pages;
            paginator.offset_from_0 = *offset_from_0;
            paginator.limit = limit(limit_key.as_ref(), *limit_value);
            Box::new(paginator)
        }
        Some(PaginationConfig::NextPageData {
            next_page_path,
            limit_key,
            limit_value,
        }) => {
            let mut paginator = NextPageDataPaginator::new(next_page_path.clone());
            paginator.limit = limit(limit_key.as_ref(), *limit_value);
            Box::new(paginator)
        }
        Some(PaginationConfig::None) => Box::new(NoPaginator),
        None => match legacy_next_page_path.filter(|p| !p.is_empty()) {
            Some(path) => Box::new(NextPageDataPaginator::new(path)),
            None => Box::new(NoPaginator),
        },
    }
}

fn limit(key: Option<&String>, value: Option<u64>) -> Option<(String, u64)> {
    match (key, value) {
        (Some(key), Some(value)) if !key.is_empty() => Some((key.clone(), value)),
        _ => None,
    }
}

/// Replace (or add) query parameters on a URL, keeping the others in place
fn set_query_params(url: &str, params: &[(String, String)]) -> Result<String> {
    let mut url = Url::parse(url)?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !params.iter().any(|(key, _)| key == k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept.iter().chain(params.iter()));
    Ok(url.to_string())
}

/// Resolve a possibly relative next URL against the current one
fn resolve_url(current: &str, next: &str) -> Result<String> {
    if next.starts_with("http://") || next.starts_with("https://") {
        return Ok(next.to_string());
    }
    Ok(Url::parse(current)?.join(next)?.to_string())
}
