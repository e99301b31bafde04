//! Pagination module
//!
//! Supports: no pagination, offset in query parameters, next URL in payload
//!
//! # Overview
//!
//! Each strategy computes the first request URL and, given the payload of
//! the current page, the next one. The sync loop additionally stops on an
//! empty or missing page whatever the strategy.

mod strategies;
mod types;

pub use strategies::{build_paginator, NextPageDataPaginator, NoPaginator, QueryParamsPaginator};
pub use types::{NextPage, PaginationConfig, PaginationState, Paginator};
