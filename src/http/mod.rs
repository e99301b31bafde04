//! HTTP client module
//!
//! Thin reqwest wrapper shared by the source fetcher and the dataset API
//! client.
//!
//! # Features
//!
//! - **Long timeout**: a single fixed ceiling per request, no retries
//! - **Rate Limiting**: optional token bucket limiter using governor
//! - **Errors**: non-2xx responses carry status and body

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, RequestConfig, DEFAULT_TIMEOUT};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

#[cfg(test)]
mod tests;
