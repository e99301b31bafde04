//! Authentication module
//!
//! Supports: none, Bearer, Basic, API key header, OAuth2 (client credentials
//! and password grants), and session login.
//!
//! The `Authenticator` resolves a configuration into the headers attached to
//! every source API request. Any failure here is fatal for the run.

mod authenticator;
mod types;

pub use authenticator::{basic_header, Authenticator};
pub use types::{AuthConfig, AuthHeaders, OAuth2Grant};
