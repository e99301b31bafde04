//! Authenticator implementation
//!
//! Turns an [`AuthConfig`] into the headers sent with every source request.
//! Token-based methods perform one network round trip; the result is meant
//! to be resolved once per run.

use super::types::{AuthConfig, AuthHeaders, OAuth2Grant};
use crate::error::{Error, Result};
use crate::http::DEFAULT_TIMEOUT;
use base64::Engine as _;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

/// Authenticator builds request headers from an auth configuration
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
    /// HTTP client for token and login requests
    http_client: Client,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    ///
    /// Token and login requests use the default HTTP timeout.
    pub fn new(config: AuthConfig) -> Result<Self> {
        Self::with_timeout(config, DEFAULT_TIMEOUT)
    }

    /// Create an authenticator whose token and login requests give up after `timeout`
    pub fn with_timeout(config: AuthConfig, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(config, http_client))
    }

    /// Create an authenticator with a custom HTTP client
    pub fn with_client(config: AuthConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Resolve the headers for this configuration
    pub async fn headers(&self) -> Result<AuthHeaders> {
        let mut headers = AuthHeaders::new();

        match &self.config {
            AuthConfig::None => {}

            AuthConfig::Bearer { token } => {
                headers.insert("Authorization", format!("Bearer {token}"));
            }

            AuthConfig::Basic { username, password } => {
                headers.insert("Authorization", basic_header(username, password));
            }

            AuthConfig::ApiKey { header, value } => {
                if header.is_empty() {
                    return Err(Error::auth("apiKeyHeader cannot be empty"));
                }
                headers.insert(header.as_str(), value.as_str());
            }

            AuthConfig::OAuth2 {
                grant,
                token_url,
                client_id,
                client_secret,
                username,
                password,
                scope,
            } => {
                let token = self
                    .fetch_oauth2_token(
                        *grant,
                        token_url,
                        client_id,
                        client_secret,
                        username.as_deref(),
                        password.as_deref(),
                        scope.as_deref(),
                    )
                    .await?;
                headers.insert("Authorization", format!("Bearer {token}"));
            }

            AuthConfig::Session {
                login_url,
                username,
                password,
                user_token,
                app_token,
            } => {
                if !app_token.is_empty() {
                    headers.insert("App-Token", app_token.as_str());
                }
                let session_token = self
                    .fetch_session_token(login_url, username, password, user_token, app_token)
                    .await?;
                headers.insert("Session-Token", session_token);
            }
        }

        debug!(
            method = self.config.method_name(),
            headers = headers.len(),
            "Resolved authentication headers"
        );
        Ok(headers)
    }

    /// Fetch an OAuth2 access token
    #[allow(clippy::too_many_arguments)]
    async fn fetch_oauth2_token(
        &self,
        grant: OAuth2Grant,
        token_url: &str,
        client_id: &str,
        client_secret: &str,
        username: Option<&str>,
        password: Option<&str>,
        scope: Option<&str>,
    ) -> Result<String> {
        let mut form = vec![
            ("grant_type", grant.as_str().to_string()),
            ("client_id", client_id.to_string()),
            ("client_secret", client_secret.to_string()),
        ];

        if grant == OAuth2Grant::Password {
            form.push(("username", username.unwrap_or_default().to_string()));
            form.push(("password", password.unwrap_or_default().to_string()));
        }

        if let Some(scope) = scope.filter(|s| !s.is_empty()) {
            form.push(("scope", scope.to_string()));
        }

        let response = self
            .http_client
            .post(token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                error!("Token request to {token_url} failed: {e}");
                Error::OAuth2 {
                    message: format!("Failed to obtain token: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!("Token request rejected with status {status}");
            return Err(Error::OAuth2 {
                message: format!("Token request failed with status {status}: {body}"),
            });
        }

        let token_response: TokenResponse = response.json().await.map_err(|e| Error::OAuth2 {
            message: format!("Invalid token response: {e}"),
        })?;
        Ok(token_response.access_token)
    }

    /// Log in and return the session token
    async fn fetch_session_token(
        &self,
        login_url: &str,
        username: &str,
        password: &str,
        user_token: &str,
        app_token: &str,
    ) -> Result<String> {
        let authorization = if !username.is_empty() && !password.is_empty() {
            basic_header(username, password)
        } else if !user_token.is_empty() {
            format!("user_token {user_token}")
        } else {
            return Err(Error::auth(
                "Session authentication requires username/password or a user token",
            ));
        };

        let mut req = self
            .http_client
            .get(login_url)
            .header("Content-Type", "application/json")
            .header("Authorization", authorization);
        if !app_token.is_empty() {
            req = req.header("App-Token", app_token);
        }

        let response = req.send().await.map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth {
                message: format!("Login request failed with status {status}: {body}"),
            });
        }

        let body: Value = response.json().await.map_err(Error::Http)?;
        crate::path::get_string(&body, "session_token")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::auth("Login response did not contain a session_token"))
    }

    /// Get the current auth config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

/// Build a `Basic` Authorization header value
pub fn basic_header(username: &str, password: &str) -> String {
    let encoded =
        base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {encoded}")
}

/// OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}
