//! Auth configuration types
//!
//! These types mirror the `auth` block of a processing configuration,
//! tagged by `authMethod`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// OAuth2 grant used to obtain the access token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OAuth2Grant {
    /// `client_credentials` grant
    #[default]
    #[serde(rename = "client_credentials")]
    ClientCredentials,
    /// Resource owner `password` grant
    #[serde(rename = "password", alias = "password_Credentials", alias = "password_credentials")]
    Password,
}

impl OAuth2Grant {
    /// Value sent as `grant_type`
    pub fn as_str(self) -> &'static str {
        match self {
            OAuth2Grant::ClientCredentials => "client_credentials",
            OAuth2Grant::Password => "password",
        }
    }
}

/// Authentication configuration for the source API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "authMethod")]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    #[serde(rename = "noAuth", alias = "none")]
    None,

    /// `Authorization: Bearer <token>`
    #[serde(rename = "bearerAuth")]
    Bearer {
        /// The bearer token
        token: String,
    },

    /// `Authorization: Basic base64(user:pass)`
    #[serde(rename = "basicAuth")]
    Basic {
        /// Username
        username: String,
        /// Password
        password: String,
    },

    /// A static header carrying an API key
    #[serde(rename = "apiKey")]
    ApiKey {
        /// Header name
        #[serde(rename = "apiKeyHeader")]
        header: String,
        /// Header value
        #[serde(rename = "apiKeyValue")]
        value: String,
    },

    /// OAuth2 token endpoint, exchanged once per run for a bearer token
    #[serde(rename = "oauth2")]
    OAuth2 {
        /// Grant type
        #[serde(rename = "grantType", default)]
        grant: OAuth2Grant,
        /// Token endpoint URL
        #[serde(rename = "tokenURL")]
        token_url: String,
        /// Client ID
        #[serde(rename = "clientId")]
        client_id: String,
        /// Client secret
        #[serde(rename = "clientSecret")]
        client_secret: String,
        /// Username (password grant)
        #[serde(default)]
        username: Option<String>,
        /// Password (password grant)
        #[serde(default)]
        password: Option<String>,
        /// Requested scope
        #[serde(default)]
        scope: Option<String>,
    },

    /// Login call exchanging credentials for a session token
    #[serde(rename = "session")]
    Session {
        /// Login endpoint URL (called with GET)
        #[serde(rename = "loginURL")]
        login_url: String,
        /// Username for basic credentials
        #[serde(default)]
        username: String,
        /// Password for basic credentials
        #[serde(default)]
        password: String,
        /// User token, used when no username/password is given
        #[serde(rename = "userToken", default)]
        user_token: String,
        /// Optional application token sent on every request
        #[serde(rename = "appToken", default)]
        app_token: String,
    },
}

impl AuthConfig {
    /// Short name of the method, for logs
    pub fn method_name(&self) -> &'static str {
        match self {
            AuthConfig::None => "noAuth",
            AuthConfig::Bearer { .. } => "bearerAuth",
            AuthConfig::Basic { .. } => "basicAuth",
            AuthConfig::ApiKey { .. } => "apiKey",
            AuthConfig::OAuth2 { .. } => "oauth2",
            AuthConfig::Session { .. } => "session",
        }
    }
}

/// Headers produced by authentication, applied to every source request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthHeaders {
    headers: BTreeMap<String, String>,
}

impl AuthHeaders {
    /// Create an empty header set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Get a header value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// The bearer token, if the Authorization header carries one
    pub fn bearer_token(&self) -> Option<&str> {
        self.get("Authorization")?.strip_prefix("Bearer ")
    }

    /// Iterate over all headers
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of headers
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Whether no header is set
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}
