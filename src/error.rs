// Error handling module
// Defines the error taxonomy shared by the auth layer and the API client

use thiserror::Error;

/// Errors returned by the Watcher client and its authentication layer
#[derive(Error, Debug)]
pub enum WatcherError {
    /// Credential or scope is malformed; detected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Identity service rejected the credential or could not be reached
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Identity exchange succeeded but the catalog has no matching endpoint
    #[error(
        "Endpoint not found: no '{}' service with a {} endpoint{} in the service catalog",
        .service_type,
        .interface,
        region_suffix(.region)
    )]
    EndpointNotFound {
        service_type: String,
        interface: String,
        region: Option<String>,
    },

    /// Token is past or near expiry and automatic re-authentication is disabled
    #[error("Token expired and automatic re-authentication is disabled")]
    TokenExpired,

    /// A fixed-token provider holds an empty token
    #[error("Token is empty")]
    EmptyToken,

    /// No session registered under the requested name
    #[error("Session '{0}' not found")]
    SessionNotFound(String),

    /// The re-authentication triggered by a 401 response failed
    #[error("Re-authentication failed: {0}")]
    Reauthentication(#[source] Box<WatcherError>),

    /// Server answered 401 and the bound provider cannot re-authenticate
    #[error("Authentication failed: token expired or invalid")]
    AuthenticationFailed,

    /// Non-2xx response from the Watcher API
    #[error("API error: {method} {url} returned {status}: {message}")]
    Api {
        status: u16,
        message: String,
        method: String,
        url: String,
    },

    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request body could not be serialized
    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// Response body did not match the expected shape
    #[error("Failed to parse response: {message} (body: {body})")]
    Decode { message: String, body: String },

    /// Diagnostics requested from a provider that has none
    #[error("Auth info not available with token authenticator")]
    AuthInfoUnavailable,
}

impl WatcherError {
    /// HTTP status carried by an API error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            WatcherError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    /// True for a 401 API error and for a 401 that could not be recovered
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, WatcherError::AuthenticationFailed) || self.status() == Some(401)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }
}

fn region_suffix(region: &Option<String>) -> String {
    region
        .as_deref()
        .map(|r| format!(" in region '{}'", r))
        .unwrap_or_default()
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, WatcherError>;
