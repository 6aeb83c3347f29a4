use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthInfo, Authenticator, TokenAuthenticator, TokenProvider};
use crate::config::{ClientOptions, DEFAULT_API_VERSION, DEFAULT_TIMEOUT};
use crate::error::{Result, WatcherError};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("watcher-client-rs/", env!("CARGO_PKG_VERSION"));

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
const API_VERSION_HEADER: &str = "OpenStack-API-Version";

/// HTTP client for the Watcher API with re-authentication on 401
pub struct WatcherClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Source of tokens and the service endpoint
    provider: Arc<dyn TokenProvider>,

    api_version: String,

    /// Optional `infra-optim` microversion
    microversion: Option<String>,

    /// Per-request timeout
    timeout: Duration,
}

impl WatcherClient {
    /// Authenticate against Keystone and build a client for the catalog endpoint
    pub async fn new(options: ClientOptions) -> Result<Self> {
        let auth = Authenticator::with_timeout(options.credential, options.timeout).await?;

        let mut client = Self::with_provider(Arc::new(auth))?;
        client.api_version = options.api_version;
        client.microversion = options.microversion;
        client.timeout = options.timeout;
        Ok(client)
    }

    /// Client for a pre-issued token and a known endpoint; never re-authenticates
    ///
    /// ```rust,no_run
    /// # use watcher_client::WatcherClient;
    /// # tokio_test::block_on(async {
    /// let client = WatcherClient::with_token("https://watcher.example:9322", "gAAAAAB...")?;
    /// client.ping().await?;
    /// # Ok::<(), watcher_client::WatcherError>(())
    /// # });
    /// ```
    pub fn with_token(endpoint: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Self::with_provider(Arc::new(TokenAuthenticator::new(endpoint, token)))
    }

    /// Client backed by any token provider
    pub fn with_provider(provider: Arc<dyn TokenProvider>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            provider,
            api_version: DEFAULT_API_VERSION.to_string(),
            microversion: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Versioned API endpoint, e.g. `https://watcher.example:9322/v1`
    pub async fn endpoint(&self) -> String {
        versioned_endpoint(&self.provider.endpoint().await, &self.api_version)
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn set_api_version(&mut self, version: impl Into<String>) {
        self.api_version = version.into();
    }

    pub fn microversion(&self) -> Option<&str> {
        self.microversion.as_deref()
    }

    pub fn set_microversion(&mut self, microversion: Option<String>) {
        self.microversion = microversion;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Authentication details, available only for re-authenticating providers
    pub async fn auth_info(&self) -> Result<AuthInfo> {
        match self.provider.as_refreshable() {
            Some(provider) => Ok(provider.auth_info().await),
            None => Err(WatcherError::AuthInfoUnavailable),
        }
    }

    /// Check that the API answers an authenticated request
    pub async fn ping(&self) -> Result<()> {
        self.execute(Method::GET, "/", None).await.map(|_| ())
    }

    /// Version document from the unversioned service root (no token sent)
    pub async fn version(&self) -> Result<serde_json::Value> {
        let root = service_root(&self.provider.endpoint().await, &self.api_version);
        let url = format!("{}/", root);

        tracing::debug!(url = %url, "Fetching version document");

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await?;
        let body = read_body(Method::GET, response).await?;
        decode(&body)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.execute(Method::GET, path, None).await?;
        decode(&body)
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_value(body)?;
        let body = self.execute(Method::POST, path, Some(&payload)).await?;
        decode(&body)
    }

    pub(crate) async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_value(body)?;
        let body = self.execute(Method::PATCH, path, Some(&payload)).await?;
        decode(&body)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        self.execute(Method::DELETE, path, None).await.map(|_| ())
    }

    /// Execute a request, re-authenticating once if the token is rejected.
    ///
    /// A second 401 after re-authentication is returned as an API error.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<String> {
        let token = self.provider.token().await?;
        let response = self.dispatch(method.clone(), path, body, &token).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return read_body(method, response).await;
        }

        let provider = match self.provider.as_refreshable() {
            Some(provider) if provider.allows_reauth() => provider,
            _ => {
                tracing::warn!(
                    method = %method,
                    path = %path,
                    "Token rejected, re-authentication unavailable"
                );
                return Err(WatcherError::AuthenticationFailed);
            }
        };

        tracing::warn!(
            method = %method,
            path = %path,
            "Received 401, re-authenticating and retrying"
        );

        let token = provider
            .reauth()
            .await
            .map_err(|e| WatcherError::Reauthentication(Box::new(e)))?;

        let response = self.dispatch(method.clone(), path, body, &token).await?;
        read_body(method, response).await
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        token: &str,
    ) -> Result<Response> {
        let url = format!("{}{}", self.endpoint().await, path);

        tracing::debug!(method = %method, url = %url, "Sending HTTP request");

        let mut request = self
            .client
            .request(method, &url)
            .timeout(self.timeout)
            .header(AUTH_TOKEN_HEADER, token);

        if let Some(microversion) = &self.microversion {
            request = request.header(API_VERSION_HEADER, format!("infra-optim {}", microversion));
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, url = %url, "HTTP request error");
            e
        })?;

        tracing::debug!(status = %response.status(), "Received HTTP response");

        Ok(response)
    }
}

/// Read the body of a response, turning any non-2xx status into an API error
async fn read_body(method: Method, response: Response) -> Result<String> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await?;

    if status.is_success() {
        return Ok(text);
    }

    tracing::error!(
        status = status.as_u16(),
        url = %url,
        response_body = %text,
        "HTTP request failed with error response"
    );

    Err(WatcherError::Api {
        status: status.as_u16(),
        message: text,
        method: method.to_string(),
        url,
    })
}

/// Decode a JSON body; an empty body decodes as `null`
fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    let parsed = if body.trim().is_empty() {
        serde_json::from_value(serde_json::Value::Null)
    } else {
        serde_json::from_str(body)
    };

    parsed.map_err(|e| WatcherError::Decode {
        message: e.to_string(),
        body: body.to_string(),
    })
}

/// Append `/{version}` to the service endpoint unless it is already there
fn versioned_endpoint(endpoint: &str, version: &str) -> String {
    let base = endpoint.trim_end_matches('/');
    if version.is_empty() || base.ends_with(&format!("/{}", version)) {
        return base.to_string();
    }
    format!("{}/{}", base, version)
}

/// Strip a trailing `/{version}` from the service endpoint
fn service_root(endpoint: &str, version: &str) -> String {
    let base = endpoint.trim_end_matches('/');
    if version.is_empty() {
        return base.to_string();
    }
    base.strip_suffix(&format!("/{}", version))
        .unwrap_or(base)
        .to_string()
}
