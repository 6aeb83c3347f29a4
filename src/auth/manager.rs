use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::identity::{IdentityService, KeystoneIdentity};
use super::provider::{RefreshableTokenProvider, TokenProvider};
use super::types::{AuthInfo, AuthMethod, Credential};
use crate::config::DEFAULT_TIMEOUT;
use crate::error::{Result, WatcherError};

/// Refresh the token when it expires within this many seconds
pub const TOKEN_REFRESH_THRESHOLD_SECS: i64 = 300;

/// Token, expiry and endpoint obtained from one identity exchange
#[derive(Debug, Clone)]
struct AuthSession {
    token: String,
    /// Unknown when token introspection failed
    expires_at: Option<DateTime<Utc>>,
    endpoint: String,
}

/// Authenticator
/// Owns a credential and keeps a Keystone token for the Watcher endpoint fresh
pub struct Authenticator {
    credential: Credential,
    method: AuthMethod,
    identity: Arc<dyn IdentityService>,
    session: RwLock<AuthSession>,
}

impl Authenticator {
    /// Validate the credential and authenticate against Keystone
    pub async fn new(credential: Credential) -> Result<Self> {
        Self::with_timeout(credential, DEFAULT_TIMEOUT).await
    }

    /// Same as `new`, bounding every identity request by `timeout`
    pub async fn with_timeout(
        credential: Credential,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let identity = KeystoneIdentity::new(timeout)?;
        Self::with_identity(credential, Arc::new(identity)).await
    }

    /// Validate the credential and authenticate against the given identity backend
    pub async fn with_identity(
        credential: Credential,
        identity: Arc<dyn IdentityService>,
    ) -> Result<Self> {
        let method = credential.validate()?;

        tracing::info!(
            identity_endpoint = %credential.identity_endpoint,
            method = method.name(),
            "Authenticating against identity service"
        );

        let session = exchange(&credential, &method, identity.as_ref())
            .await
            .map_err(|e| {
                WatcherError::Authentication(format!("initial authentication failed: {}", e))
            })?;

        Ok(Self {
            credential,
            method,
            identity,
            session: RwLock::new(session),
        })
    }

    /// Perform a full identity round-trip and replace the cached session.
    ///
    /// On failure the previous token, expiry and endpoint are kept.
    pub async fn authenticate(&self) -> Result<()> {
        let mut session = self.session.write().await;
        *session = exchange(&self.credential, &self.method, self.identity.as_ref()).await?;
        Ok(())
    }

    /// Force re-authentication regardless of the current expiry.
    ///
    /// Returns the freshly issued token, even when its expiry is already
    /// inside the refresh threshold.
    pub async fn reauth(&self) -> Result<String> {
        let mut session = self.session.write().await;
        *session = exchange(&self.credential, &self.method, self.identity.as_ref()).await?;
        Ok(session.token.clone())
    }

    /// Get a valid token, refreshing if it is about to expire.
    ///
    /// Concurrent callers that all see a stale token trigger a single
    /// identity round-trip: expiry is checked again once the write lock is held.
    pub async fn token(&self) -> Result<String> {
        {
            let session = self.session.read().await;
            if !is_expiring_soon(&session) {
                return Ok(session.token.clone());
            }
        }

        if !self.credential.allow_reauth {
            return Err(WatcherError::TokenExpired);
        }

        let mut session = self.session.write().await;
        if is_expiring_soon(&session) {
            tracing::debug!("Token expires within the refresh threshold, re-authenticating");
            *session = exchange(&self.credential, &self.method, self.identity.as_ref()).await?;
        }

        Ok(session.token.clone())
    }

    /// Get the Watcher service endpoint
    pub async fn endpoint(&self) -> String {
        self.session.read().await.endpoint.clone()
    }

    /// Get the token expiry, if known
    pub async fn token_expiry(&self) -> Option<DateTime<Utc>> {
        self.session.read().await.expires_at
    }

    /// Check if the token is actually expired; unknown expiry counts as valid
    pub async fn is_token_expired(&self) -> bool {
        let session = self.session.read().await;
        match session.expires_at {
            None => false,
            Some(exp) => Utc::now() >= exp,
        }
    }

    pub fn allows_reauth(&self) -> bool {
        self.credential.allow_reauth
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    #[cfg(test)]
    pub(crate) async fn set_token_expiry(&self, expires_at: Option<DateTime<Utc>>) {
        self.session.write().await.expires_at = expires_at;
    }

    /// Diagnostics snapshot
    pub async fn auth_info(&self) -> AuthInfo {
        let expires_at = self.token_expiry().await;
        let creds = &self.credential;
        let scope = creds.scope.as_ref();
        let now = Utc::now();

        AuthInfo {
            username: creds.username.clone(),
            user_id: creds.user_id.clone(),
            project_name: scope.and_then(|s| s.project_name.clone()),
            project_id: scope.and_then(|s| s.project_id.clone()),
            domain_name: creds.user_domain_name.clone(),
            domain_id: creds.user_domain_id.clone(),
            token_expiry: expires_at,
            is_expired: expires_at.map_or(false, |exp| now >= exp),
            time_until_expiry: expires_at.map(|exp| exp - now),
        }
    }
}

/// Check if the token expires within the refresh threshold
fn is_expiring_soon(session: &AuthSession) -> bool {
    match session.expires_at {
        // No expiration info, the server validates on use
        None => false,
        Some(exp) => exp - Utc::now() < Duration::seconds(TOKEN_REFRESH_THRESHOLD_SECS),
    }
}

/// Issue a token, resolve the endpoint and look up the expiry
async fn exchange(
    credential: &Credential,
    method: &AuthMethod,
    identity: &dyn IdentityService,
) -> Result<AuthSession> {
    let issued = identity.issue_token(credential, method).await?;

    let endpoint = issued
        .catalog
        .find_endpoint(
            &credential.service_type,
            credential.interface,
            credential.region.as_deref(),
        )
        .map(str::to_string)
        .ok_or_else(|| WatcherError::EndpointNotFound {
            service_type: credential.service_type.clone(),
            interface: credential.interface.to_string(),
            region: credential.region.clone(),
        })?;

    let expires_at = match identity.token_expiry(credential, &issued.token).await {
        Ok(exp) => Some(exp),
        Err(e) => {
            tracing::warn!("Could not determine token expiry, will rely on server: {}", e);
            None
        }
    };

    tracing::info!(
        endpoint = %endpoint,
        expires_at = ?expires_at.map(|exp| exp.to_rfc3339()),
        "Authenticated (token: {}...)",
        issued.token.chars().take(8).collect::<String>()
    );

    Ok(AuthSession {
        token: issued.token,
        expires_at,
        endpoint,
    })
}

#[async_trait]
impl TokenProvider for Authenticator {
    async fn token(&self) -> Result<String> {
        Authenticator::token(self).await
    }

    async fn endpoint(&self) -> String {
        Authenticator::endpoint(self).await
    }

    fn as_refreshable(&self) -> Option<&dyn RefreshableTokenProvider> {
        Some(self)
    }
}

#[async_trait]
impl RefreshableTokenProvider for Authenticator {
    fn allows_reauth(&self) -> bool {
        Authenticator::allows_reauth(self)
    }

    async fn reauth(&self) -> Result<String> {
        Authenticator::reauth(self).await
    }

    async fn auth_info(&self) -> AuthInfo {
        Authenticator::auth_info(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::FakeIdentity;
    use crate::auth::types::Scope;

    const ENDPOINT: &str = "https://watcher.example/v1";

    fn credential() -> Credential {
        Credential::password("https://keystone.example/v3", "u", "p")
            .with_scope(Scope::project_name("demo"))
    }

    async fn set_expiry(auth: &Authenticator, expires_at: Option<DateTime<Utc>>) {
        auth.set_token_expiry(expires_at).await;
    }

    #[tokio::test]
    async fn test_construct_authenticates_immediately() {
        let identity = Arc::new(FakeIdentity::new(ENDPOINT, Some(Duration::minutes(10))));
        let auth = Authenticator::with_identity(credential(), identity.clone())
            .await
            .unwrap();

        assert_eq!(identity.issue_count(), 1);
        assert_eq!(auth.endpoint().await, ENDPOINT);
        assert_eq!(auth.token().await.unwrap(), "tok-1");
        assert_eq!(identity.issue_count(), 1);

        let expiry = auth.token_expiry().await.unwrap();
        assert!(expiry > Utc::now() + Duration::minutes(9));
        assert!(!auth.is_token_expired().await);
    }

    #[tokio::test]
    async fn test_refresh_near_expiry() {
        let identity = Arc::new(FakeIdentity::with_lifetimes(
            ENDPOINT,
            vec![Some(Duration::minutes(10)), Some(Duration::minutes(60))],
        ));
        let auth = Authenticator::with_identity(credential(), identity.clone())
            .await
            .unwrap();

        assert_eq!(auth.token().await.unwrap(), "tok-1");
        assert_eq!(identity.issue_count(), 1);

        // Fast-forward to 4 minutes remaining
        set_expiry(&auth, Some(Utc::now() + Duration::minutes(4))).await;

        assert_eq!(auth.token().await.unwrap(), "tok-2");
        assert_eq!(identity.issue_count(), 2);

        // Fresh token is reused
        assert_eq!(auth.token().await.unwrap(), "tok-2");
        assert_eq!(identity.issue_count(), 2);
        assert!(auth.token_expiry().await.unwrap() > Utc::now() + Duration::minutes(59));
    }

    #[tokio::test]
    async fn test_no_reauth_fails_without_network() {
        let identity = Arc::new(FakeIdentity::new(ENDPOINT, Some(Duration::minutes(10))));
        let auth = Authenticator::with_identity(
            credential().with_allow_reauth(false),
            identity.clone(),
        )
        .await
        .unwrap();

        set_expiry(&auth, Some(Utc::now() + Duration::minutes(2))).await;

        let result = auth.token().await;
        assert!(matches!(result, Err(WatcherError::TokenExpired)));
        assert_eq!(identity.issue_count(), 1);
        assert_eq!(identity.introspect_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_expiry_never_refreshes() {
        let identity = Arc::new(FakeIdentity::new(ENDPOINT, None));
        let auth = Authenticator::with_identity(credential(), identity.clone())
            .await
            .unwrap();

        assert_eq!(auth.token_expiry().await, None);
        assert!(!auth.is_token_expired().await);
        assert_eq!(auth.token().await.unwrap(), "tok-1");
        assert_eq!(auth.token().await.unwrap(), "tok-1");
        assert_eq!(identity.issue_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_refresh_authenticates_once() {
        let identity = Arc::new(
            FakeIdentity::new(ENDPOINT, Some(Duration::minutes(60)))
                .with_delay(std::time::Duration::from_millis(50)),
        );
        let auth = Arc::new(
            Authenticator::with_identity(credential(), identity.clone())
                .await
                .unwrap(),
        );

        set_expiry(&auth, Some(Utc::now() + Duration::seconds(30))).await;

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let auth = auth.clone();
                tokio::spawn(async move { auth.token().await })
            })
            .collect();

        for result in futures::future::join_all(tasks).await {
            assert_eq!(result.unwrap().unwrap(), "tok-2");
        }
        assert_eq!(identity.issue_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_authenticate_keeps_previous_state() {
        let identity = Arc::new(FakeIdentity::new(ENDPOINT, Some(Duration::minutes(10))));
        let auth = Authenticator::with_identity(credential(), identity.clone())
            .await
            .unwrap();
        let expiry = auth.token_expiry().await;

        identity.set_failing(true);
        let result = auth.authenticate().await;
        assert!(matches!(result, Err(WatcherError::Authentication(_))));
        assert_eq!(auth.token().await.unwrap(), "tok-1");
        assert_eq!(auth.endpoint().await, ENDPOINT);
        assert_eq!(auth.token_expiry().await, expiry);

        identity.set_failing(false);
        identity.set_endpoint(None);
        let result = auth.authenticate().await;
        assert!(matches!(result, Err(WatcherError::EndpointNotFound { .. })));
        assert_eq!(auth.token().await.unwrap(), "tok-1");
        assert_eq!(auth.endpoint().await, ENDPOINT);
    }

    #[tokio::test]
    async fn test_refresh_failure_surfaces_error() {
        let identity = Arc::new(FakeIdentity::new(ENDPOINT, Some(Duration::minutes(10))));
        let auth = Authenticator::with_identity(credential(), identity.clone())
            .await
            .unwrap();

        set_expiry(&auth, Some(Utc::now() + Duration::minutes(1))).await;
        identity.set_failing(true);

        assert!(matches!(
            auth.token().await,
            Err(WatcherError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn test_construct_failures() {
        let identity = Arc::new(FakeIdentity::new(ENDPOINT, Some(Duration::minutes(10))));
        identity.set_failing(true);
        match Authenticator::with_identity(credential(), identity.clone()).await {
            Err(WatcherError::Authentication(msg)) => {
                assert!(msg.starts_with("initial authentication failed"))
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }

        // Validation happens before any identity call
        let identity = Arc::new(FakeIdentity::new(ENDPOINT, Some(Duration::minutes(10))));
        let bad = Credential::password("https://keystone.example/v3", "u", "");
        let result = Authenticator::with_identity(bad, identity.clone()).await;
        assert!(matches!(result, Err(WatcherError::Validation(_))));
        assert_eq!(identity.issue_count(), 0);
    }

    #[tokio::test]
    async fn test_reauth_is_unconditional() {
        let identity = Arc::new(FakeIdentity::new(ENDPOINT, Some(Duration::minutes(60))));
        let auth = Authenticator::with_identity(credential(), identity.clone())
            .await
            .unwrap();

        assert_eq!(auth.reauth().await.unwrap(), "tok-2");
        assert_eq!(identity.issue_count(), 2);
        assert_eq!(auth.token().await.unwrap(), "tok-2");
    }

    #[tokio::test]
    async fn test_reauth_returns_short_lived_token_as_is() {
        let identity = Arc::new(FakeIdentity::with_lifetimes(
            ENDPOINT,
            vec![Some(Duration::minutes(60)), Some(Duration::minutes(2))],
        ));
        let auth = Authenticator::with_identity(credential(), identity.clone())
            .await
            .unwrap();

        assert_eq!(auth.reauth().await.unwrap(), "tok-2");
        assert_eq!(identity.issue_count(), 2);
    }

    #[tokio::test]
    async fn test_token_expired_check() {
        let identity = Arc::new(FakeIdentity::new(ENDPOINT, Some(Duration::minutes(10))));
        let auth = Authenticator::with_identity(credential(), identity)
            .await
            .unwrap();

        // Token expired 1 minute ago
        set_expiry(&auth, Some(Utc::now() - Duration::seconds(60))).await;
        assert!(auth.is_token_expired().await);

        set_expiry(&auth, None).await;
        assert!(!auth.is_token_expired().await);
    }

    #[tokio::test]
    async fn test_auth_info_snapshot() {
        let identity = Arc::new(FakeIdentity::new(ENDPOINT, Some(Duration::minutes(10))));
        let auth = Authenticator::with_identity(
            credential().with_user_domain_id("default"),
            identity.clone(),
        )
        .await
        .unwrap();

        let info = auth.auth_info().await;
        assert_eq!(info.username.as_deref(), Some("u"));
        assert_eq!(info.project_name.as_deref(), Some("demo"));
        assert_eq!(info.domain_id.as_deref(), Some("default"));
        assert!(!info.is_expired);
        assert!(info.time_until_expiry.unwrap() > Duration::minutes(9));

        set_expiry(&auth, Some(Utc::now() - Duration::seconds(1))).await;
        let info = auth.auth_info().await;
        assert!(info.is_expired);
        assert_eq!(identity.issue_count(), 1);
    }

    #[tokio::test]
    async fn test_provider_capability_tiers() {
        let identity = Arc::new(FakeIdentity::new(ENDPOINT, Some(Duration::minutes(10))));
        let auth = Authenticator::with_identity(credential(), identity)
            .await
            .unwrap();

        let provider: &dyn TokenProvider = &auth;
        let refreshable = provider.as_refreshable().expect("refreshable");
        assert!(refreshable.allows_reauth());
        assert_eq!(provider.endpoint().await, ENDPOINT);
    }
}
