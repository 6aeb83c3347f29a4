// Token provider capabilities

use async_trait::async_trait;

use super::types::AuthInfo;
use crate::error::Result;

/// Anything that can hand out a bearer token and the service endpoint
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a token valid for the next request
    async fn token(&self) -> Result<String>;

    /// Base URL of the Watcher service
    async fn endpoint(&self) -> String;

    /// Richer capability tier, when the provider supports re-authentication
    fn as_refreshable(&self) -> Option<&dyn RefreshableTokenProvider> {
        None
    }
}

/// Provider that can obtain a new token on demand
#[async_trait]
pub trait RefreshableTokenProvider: TokenProvider {
    /// Whether the request layer may re-authenticate after a 401
    fn allows_reauth(&self) -> bool;

    /// Unconditionally re-authenticate and return the newly issued token
    async fn reauth(&self) -> Result<String>;

    /// Diagnostics snapshot; never triggers a refresh
    async fn auth_info(&self) -> AuthInfo;
}
