// Fixed-token provider

use async_trait::async_trait;

use super::provider::TokenProvider;
use crate::error::{Result, WatcherError};

/// Provider for a pre-obtained token and a known endpoint.
///
/// Immutable after construction: no refresh, no expiry tracking.
#[derive(Debug, Clone)]
pub struct TokenAuthenticator {
    endpoint: String,
    token: String,
}

impl TokenAuthenticator {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }

    /// Return the stored token, failing if it is empty
    pub fn token(&self) -> Result<&str> {
        if self.token.is_empty() {
            return Err(WatcherError::EmptyToken);
        }
        Ok(&self.token)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TokenProvider for TokenAuthenticator {
    async fn token(&self) -> Result<String> {
        TokenAuthenticator::token(self).map(str::to_string)
    }

    async fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_token_authenticator() {
        let auth = TokenAuthenticator::new("https://watcher.example:9322", "gAAAAAB-token");
        assert_eq!(auth.token().unwrap(), "gAAAAAB-token");
        assert_eq!(auth.endpoint(), "https://watcher.example:9322");
    }

    #[test]
    fn test_empty_token() {
        let auth = TokenAuthenticator::new("https://watcher.example:9322", "");
        assert!(matches!(auth.token(), Err(WatcherError::EmptyToken)));
    }

    #[tokio::test]
    async fn test_provider_has_no_refresh_tier() {
        let auth = TokenAuthenticator::new("https://watcher.example:9322", "tok");
        let provider: &dyn TokenProvider = &auth;
        assert!(provider.as_refreshable().is_none());
        assert_eq!(provider.token().await.unwrap(), "tok");
        assert_eq!(provider.endpoint().await, "https://watcher.example:9322");

        let empty = TokenAuthenticator::new("https://watcher.example:9322", "");
        let provider: &dyn TokenProvider = &empty;
        assert!(matches!(
            provider.token().await,
            Err(WatcherError::EmptyToken)
        ));
    }

    proptest! {
        #[test]
        fn prop_returns_exact_token(token in ".{1,128}") {
            let auth = TokenAuthenticator::new("https://watcher.example", token.clone());
            prop_assert_eq!(auth.token().unwrap(), token.as_str());
        }
    }
}
