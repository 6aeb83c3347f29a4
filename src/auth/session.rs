// Named authentication sessions

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::manager::Authenticator;
use crate::error::{Result, WatcherError};

/// Registry of independent authenticators, e.g. one per cloud or tenant
#[derive(Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Authenticator>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the session registered under `name`
    pub async fn add_session(&self, name: impl Into<String>, auth: Arc<Authenticator>) {
        let name = name.into();
        tracing::debug!(session = %name, "Registering session");
        self.sessions.write().await.insert(name, auth);
    }

    pub async fn get_session(&self, name: &str) -> Result<Arc<Authenticator>> {
        self.sessions
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| WatcherError::SessionNotFound(name.to_string()))
    }

    /// Remove a session; absent names are ignored
    pub async fn remove_session(&self, name: &str) {
        self.sessions.write().await.remove(name);
    }

    /// Names of all registered sessions, in no particular order
    pub async fn list_sessions(&self) -> Vec<String> {
        self.sessions.read().await.keys().cloned().collect()
    }

    /// Remove every session whose token is known to be expired.
    ///
    /// Sessions with unknown expiry are kept. Returns the number removed.
    pub async fn cleanup_expired_sessions(&self) -> usize {
        // Expiry is read without holding the registry lock
        let snapshot: Vec<(String, Arc<Authenticator>)> = self
            .sessions
            .read()
            .await
            .iter()
            .map(|(name, auth)| (name.clone(), auth.clone()))
            .collect();

        let mut expired = Vec::new();
        for (name, auth) in snapshot {
            if auth.is_token_expired().await {
                expired.push((name, auth));
            }
        }

        let mut sessions = self.sessions.write().await;
        let mut removed = 0;
        for (name, auth) in expired {
            // Skip sessions replaced since the snapshot
            if sessions.get(&name).is_some_and(|current| Arc::ptr_eq(current, &auth)) {
                sessions.remove(&name);
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::info!(removed, "Removed expired sessions");
        }

        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::FakeIdentity;
    use crate::auth::types::Credential;
    use chrono::{DateTime, Duration, Utc};

    async fn authenticator(expires_at: Option<DateTime<Utc>>) -> Arc<Authenticator> {
        let identity = Arc::new(FakeIdentity::new(
            "https://watcher.example",
            Some(Duration::minutes(60)),
        ));
        let auth = Authenticator::with_identity(
            Credential::password("https://keystone.example/v3", "u", "p"),
            identity,
        )
        .await
        .unwrap();
        auth.set_token_expiry(expires_at).await;
        Arc::new(auth)
    }

    #[tokio::test]
    async fn test_empty_manager() {
        let sm = SessionManager::new();
        assert!(sm.list_sessions().await.is_empty());
        assert!(matches!(
            sm.get_session("non-existent").await,
            Err(WatcherError::SessionNotFound(name)) if name == "non-existent"
        ));
    }

    #[tokio::test]
    async fn test_add_get_remove() {
        let sm = SessionManager::new();
        let auth = authenticator(Some(Utc::now() + Duration::minutes(30))).await;

        sm.add_session("a", auth.clone()).await;
        assert!(Arc::ptr_eq(&sm.get_session("a").await.unwrap(), &auth));

        sm.remove_session("a").await;
        assert!(sm.get_session("a").await.is_err());

        // Removing an absent session is a no-op
        sm.remove_session("a").await;
        assert!(sm.list_sessions().await.is_empty());
    }

    #[tokio::test]
    async fn test_add_replaces_existing() {
        let sm = SessionManager::new();
        let first = authenticator(None).await;
        let second = authenticator(None).await;

        sm.add_session("prod", first).await;
        sm.add_session("prod", second.clone()).await;
        sm.add_session("staging", authenticator(None).await).await;

        assert!(Arc::ptr_eq(&sm.get_session("prod").await.unwrap(), &second));

        let mut names = sm.list_sessions().await;
        names.sort();
        assert_eq!(names, vec!["prod".to_string(), "staging".to_string()]);
    }

    #[tokio::test]
    async fn test_cleanup_expired_sessions() {
        let sm = SessionManager::new();
        sm.add_session("expired-1", authenticator(Some(Utc::now() - Duration::minutes(1))).await)
            .await;
        sm.add_session("expired-2", authenticator(Some(Utc::now() - Duration::hours(2))).await)
            .await;
        sm.add_session("valid", authenticator(Some(Utc::now() + Duration::minutes(30))).await)
            .await;
        // Within the refresh buffer but not yet expired
        sm.add_session("expiring", authenticator(Some(Utc::now() + Duration::minutes(2))).await)
            .await;
        sm.add_session("unknown", authenticator(None).await).await;

        assert_eq!(sm.cleanup_expired_sessions().await, 2);

        let mut names = sm.list_sessions().await;
        names.sort();
        assert_eq!(names, vec!["expiring", "unknown", "valid"]);

        assert_eq!(sm.cleanup_expired_sessions().await, 0);
    }
}
