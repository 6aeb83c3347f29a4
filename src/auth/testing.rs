// Scripted identity backend for unit tests

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::identity::IdentityService;
use super::types::{
    AuthMethod, CatalogEndpoint, CatalogService, Credential, IssuedToken, ServiceCatalog,
    DEFAULT_SERVICE_TYPE,
};
use crate::error::{Result, WatcherError};

/// Issues `tok-1`, `tok-2`, ... and counts every call.
///
/// Token lifetimes are taken from the queue first, then the default.
/// A `None` lifetime makes introspection of that token fail.
pub(crate) struct FakeIdentity {
    issued: AtomicUsize,
    introspected: AtomicUsize,
    failing: AtomicBool,
    endpoint: Mutex<Option<String>>,
    lifetimes: Mutex<VecDeque<Option<Duration>>>,
    default_lifetime: Option<Duration>,
    expiries: Mutex<HashMap<String, DateTime<Utc>>>,
    delay: std::time::Duration,
}

impl FakeIdentity {
    pub(crate) fn new(endpoint: &str, lifetime: Option<Duration>) -> Self {
        Self {
            issued: AtomicUsize::new(0),
            introspected: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            endpoint: Mutex::new(Some(endpoint.to_string())),
            lifetimes: Mutex::new(VecDeque::new()),
            default_lifetime: lifetime,
            expiries: Mutex::new(HashMap::new()),
            delay: std::time::Duration::ZERO,
        }
    }

    pub(crate) fn with_lifetimes(endpoint: &str, lifetimes: Vec<Option<Duration>>) -> Self {
        let fake = Self::new(endpoint, None);
        *fake.lifetimes.lock().unwrap() = lifetimes.into();
        fake
    }

    pub(crate) fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn set_endpoint(&self, endpoint: Option<&str>) {
        *self.endpoint.lock().unwrap() = endpoint.map(str::to_string);
    }

    pub(crate) fn issue_count(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }

    pub(crate) fn introspect_count(&self) -> usize {
        self.introspected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityService for FakeIdentity {
    async fn issue_token(
        &self,
        _credential: &Credential,
        _method: &AuthMethod,
    ) -> Result<IssuedToken> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(WatcherError::Authentication(
                "identity service returned 401 Unauthorized".to_string(),
            ));
        }

        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("tok-{}", n);

        let lifetime = self
            .lifetimes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.default_lifetime);
        if let Some(lifetime) = lifetime {
            self.expiries
                .lock()
                .unwrap()
                .insert(token.clone(), Utc::now() + lifetime);
        }

        let services = self
            .endpoint
            .lock()
            .unwrap()
            .clone()
            .map(|url| CatalogService {
                service_type: DEFAULT_SERVICE_TYPE.to_string(),
                name: Some("watcher".to_string()),
                endpoints: vec![CatalogEndpoint {
                    interface: "public".to_string(),
                    url,
                    region: Some("RegionOne".to_string()),
                    region_id: Some("RegionOne".to_string()),
                }],
            })
            .into_iter()
            .collect();

        Ok(IssuedToken {
            token,
            catalog: ServiceCatalog { services },
        })
    }

    async fn token_expiry(&self, _credential: &Credential, token: &str) -> Result<DateTime<Utc>> {
        self.introspected.fetch_add(1, Ordering::SeqCst);
        self.expiries
            .lock()
            .unwrap()
            .get(token)
            .copied()
            .ok_or_else(|| WatcherError::Authentication("token introspection returned 403".into()))
    }
}
