// Identity service exchange (Keystone v3)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::time::Duration;

use super::types::{
    ApplicationCredentialBody, AuthMethod, Credential, DomainBody, DomainRef, IdentityBody,
    IssuedToken, PasswordBody, ProjectBody, Scope, ScopeBody, TokenIdBody, TokenRequest,
    TokenRequestAuth, TokenResponse, UserBody, UserRef,
};
use super::credentials::non_empty;
use crate::error::{Result, WatcherError};

const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

/// Backend that exchanges credentials for tokens.
///
/// [`KeystoneIdentity`] is the production implementation; the trait exists so
/// an [`Authenticator`](super::Authenticator) can run against any identity
/// backend.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Submit the credential and return the issued token with its catalog
    async fn issue_token(&self, credential: &Credential, method: &AuthMethod)
        -> Result<IssuedToken>;

    /// Look up the absolute expiry of a token
    async fn token_expiry(&self, credential: &Credential, token: &str) -> Result<DateTime<Utc>>;
}

/// Keystone v3 identity client
pub struct KeystoneIdentity {
    client: Client,
}

impl KeystoneIdentity {
    /// Create an identity client with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

/// Build the `/v3/auth/tokens` URL, appending `/v3` when missing
pub fn tokens_url(identity_endpoint: &str) -> String {
    let base = identity_endpoint.trim_end_matches('/');
    if base.ends_with("/v3") {
        format!("{}/auth/tokens", base)
    } else {
        format!("{}/v3/auth/tokens", base)
    }
}

#[async_trait]
impl IdentityService for KeystoneIdentity {
    async fn issue_token(
        &self,
        credential: &Credential,
        method: &AuthMethod,
    ) -> Result<IssuedToken> {
        let url = tokens_url(&credential.identity_endpoint);
        let request = build_token_request(method, credential.scope.as_ref());

        tracing::debug!(
            url = %url,
            method = method.name(),
            "Requesting Keystone token"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                WatcherError::Authentication(format!("failed to reach identity service: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                body = %error_text,
                "Keystone rejected the credential"
            );
            return Err(WatcherError::Authentication(format!(
                "identity service returned {}: {}",
                status, error_text
            )));
        }

        let token = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                WatcherError::Authentication(format!(
                    "identity response is missing the {} header",
                    SUBJECT_TOKEN_HEADER
                ))
            })?;

        let body: TokenResponse = response.json().await.map_err(|e| {
            WatcherError::Authentication(format!("failed to parse identity response: {}", e))
        })?;

        Ok(IssuedToken {
            token,
            catalog: body.token.catalog,
        })
    }

    async fn token_expiry(&self, credential: &Credential, token: &str) -> Result<DateTime<Utc>> {
        let url = tokens_url(&credential.identity_endpoint);

        let response = self
            .client
            .get(&url)
            .header("X-Auth-Token", token)
            .header(SUBJECT_TOKEN_HEADER, token)
            .send()
            .await
            .map_err(|e| {
                WatcherError::Authentication(format!("token introspection failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatcherError::Authentication(format!(
                "token introspection returned {}",
                status
            )));
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            WatcherError::Authentication(format!("failed to parse token details: {}", e))
        })?;

        body.token.expires_at.ok_or_else(|| {
            WatcherError::Authentication("token details carry no expiry".to_string())
        })
    }
}

/// Build the Keystone v3 token request for a resolved method
pub(crate) fn build_token_request<'a>(
    method: &'a AuthMethod,
    scope: Option<&'a Scope>,
) -> TokenRequest<'a> {
    let mut identity = IdentityBody {
        methods: [method.name()],
        password: None,
        token: None,
        application_credential: None,
    };

    // Application credentials carry their own scope
    let mut scoped = true;

    match method {
        AuthMethod::Password { user, password } => {
            identity.password = Some(PasswordBody {
                user: UserBody {
                    password: Some(password.as_str()),
                    ..user_body(user)
                },
            });
        }
        AuthMethod::Token { id } => {
            identity.token = Some(TokenIdBody { id });
        }
        AuthMethod::ApplicationCredentialId { id, secret } => {
            identity.application_credential = Some(ApplicationCredentialBody {
                id: Some(id.as_str()),
                name: None,
                secret,
                user: None,
            });
            scoped = false;
        }
        AuthMethod::ApplicationCredentialName { name, secret, user } => {
            identity.application_credential = Some(ApplicationCredentialBody {
                id: None,
                name: Some(name.as_str()),
                secret,
                user: user.as_ref().map(user_body),
            });
            scoped = false;
        }
    }

    TokenRequest {
        auth: TokenRequestAuth {
            identity,
            scope: scope.filter(|_| scoped).map(scope_body),
        },
    }
}

fn user_body(user: &UserRef) -> UserBody<'_> {
    match user {
        UserRef::Id(id) => UserBody {
            id: Some(id.as_str()),
            name: None,
            domain: None,
            password: None,
        },
        UserRef::Name { name, domain } => UserBody {
            id: None,
            name: Some(name.as_str()),
            domain: domain.as_ref().map(domain_body),
            password: None,
        },
    }
}

fn domain_body(domain: &DomainRef) -> DomainBody<'_> {
    match domain {
        DomainRef::Id(id) => DomainBody {
            id: Some(id.as_str()),
            name: None,
        },
        DomainRef::Name(name) => DomainBody {
            id: None,
            name: Some(name.as_str()),
        },
    }
}

fn scope_body(scope: &Scope) -> ScopeBody<'_> {
    let domain = non_empty(&scope.domain_id)
        .map(|id| DomainBody {
            id: Some(id),
            name: None,
        })
        .or_else(|| {
            non_empty(&scope.domain_name).map(|name| DomainBody {
                id: None,
                name: Some(name),
            })
        });

    let project_id = non_empty(&scope.project_id);
    let project_name = non_empty(&scope.project_name);

    if project_id.is_some() {
        // Project IDs are globally unique
        ScopeBody {
            project: Some(ProjectBody {
                id: project_id,
                name: None,
                domain: None,
            }),
            domain: None,
        }
    } else if project_name.is_some() {
        ScopeBody {
            project: Some(ProjectBody {
                id: None,
                name: project_name,
                domain,
            }),
            domain: None,
        }
    } else {
        ScopeBody {
            project: None,
            domain,
        }
    }
}
