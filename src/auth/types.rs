// Authentication types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Service type Watcher registers in the Keystone catalog
pub const DEFAULT_SERVICE_TYPE: &str = "infra-optim";

/// Endpoint interface to select from the service catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interface {
    #[default]
    Public,
    Internal,
    Admin,
}

impl Interface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interface::Public => "public",
            Interface::Internal => "internal",
            Interface::Admin => "admin",
        }
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Interface {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().trim_end_matches("url") {
            "public" => Ok(Interface::Public),
            "internal" => Ok(Interface::Internal),
            "admin" => Ok(Interface::Admin),
            other => Err(format!("unknown endpoint interface: {}", other)),
        }
    }
}

/// Project or domain a token is scoped to.
///
/// With a project identifier, `domain_id`/`domain_name` name the project's
/// domain. Without one, they scope the token to the domain itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    pub project_id: Option<String>,
    pub project_name: Option<String>,
    pub domain_id: Option<String>,
    pub domain_name: Option<String>,
}

impl Scope {
    /// Scope to a project by name
    pub fn project_name(name: impl Into<String>) -> Self {
        Self {
            project_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Scope to a project by ID
    pub fn project_id(id: impl Into<String>) -> Self {
        Self {
            project_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Scope to a domain by ID
    pub fn domain_id(id: impl Into<String>) -> Self {
        Self {
            domain_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Set the domain (of the project, or of the scope itself)
    pub fn with_domain_id(mut self, id: impl Into<String>) -> Self {
        self.domain_id = Some(id.into());
        self
    }

    pub fn with_domain_name(mut self, name: impl Into<String>) -> Self {
        self.domain_name = Some(name.into());
        self
    }
}

/// Raw authentication input.
///
/// Empty strings are treated the same as absent fields. Exactly which
/// method is used is decided by [`Credential::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    /// Keystone URL, with or without the `/v3` suffix
    pub identity_endpoint: String,

    pub username: Option<String>,
    pub user_id: Option<String>,
    pub password: Option<String>,
    pub user_domain_id: Option<String>,
    pub user_domain_name: Option<String>,

    /// Pre-issued Keystone token
    pub token_id: Option<String>,

    pub application_credential_id: Option<String>,
    pub application_credential_name: Option<String>,
    pub application_credential_secret: Option<String>,

    pub scope: Option<Scope>,

    /// Refresh the token transparently when it nears expiry or is rejected
    pub allow_reauth: bool,

    // Catalog endpoint selection
    pub region: Option<String>,
    pub interface: Interface,
    pub service_type: String,
}

impl Default for Credential {
    fn default() -> Self {
        Self {
            identity_endpoint: String::new(),
            username: None,
            user_id: None,
            password: None,
            user_domain_id: None,
            user_domain_name: None,
            token_id: None,
            application_credential_id: None,
            application_credential_name: None,
            application_credential_secret: None,
            scope: None,
            allow_reauth: true,
            region: None,
            interface: Interface::Public,
            service_type: DEFAULT_SERVICE_TYPE.to_string(),
        }
    }
}

impl Credential {
    /// Username/password credential
    pub fn password(
        identity_endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            identity_endpoint: identity_endpoint.into(),
            username: Some(username.into()),
            password: Some(password.into()),
            ..Self::default()
        }
    }

    /// Pre-issued token credential
    pub fn token(identity_endpoint: impl Into<String>, token_id: impl Into<String>) -> Self {
        Self {
            identity_endpoint: identity_endpoint.into(),
            token_id: Some(token_id.into()),
            ..Self::default()
        }
    }

    /// Application credential identified by ID
    pub fn application_credential(
        identity_endpoint: impl Into<String>,
        id: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            identity_endpoint: identity_endpoint.into(),
            application_credential_id: Some(id.into()),
            application_credential_secret: Some(secret.into()),
            ..Self::default()
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_user_domain_id(mut self, id: impl Into<String>) -> Self {
        self.user_domain_id = Some(id.into());
        self
    }

    pub fn with_allow_reauth(mut self, allow: bool) -> Self {
        self.allow_reauth = allow;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_interface(mut self, interface: Interface) -> Self {
        self.interface = interface;
        self
    }
}

/// Reference to a user, by ID or by name within a domain
#[derive(Debug, Clone, PartialEq)]
pub enum UserRef {
    Id(String),
    Name {
        name: String,
        domain: Option<DomainRef>,
    },
}

/// Reference to a domain by ID or name
#[derive(Debug, Clone, PartialEq)]
pub enum DomainRef {
    Id(String),
    Name(String),
}

/// Authentication method resolved from a [`Credential`]
#[derive(Debug, Clone, PartialEq)]
pub enum AuthMethod {
    Password { user: UserRef, password: String },
    Token { id: String },
    ApplicationCredentialId { id: String, secret: String },
    ApplicationCredentialName {
        name: String,
        secret: String,
        user: Option<UserRef>,
    },
}

impl AuthMethod {
    /// Keystone method name
    pub fn name(&self) -> &'static str {
        match self {
            AuthMethod::Password { .. } => "password",
            AuthMethod::Token { .. } => "token",
            AuthMethod::ApplicationCredentialId { .. }
            | AuthMethod::ApplicationCredentialName { .. } => "application_credential",
        }
    }
}

/// Read-only snapshot of an authenticator for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthInfo {
    pub username: Option<String>,
    pub user_id: Option<String>,
    pub project_name: Option<String>,
    pub project_id: Option<String>,
    pub domain_name: Option<String>,
    pub domain_id: Option<String>,
    pub token_expiry: Option<DateTime<Utc>>,
    pub is_expired: bool,
    #[serde(skip)]
    pub time_until_expiry: Option<Duration>,
}

/// Token returned by a successful identity exchange
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub catalog: ServiceCatalog,
}

/// Service catalog published with a Keystone token
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ServiceCatalog {
    pub services: Vec<CatalogService>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogService {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub endpoints: Vec<CatalogEndpoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEndpoint {
    pub interface: String,
    pub url: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub region_id: Option<String>,
}

impl ServiceCatalog {
    /// Locate the URL for a service type, interface and optional region
    pub fn find_endpoint(
        &self,
        service_type: &str,
        interface: Interface,
        region: Option<&str>,
    ) -> Option<&str> {
        self.services
            .iter()
            .filter(|service| service.service_type == service_type)
            .flat_map(|service| service.endpoints.iter())
            .find(|endpoint| {
                endpoint.interface.eq_ignore_ascii_case(interface.as_str())
                    && region.map_or(true, |r| {
                        endpoint.region.as_deref() == Some(r)
                            || endpoint.region_id.as_deref() == Some(r)
                    })
            })
            .map(|endpoint| endpoint.url.as_str())
    }
}

// === Keystone v3 wire format ===

/// `POST /v3/auth/tokens` request body
#[derive(Serialize)]
pub struct TokenRequest<'a> {
    pub auth: TokenRequestAuth<'a>,
}

#[derive(Serialize)]
pub struct TokenRequestAuth<'a> {
    pub identity: IdentityBody<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<ScopeBody<'a>>,
}

#[derive(Serialize)]
pub struct IdentityBody<'a> {
    pub methods: [&'static str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<PasswordBody<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenIdBody<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_credential: Option<ApplicationCredentialBody<'a>>,
}

#[derive(Serialize)]
pub struct PasswordBody<'a> {
    pub user: UserBody<'a>,
}

#[derive(Serialize)]
pub struct UserBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<DomainBody<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
}

#[derive(Serialize)]
pub struct DomainBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
}

#[derive(Serialize)]
pub struct TokenIdBody<'a> {
    pub id: &'a str,
}

#[derive(Serialize)]
pub struct ApplicationCredentialBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    pub secret: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserBody<'a>>,
}

#[derive(Serialize)]
pub struct ScopeBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectBody<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<DomainBody<'a>>,
}

#[derive(Serialize)]
pub struct ProjectBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<DomainBody<'a>>,
}

/// Keystone token response (issue and introspection share the shape)
#[derive(Deserialize)]
pub struct TokenResponse {
    pub token: TokenResponseBody,
}

#[derive(Deserialize)]
pub struct TokenResponseBody {
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub catalog: ServiceCatalog,
}
