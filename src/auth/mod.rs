// Authentication module
// Manages Keystone credentials, token lifecycle and named sessions

mod credentials;
mod identity;
mod manager;
mod provider;
mod session;
mod token;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use identity::{tokens_url, IdentityService, KeystoneIdentity};
pub use manager::{Authenticator, TOKEN_REFRESH_THRESHOLD_SECS};
pub use provider::{RefreshableTokenProvider, TokenProvider};
pub use session::SessionManager;
pub use token::TokenAuthenticator;
pub use types::{
    AuthInfo, AuthMethod, CatalogEndpoint, CatalogService, Credential, DomainRef, Interface,
    IssuedToken, Scope, ServiceCatalog, UserRef, DEFAULT_SERVICE_TYPE,
};
