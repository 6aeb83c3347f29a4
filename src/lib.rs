//! Client for the OpenStack Watcher infrastructure-optimization API.
//!
//! Authenticates against Keystone, discovers the `infra-optim` endpoint from
//! the service catalog and keeps the token fresh, re-authenticating once when
//! the API rejects it.
//!
//! ```rust,no_run
//! use watcher_client::{ClientOptions, Credential, ListOptions, Scope, WatcherClient};
//!
//! # tokio_test::block_on(async {
//! let credential = Credential::password("https://keystone.example:5000/v3", "admin", "secret")
//!     .with_user_domain_id("default")
//!     .with_scope(Scope::project_name("admin").with_domain_id("default"));
//!
//! let client = WatcherClient::new(ClientOptions::new(credential)).await?;
//! for goal in client.list_goals(&ListOptions::default()).await? {
//!     println!("{}", goal.name);
//! }
//! # Ok::<(), watcher_client::WatcherError>(())
//! # });
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod http_client;
pub mod models;
pub mod resources;

pub use auth::{
    AuthInfo, Authenticator, Credential, Interface, RefreshableTokenProvider, Scope,
    SessionManager, TokenAuthenticator, TokenProvider,
};
pub use config::ClientOptions;
pub use error::{Result, WatcherError};
pub use http_client::WatcherClient;
pub use models::ListOptions;
