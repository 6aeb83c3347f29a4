use anyhow::{Context, Result};
use clap::{Args, Parser};
use std::time::Duration;

use crate::auth::{Credential, Interface, Scope, DEFAULT_SERVICE_TYPE};

/// Default Watcher API version path segment
pub const DEFAULT_API_VERSION: &str = "v1";

/// Default HTTP request timeout for identity and API calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Options for building a Keystone-authenticated [`WatcherClient`](crate::WatcherClient)
#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub credential: Credential,
    pub timeout: Duration,
    pub api_version: String,
    /// Sent as `OpenStack-API-Version: infra-optim <microversion>` when set
    pub microversion: Option<String>,
}

impl ClientOptions {
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            timeout: DEFAULT_TIMEOUT,
            api_version: DEFAULT_API_VERSION.to_string(),
            microversion: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_microversion(mut self, microversion: impl Into<String>) -> Self {
        self.microversion = Some(microversion.into());
        self
    }
}

/// Connection settings, from flags or the standard OpenStack environment
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Keystone URL
    #[arg(long, env = "OS_AUTH_URL")]
    pub os_auth_url: Option<String>,

    #[arg(long, env = "OS_USERNAME")]
    pub os_username: Option<String>,

    #[arg(long, env = "OS_USER_ID")]
    pub os_user_id: Option<String>,

    #[arg(long, env = "OS_PASSWORD", hide_env_values = true)]
    pub os_password: Option<String>,

    #[arg(long, env = "OS_USER_DOMAIN_ID")]
    pub os_user_domain_id: Option<String>,

    #[arg(long, env = "OS_USER_DOMAIN_NAME")]
    pub os_user_domain_name: Option<String>,

    #[arg(long, env = "OS_PROJECT_ID")]
    pub os_project_id: Option<String>,

    #[arg(long, env = "OS_PROJECT_NAME")]
    pub os_project_name: Option<String>,

    #[arg(long, env = "OS_PROJECT_DOMAIN_ID")]
    pub os_project_domain_id: Option<String>,

    #[arg(long, env = "OS_PROJECT_DOMAIN_NAME")]
    pub os_project_domain_name: Option<String>,

    /// Domain scope, used when no project is given
    #[arg(long, env = "OS_DOMAIN_ID")]
    pub os_domain_id: Option<String>,

    #[arg(long, env = "OS_DOMAIN_NAME")]
    pub os_domain_name: Option<String>,

    /// Pre-issued token (with --watcher-endpoint, skips Keystone entirely)
    #[arg(long, env = "OS_TOKEN", hide_env_values = true)]
    pub os_token: Option<String>,

    #[arg(long, env = "OS_APPLICATION_CREDENTIAL_ID")]
    pub os_application_credential_id: Option<String>,

    #[arg(long, env = "OS_APPLICATION_CREDENTIAL_NAME")]
    pub os_application_credential_name: Option<String>,

    #[arg(long, env = "OS_APPLICATION_CREDENTIAL_SECRET", hide_env_values = true)]
    pub os_application_credential_secret: Option<String>,

    #[arg(long, env = "OS_REGION_NAME")]
    pub os_region_name: Option<String>,

    /// Endpoint interface (public, internal, admin)
    #[arg(long, env = "OS_INTERFACE", default_value = "public")]
    pub os_interface: String,

    /// Watcher endpoint; with --os-token, no Keystone round-trip is made
    #[arg(long, env = "WATCHER_ENDPOINT")]
    pub watcher_endpoint: Option<String>,

    #[arg(long, env = "WATCHER_API_VERSION", default_value = DEFAULT_API_VERSION)]
    pub api_version: String,

    #[arg(long, env = "WATCHER_API_MICROVERSION")]
    pub microversion: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, env = "WATCHER_TIMEOUT", default_value = "30")]
    pub timeout: u64,

    /// Re-authenticate automatically when the token expires or is rejected
    #[arg(
        long,
        env = "WATCHER_ALLOW_REAUTH",
        default_value = "true",
        action = clap::ArgAction::Set
    )]
    pub allow_reauth: bool,
}

/// How the client authenticates
#[derive(Clone, Debug)]
pub enum AuthMode {
    /// Keystone authentication with the given options
    Keystone(ClientOptions),
    /// Fixed token against a known endpoint
    Token {
        endpoint: String,
        token: String,
        api_version: String,
        timeout: Duration,
    },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub auth: AuthMode,
}

impl Config {
    /// Build configuration from parsed connection arguments
    pub fn from_args(args: &ConnectionArgs) -> Result<Self> {
        let timeout = Duration::from_secs(args.timeout);

        if let (Some(endpoint), Some(token)) = (
            non_empty(&args.watcher_endpoint),
            non_empty(&args.os_token),
        ) {
            return Ok(Config {
                auth: AuthMode::Token {
                    endpoint: endpoint.to_string(),
                    token: token.to_string(),
                    api_version: args.api_version.clone(),
                    timeout,
                },
            });
        }

        let identity_endpoint = non_empty(&args.os_auth_url)
            .context("OS_AUTH_URL is required (use --os-auth-url or set OS_AUTH_URL env var)")?
            .to_string();

        let interface: Interface = args
            .os_interface
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;

        let credential = Credential {
            identity_endpoint,
            username: args.os_username.clone(),
            user_id: args.os_user_id.clone(),
            password: args.os_password.clone(),
            user_domain_id: args.os_user_domain_id.clone(),
            user_domain_name: args.os_user_domain_name.clone(),
            token_id: args.os_token.clone(),
            application_credential_id: args.os_application_credential_id.clone(),
            application_credential_name: args.os_application_credential_name.clone(),
            application_credential_secret: args.os_application_credential_secret.clone(),
            scope: build_scope(args),
            allow_reauth: args.allow_reauth,
            region: args.os_region_name.clone(),
            interface,
            service_type: DEFAULT_SERVICE_TYPE.to_string(),
        };

        let mut options = ClientOptions::new(credential)
            .with_timeout(timeout)
            .with_api_version(args.api_version.clone());
        options.microversion = args.microversion.clone();

        Ok(Config {
            auth: AuthMode::Keystone(options),
        })
    }

}

/// Load `.env` if it exists, then parse command-line arguments
pub fn parse_args<T: Parser>() -> T {
    dotenvy::dotenv().ok();
    T::parse()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Project scope wins over domain scope, as with the OpenStack CLI
fn build_scope(args: &ConnectionArgs) -> Option<Scope> {
    if non_empty(&args.os_project_id).is_some() || non_empty(&args.os_project_name).is_some() {
        return Some(Scope {
            project_id: args.os_project_id.clone(),
            project_name: args.os_project_name.clone(),
            domain_id: args.os_project_domain_id.clone(),
            domain_name: args.os_project_domain_name.clone(),
        });
    }

    if non_empty(&args.os_domain_id).is_some() || non_empty(&args.os_domain_name).is_some() {
        return Some(Scope {
            domain_id: args.os_domain_id.clone(),
            domain_name: args.os_domain_name.clone(),
            ..Scope::default()
        });
    }

    None
}
