// Credential validation and authentication method resolution

use reqwest::Url;

use super::types::{AuthMethod, Credential, DomainRef, Scope, UserRef};
use crate::error::{Result, WatcherError};

/// Treat empty strings the same as missing values
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl Credential {
    /// Validate the credential and resolve the authentication method.
    ///
    /// Resolution order: application credential by ID, application credential
    /// by name, token, then password.
    pub fn validate(&self) -> Result<AuthMethod> {
        if self.identity_endpoint.is_empty() {
            return Err(WatcherError::Validation(
                "identity endpoint is required".to_string(),
            ));
        }

        Url::parse(&self.identity_endpoint).map_err(|e| {
            WatcherError::Validation(format!(
                "invalid identity endpoint '{}': {}",
                self.identity_endpoint, e
            ))
        })?;

        if let Some(scope) = &self.scope {
            validate_scope(scope)?;
        }

        self.resolve_method().ok_or_else(|| {
            WatcherError::Validation("no valid authentication method provided".to_string())
        })
    }

    fn resolve_method(&self) -> Option<AuthMethod> {
        let secret = non_empty(&self.application_credential_secret);

        if let (Some(id), Some(secret)) = (non_empty(&self.application_credential_id), secret) {
            return Some(AuthMethod::ApplicationCredentialId {
                id: id.to_string(),
                secret: secret.to_string(),
            });
        }

        if let (Some(name), Some(secret)) = (non_empty(&self.application_credential_name), secret)
        {
            return Some(AuthMethod::ApplicationCredentialName {
                name: name.to_string(),
                secret: secret.to_string(),
                user: self.user_ref(),
            });
        }

        if let Some(id) = non_empty(&self.token_id) {
            return Some(AuthMethod::Token { id: id.to_string() });
        }

        let password = non_empty(&self.password)?;
        let user = self.user_ref()?;
        Some(AuthMethod::Password {
            user,
            password: password.to_string(),
        })
    }

    fn user_ref(&self) -> Option<UserRef> {
        if let Some(id) = non_empty(&self.user_id) {
            return Some(UserRef::Id(id.to_string()));
        }

        let name = non_empty(&self.username)?;
        let domain = non_empty(&self.user_domain_id)
            .map(|id| DomainRef::Id(id.to_string()))
            .or_else(|| non_empty(&self.user_domain_name).map(|n| DomainRef::Name(n.to_string())));

        Some(UserRef::Name {
            name: name.to_string(),
            domain,
        })
    }
}

fn validate_scope(scope: &Scope) -> Result<()> {
    let has_identifier = [
        &scope.project_id,
        &scope.project_name,
        &scope.domain_id,
        &scope.domain_name,
    ]
    .into_iter()
    .any(|field| non_empty(field).is_some());

    if !has_identifier {
        return Err(WatcherError::Validation(
            "scope must specify either project or domain".to_string(),
        ));
    }

    Ok(())
}
