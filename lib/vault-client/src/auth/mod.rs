mod approle;
mod kubernetes;
mod options;
mod token;
mod userpass;

pub use approle::AppRoleAuth;
pub use kubernetes::KubernetesAuth;
pub use options::{AuthMethod, AuthOptions};
pub use token::StaticTokenAuth;
pub use userpass::UserPassAuth;

use crate::models::Secret;
use crate::{Logical, VaultError};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for authentication methods
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchange the method's credential material for a client token.
    ///
    /// Returns a non-empty token or an error, never neither.
    async fn login(&self, options: &AuthOptions) -> Result<String, VaultError>;
}

/// Build the provider for `method`, resolving its environment once.
pub fn provider_for(method: AuthMethod, client: Arc<dyn Logical>) -> Box<dyn AuthProvider> {
    match method {
        AuthMethod::Token => Box::new(StaticTokenAuth::from_env()),
        AuthMethod::UserPass => Box::new(UserPassAuth::new(client)),
        AuthMethod::AppRole => Box::new(AppRoleAuth::new(client)),
        AuthMethod::Kubernetes => Box::new(KubernetesAuth::from_env(client)),
    }
}

/// Pull the client token out of a login response
fn client_token(response: Option<Secret>) -> Result<String, VaultError> {
    response
        .and_then(|secret| secret.auth)
        .map(|auth| auth.client_token)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| VaultError::AuthError("login response did not carry a client token".into()))
}
