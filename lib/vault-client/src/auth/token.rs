use super::{AuthOptions, AuthProvider};
use crate::VaultError;
use async_trait::async_trait;

const TOKEN_ENV: &str = "VAULT_TOKEN";

/// Static token authentication
pub struct StaticTokenAuth {
    env_token: Option<String>,
}

impl StaticTokenAuth {
    /// `env_token` is used when the options carry no token
    pub fn new(env_token: Option<String>) -> Self {
        Self { env_token }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var(TOKEN_ENV).ok())
    }
}

#[async_trait]
impl AuthProvider for StaticTokenAuth {
    async fn login(&self, options: &AuthOptions) -> Result<String, VaultError> {
        options
            .token
            .iter()
            .chain(self.env_token.iter())
            .find(|token| !token.is_empty())
            .cloned()
            .ok_or_else(|| {
                VaultError::MissingConfiguration(format!(
                    "no token in the auth options and {} not set",
                    TOKEN_ENV
                ))
            })
    }
}
