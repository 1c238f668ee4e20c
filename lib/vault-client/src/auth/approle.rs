use super::{AuthOptions, AuthProvider, client_token};
use crate::{Logical, VaultError};
use async_trait::async_trait;
use std::sync::Arc;

const DEFAULT_MOUNT: &str = "approle";

/// AppRole authentication
pub struct AppRoleAuth {
    client: Arc<dyn Logical>,
    mount: String,
}

impl AppRoleAuth {
    pub fn new(client: Arc<dyn Logical>) -> Self {
        Self {
            client,
            mount: DEFAULT_MOUNT.to_string(),
        }
    }

    pub fn with_mount(mut self, mount: impl Into<String>) -> Self {
        self.mount = mount.into();
        self
    }
}

#[async_trait]
impl AuthProvider for AppRoleAuth {
    async fn login(&self, options: &AuthOptions) -> Result<String, VaultError> {
        let role_id = options
            .role_id
            .as_deref()
            .ok_or_else(|| VaultError::MissingConfiguration("role_id not provided".into()))?;
        let secret_id = options.secret_id.as_deref().unwrap_or_default();

        let path = format!("auth/{}/login", self.mount);
        let response = self
            .client
            .write(
                &path,
                serde_json::json!({
                    "role_id": role_id,
                    "secret_id": secret_id,
                }),
            )
            .await?;

        client_token(response)
    }
}
