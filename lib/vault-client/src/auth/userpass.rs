use super::{AuthOptions, AuthProvider, client_token};
use crate::{Logical, VaultError};
use async_trait::async_trait;
use std::sync::Arc;

const DEFAULT_MOUNT: &str = "userpass";

/// Username and password authentication
pub struct UserPassAuth {
    client: Arc<dyn Logical>,
    mount: String,
}

impl UserPassAuth {
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
impl AuthProvider for UserPassAuth {
    async fn login(&self, options: &AuthOptions) -> Result<String, VaultError> {
        let username = options
            .username
            .as_deref()
            .ok_or_else(|| VaultError::MissingConfiguration("username not provided".into()))?;
        let password = options
            .password
            .as_deref()
            .ok_or_else(|| VaultError::MissingConfiguration("password not provided".into()))?;

        let path = format!("auth/{}/login/{}", self.mount, username);
        let response = self
            .client
            .write(&path, serde_json::json!({ "password": password }))
            .await?;

        client_token(response)
    }
}
