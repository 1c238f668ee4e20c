use crate::error::VaultError;
use crate::models::Secret;
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};

const TOKEN_HEADER: &str = "X-Vault-Token";

/// Logical read/write surface of the secret store
#[async_trait]
pub trait Logical: Send + Sync {
    /// Read the secret stored at `path`
    async fn read(&self, path: &str) -> Result<Secret, VaultError>;

    /// Write `payload` to `path`. Endpoints answering without a body yield `None`.
    async fn write(
        &self,
        path: &str,
        payload: serde_json::Value,
    ) -> Result<Option<Secret>, VaultError>;
}

/// HTTP client for the Vault logical API
#[derive(Clone)]
pub struct VaultClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl VaultClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            http: reqwest::Client::new(),
        }
    }

    /// Attach the session token used for every subsequent request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token {
            Some(ref token) => request.header(TOKEN_HEADER, token),
            None => request,
        }
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> Result<Option<Secret>, VaultError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| VaultError::RequestError(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(VaultError::SecretNotFound {
                path: path.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VaultError::ClientError {
                status: status.as_u16(),
                message: body,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let secret: Secret = response
            .json()
            .await
            .map_err(|e| VaultError::RequestError(format!("Invalid response: {}", e)))?;
        Ok(Some(secret))
    }
}

#[async_trait]
impl Logical for VaultClient {
    async fn read(&self, path: &str) -> Result<Secret, VaultError> {
        tracing::debug!(path = %path, "reading secret");
        let request = self.http.get(self.url(path));
        self.send(path, request)
            .await?
            .ok_or_else(|| VaultError::SecretNotFound {
                path: path.to_string(),
            })
    }

    async fn write(
        &self,
        path: &str,
        payload: serde_json::Value,
    ) -> Result<Option<Secret>, VaultError> {
        tracing::debug!(path = %path, "writing to secret store");
        let request = self.http.post(self.url(path)).json(&payload);
        self.send(path, request).await
    }
}
