use super::{AuthOptions, AuthProvider, client_token};
use crate::{Logical, VaultError, get_env};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

pub const ROLE_ENV: &str = "VAULT_SIDEKICK_ROLE";
pub const LOGIN_PATH_ENV: &str = "VAULT_K8S_LOGIN_PATH";
pub const TOKEN_PATH_ENV: &str = "VAULT_K8S_TOKEN_PATH";

const DEFAULT_LOGIN_PATH: &str = "auth/kubernetes/login";
const DEFAULT_JWT_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

/// Kubernetes authentication
///
/// Logs in with the pod's service account token. The login endpoint can be
/// moved when the auth engine is mounted somewhere other than `kubernetes`.
pub struct KubernetesAuth {
    client: Arc<dyn Logical>,
    role: Option<String>,
    login_path: String,
    jwt_path: PathBuf,
}

impl KubernetesAuth {
    pub fn new(client: Arc<dyn Logical>, role: Option<String>) -> Self {
        Self {
            client,
            role,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            jwt_path: PathBuf::from(DEFAULT_JWT_PATH),
        }
    }

    /// Role, login path and token path from the environment
    pub fn from_env(client: Arc<dyn Logical>) -> Self {
        Self::new(client, std::env::var(ROLE_ENV).ok())
            .with_login_path(get_env(LOGIN_PATH_ENV, DEFAULT_LOGIN_PATH))
            .with_jwt_path(get_env(TOKEN_PATH_ENV, DEFAULT_JWT_PATH))
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn with_jwt_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.jwt_path = path.into();
        self
    }

    fn read_jwt(&self) -> Result<String, VaultError> {
        std::fs::read_to_string(&self.jwt_path).map_err(|source| VaultError::Io {
            path: self.jwt_path.clone(),
            source,
        })
    }
}

#[async_trait]
impl AuthProvider for KubernetesAuth {
    async fn login(&self, _options: &AuthOptions) -> Result<String, VaultError> {
        let role = self
            .role
            .as_deref()
            .ok_or_else(|| VaultError::MissingConfiguration(format!("{} not provided", ROLE_ENV)))?;

        let jwt = self.read_jwt()?;

        tracing::debug!(role = %role, login_path = %self.login_path, "logging in with service account token");
        let response = self
            .client
            .write(
                &self.login_path,
                serde_json::json!({
                    "role": role,
                    "jwt": jwt,
                }),
            )
            .await?;

        client_token(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Secret, SecretAuth};
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    /// Store double recording every write it receives
    #[derive(Default)]
    struct RecordingStore {
        writes: Mutex<Vec<(String, serde_json::Value)>>,
    }

    #[async_trait]
    impl Logical for RecordingStore {
        async fn read(&self, path: &str) -> Result<Secret, VaultError> {
            Err(VaultError::SecretNotFound {
                path: path.to_string(),
            })
        }

        async fn write(
            &self,
            path: &str,
            payload: serde_json::Value,
        ) -> Result<Option<Secret>, VaultError> {
            self.writes
                .lock()
                .unwrap()
                .push((path.to_string(), payload));
            Ok(Some(Secret {
                auth: Some(SecretAuth {
                    client_token: "s.k8s".into(),
                    ..Default::default()
                }),
                ..Default::default()
            }))
        }
    }

    #[tokio::test]
    async fn test_login_submits_role_and_raw_jwt() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "my-jwt-token").unwrap();

        let store = Arc::new(RecordingStore::default());
        let auth = KubernetesAuth::new(store.clone(), Some("app".to_string()))
            .with_login_path("auth/k8s-east/login")
            .with_jwt_path(file.path());

        let token = auth.login(&AuthOptions::default()).await.unwrap();
        assert_eq!(token, "s.k8s");

        let writes = store.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, "auth/k8s-east/login");
        assert_eq!(
            writes[0].1,
            serde_json::json!({"role": "app", "jwt": "my-jwt-token\n"})
        );
    }

    #[tokio::test]
    async fn test_missing_role_checked_before_jwt() {
        let store = Arc::new(RecordingStore::default());
        let auth = KubernetesAuth::new(store.clone(), None).with_jwt_path("/nonexistent/path");

        let result = auth.login(&AuthOptions::default()).await;
        assert!(matches!(result, Err(VaultError::MissingConfiguration(_))));
        assert!(store.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_jwt_skips_login() {
        let store = Arc::new(RecordingStore::default());
        let auth = KubernetesAuth::new(store.clone(), Some("app".to_string()))
            .with_jwt_path("/nonexistent/path");

        let result = auth.login(&AuthOptions::default()).await;
        assert!(matches!(result, Err(VaultError::Io { .. })));
        assert!(store.writes.lock().unwrap().is_empty());
    }
}
