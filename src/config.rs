use std::path::Path;

use vault_client::{AuthMethod, AuthOptions};

use crate::error::{Result, SidekickError};
use crate::options::AuthFileFormat;
use crate::utils::file_exists;

/// Read the auth options from `filename`.
///
/// `.yaml`/`.yml` files are decoded as YAML, anything else as JSON.
pub fn load_auth_options(filename: &Path, format: AuthFileFormat) -> Result<AuthOptions> {
    if !file_exists(filename).map_err(|e| SidekickError::io(filename, e))? {
        return Err(SidekickError::NotFound(filename.to_path_buf()));
    }

    match filename.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => read_yaml_file(filename),
        _ => read_json_file(filename, format),
    }
}

fn read_json_file(filename: &Path, format: AuthFileFormat) -> Result<AuthOptions> {
    let content = std::fs::read(filename).map_err(|e| SidekickError::io(filename, e))?;
    let mut options: AuthOptions = serde_json::from_slice(&content)?;

    if format == AuthFileFormat::KubernetesVault {
        if let Some(client_token) = options.client_token.clone().filter(|t| !t.is_empty()) {
            tracing::debug!("using the client token issued by kubernetes-vault");
            options.method = AuthMethod::Token;
            options.token = Some(client_token);
        }
    }

    Ok(options)
}

fn read_yaml_file(filename: &Path) -> Result<AuthOptions> {
    let content = std::fs::read(filename).map_err(|e| SidekickError::io(filename, e))?;
    Ok(serde_yaml::from_slice(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_auth_options(&dir.path().join("auth.json"), AuthFileFormat::Default);
        assert!(matches!(result, Err(SidekickError::NotFound(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let original = AuthOptions {
            method: AuthMethod::AppRole,
            token: Some("s.abc".into()),
            role_id: Some("r-1".into()),
            secret_id: Some("s-1".into()),
            ..Default::default()
        };
        let path = write(&dir, "auth.json", &serde_json::to_string(&original).unwrap());

        let loaded = load_auth_options(&path, AuthFileFormat::Default).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "auth.yml",
            "method: userpass\nusername: alice\npassword: wonderland\n",
        );

        let loaded = load_auth_options(&path, AuthFileFormat::Default).unwrap();
        assert_eq!(loaded.method, AuthMethod::UserPass);
        assert_eq!(loaded.username.as_deref(), Some("alice"));
        assert_eq!(loaded.password.as_deref(), Some("wonderland"));
    }

    #[test]
    fn test_legacy_client_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "token", r#"{"clientToken": "s.legacy"}"#);

        let loaded = load_auth_options(&path, AuthFileFormat::KubernetesVault).unwrap();
        assert_eq!(loaded.method, AuthMethod::Token);
        assert_eq!(loaded.token.as_deref(), Some("s.legacy"));
    }

    #[test]
    fn test_client_token_ignored_under_default_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "auth.json",
            r#"{"method": "kubernetes", "clientToken": "s.legacy"}"#,
        );

        let loaded = load_auth_options(&path, AuthFileFormat::Default).unwrap();
        assert_eq!(loaded.method, AuthMethod::Kubernetes);
        assert!(loaded.token.is_none());
    }

    #[test]
    fn test_malformed_json_is_fatal_in_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "auth.json", "{not json");

        for format in [AuthFileFormat::Default, AuthFileFormat::KubernetesVault] {
            let result = load_auth_options(&path, format);
            assert!(matches!(result, Err(SidekickError::Json(_))));
        }
    }

    #[test]
    fn test_malformed_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "auth.yaml", "method: [unterminated");

        let result = load_auth_options(&path, AuthFileFormat::Default);
        assert!(matches!(result, Err(SidekickError::Yaml(_))));
    }
}
