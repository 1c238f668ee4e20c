use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Authentication method tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMethod {
    #[default]
    #[serde(rename = "token")]
    Token,
    #[serde(rename = "userpass")]
    UserPass,
    #[serde(rename = "approle")]
    AppRole,
    #[serde(rename = "kubernetes")]
    Kubernetes,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Token => "token",
            AuthMethod::UserPass => "userpass",
            AuthMethod::AppRole => "approle",
            AuthMethod::Kubernetes => "kubernetes",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "token" => Ok(AuthMethod::Token),
            "userpass" => Ok(AuthMethod::UserPass),
            "approle" => Ok(AuthMethod::AppRole),
            "kubernetes" => Ok(AuthMethod::Kubernetes),
            other => Err(format!("unsupported authentication method: {}", other)),
        }
    }
}

/// Credential bundle read from the auth file.
///
/// Only the fields of the selected `method` are consulted at login.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthOptions {
    pub method: AuthMethod,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Token issued by kubernetes-vault, only honoured in the legacy file format
    #[serde(
        rename = "clientToken",
        alias = "client_token",
        skip_serializing_if = "Option::is_none"
    )]
    pub client_token: Option<String>,

    #[serde(alias = "role", skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(
        rename = "vaultAddr",
        alias = "vault_addr",
        skip_serializing_if = "Option::is_none"
    )]
    pub vault_addr: Option<String>,

    #[serde(
        rename = "leaseDuration",
        alias = "lease_duration",
        skip_serializing_if = "Option::is_none"
    )]
    pub lease_duration: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewable: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_defaults_to_token() {
        let options: AuthOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.method, AuthMethod::Token);
        assert!(options.token.is_none());
    }

    #[test]
    fn test_legacy_field_names() {
        let options: AuthOptions = serde_json::from_str(
            r#"{"method": "approle", "role": "r-1", "secret_id": "s-1", "vaultAddr": "http://vault:8200"}"#,
        )
        .unwrap();
        assert_eq!(options.method, AuthMethod::AppRole);
        assert_eq!(options.role_id.as_deref(), Some("r-1"));
        assert_eq!(options.vault_addr.as_deref(), Some("http://vault:8200"));
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("kubernetes".parse::<AuthMethod>().unwrap(), AuthMethod::Kubernetes);
        assert!("ldap".parse::<AuthMethod>().is_err());
    }
}
