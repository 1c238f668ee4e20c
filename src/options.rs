use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use vault_client::AuthMethod;

use crate::resource::SecretResource;

pub const DEFAULT_OUTPUT_DIR: &str = "/etc/secrets";
pub const DEFAULT_EXEC_TIMEOUT: Duration = Duration::from_secs(60);

/// Layout of the auth file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthFileFormat {
    #[default]
    Default,
    /// Token file dropped by kubernetes-vault
    KubernetesVault,
}

impl FromStr for AuthFileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(AuthFileFormat::Default),
            "kubernetes-vault" => Ok(AuthFileFormat::KubernetesVault),
            other => Err(format!("unsupported auth file format: {}", other)),
        }
    }
}

/// Process-wide options, built once at startup and shared read-only
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub vault_addr: Option<String>,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub exec_timeout: Duration,
    pub auth_file: Option<PathBuf>,
    pub auth_format: AuthFileFormat,
    /// Method used when no auth file is given
    pub auth_method: AuthMethod,
    pub resources: Vec<SecretResource>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            vault_addr: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            dry_run: false,
            exec_timeout: DEFAULT_EXEC_TIMEOUT,
            auth_file: None,
            auth_format: AuthFileFormat::Default,
            auth_method: AuthMethod::Token,
            resources: Vec::new(),
        }
    }
}
