use std::path::PathBuf;
use thiserror::Error;
use vault_client::VaultError;

#[derive(Debug, Error)]
pub enum SidekickError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("The file: {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unknown output format: {0}")]
    UnsupportedFormat(String),

    #[error("Malformed secret for {format} output: {reason}")]
    MalformedSecret { format: &'static str, reason: String },

    #[error("Failed to render template {}: {message}", .path.display())]
    Template { path: PathBuf, message: String },

    #[error("Command '{command}' failed: {reason}")]
    HookFailure { command: String, reason: String },

    #[error("Invalid resource '{spec}': {reason}")]
    InvalidResource { spec: String, reason: String },

    #[error("{failed} of {total} resources failed")]
    Incomplete { failed: usize, total: usize },

    #[error(transparent)]
    Vault(#[from] VaultError),
}

impl SidekickError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SidekickError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = SidekickError> = std::result::Result<T, E>;
