use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Secret not found: {path}")]
    SecretNotFound { path: String },

    #[error("Vault client error ({status}): {message}")]
    ClientError { status: u16, message: String },

    #[error("Vault request error: {0}")]
    RequestError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
