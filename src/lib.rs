//! vault-sidekick - materializes secrets from Vault onto the local filesystem
//!
//! Authenticates with one of the [`vault_client`] providers, fetches each
//! configured resource and renders it in the requested format, optionally
//! running a command once the file is in place.

pub mod config;
pub mod error;
pub mod hook;
pub mod logging;
pub mod options;
pub mod payload;
pub mod render;
pub mod resource;
pub mod sidekick;
pub mod utils;

pub use config::load_auth_options;
pub use error::{Result, SidekickError};
pub use hook::run_hook;
pub use options::{AuthFileFormat, RunOptions};
pub use payload::{SecretPayload, SecretValue};
pub use render::ResourceRenderer;
pub use resource::{OutputFormat, ResourceKind, SecretResource};
pub use sidekick::{fetch_payload, run_once};
