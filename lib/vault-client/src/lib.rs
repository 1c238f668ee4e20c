//! vault-client - minimal HashiCorp Vault client used by the sidekick
//!
//! Exposes the logical read/write surface of the store and the
//! authentication providers that turn [`AuthOptions`] into a client token:
//! 1. `token` → pre-issued token (options or VAULT_TOKEN)
//! 2. `userpass` / `approle` → login with static credentials
//! 3. `kubernetes` → login with the pod's service account JWT

pub mod auth;
mod client;
mod env;
mod error;
mod models;

pub use auth::{AuthMethod, AuthOptions, AuthProvider};
pub use client::{Logical, VaultClient};
pub use env::get_env;
pub use error::VaultError;
pub use models::{Secret, SecretAuth};
