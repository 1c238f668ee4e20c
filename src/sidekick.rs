// src/sidekick.rs

use std::sync::Arc;

use vault_client::auth::provider_for;
use vault_client::{AuthOptions, Logical, VaultClient};

use crate::config::load_auth_options;
use crate::error::{Result, SidekickError};
use crate::options::RunOptions;
use crate::payload::{SecretPayload, from_store};
use crate::render::ResourceRenderer;
use crate::resource::{ResourceKind, SecretResource};

/// Fetch the secret backing `resource` from the store.
///
/// Only `secret` resources get the KV version 2 envelope removed; every
/// other kind, `raw` included, returns the data as the store sent it.
pub async fn fetch_payload(store: &dyn Logical, resource: &SecretResource) -> Result<SecretPayload> {
    let path = resource.store_path();
    let secret = if resource.is_issued() {
        store.write(&path, resource.params_json()).await?
    } else {
        Some(store.read(&path).await?)
    };

    let data = secret
        .and_then(|s| s.data)
        .ok_or_else(|| SidekickError::MalformedSecret {
            format: "store",
            reason: format!("no data returned for {}", path),
        })?;

    Ok(from_store(data, resource.kind == ResourceKind::Secret))
}

/// Auth options from the configured file, or just the fallback method
fn auth_options(options: &RunOptions) -> Result<AuthOptions> {
    match options.auth_file {
        Some(ref file) => load_auth_options(file, options.auth_format),
        None => Ok(AuthOptions {
            method: options.auth_method,
            ..Default::default()
        }),
    }
}

/// Log in once and render every configured resource.
///
/// A failing resource does not stop the others; the run reports how many failed.
pub async fn run_once(options: Arc<RunOptions>) -> Result<()> {
    run_once_with(options.clone(), ResourceRenderer::new(options)).await
}

pub async fn run_once_with(options: Arc<RunOptions>, renderer: ResourceRenderer) -> Result<()> {
    let auth = auth_options(&options)?;
    let vault_addr = auth
        .vault_addr
        .clone()
        .or_else(|| options.vault_addr.clone())
        .ok_or_else(|| SidekickError::MissingConfiguration("vault address not set".into()))?;

    let login_client: Arc<dyn Logical> = Arc::new(VaultClient::new(vault_addr.as_str()));
    let token = provider_for(auth.method, login_client).login(&auth).await?;
    tracing::info!(method = %auth.method, vault = %vault_addr, "authenticated to vault");

    let client = VaultClient::new(vault_addr).with_token(token);

    let total = options.resources.len();
    let mut failed = 0;
    for resource in &options.resources {
        let result = match fetch_payload(&client, resource).await {
            Ok(payload) => renderer.process(resource, &payload).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => tracing::info!(resource = %resource, file = %renderer.destination(resource).display(), "resource rendered"),
            Err(e) => {
                tracing::error!(resource = %resource, error = %e, "failed to process resource");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(SidekickError::Incomplete { failed, total });
    }
    Ok(())
}
