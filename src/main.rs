use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use vault_sidekick::options::{DEFAULT_OUTPUT_DIR, RunOptions};
use vault_sidekick::{AuthFileFormat, SecretResource, logging, run_once};
use vault_client::AuthMethod;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Retrieve secrets from Vault and write them to disk
#[derive(Debug, Parser)]
#[command(name = "vault-sidekick", version)]
struct Cli {
    /// Vault address, overridden by the auth file's vaultAddr
    #[arg(long = "vault", env = "VAULT_ADDR")]
    vault_addr: Option<String>,

    /// Directory relative output files are written to
    #[arg(long, env = "VAULT_OUTPUT", default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Print the rendered content instead of writing files
    #[arg(long)]
    dryrun: bool,

    /// Seconds a post-write command may run before it is killed
    #[arg(long, default_value_t = 60)]
    exec_timeout: u64,

    /// File holding the authentication options (json or yaml)
    #[arg(long = "auth", env = "AUTH_FILE")]
    auth_file: Option<PathBuf>,

    /// Layout of the auth file: default or kubernetes-vault
    #[arg(long, default_value = "default")]
    format: AuthFileFormat,

    /// Authentication method used when no auth file is given
    #[arg(long, env = "VAULT_AUTH_METHOD", default_value = "token")]
    auth_method: AuthMethod,

    /// Resource to retrieve: kind:path[:fmt=..,file=..,mode=..,exec=..,tpl=..]
    #[arg(long = "cn", required = true)]
    resources: Vec<String>,
}

impl Cli {
    fn into_options(self) -> Result<RunOptions> {
        let resources = self
            .resources
            .iter()
            .map(|spec| spec.parse::<SecretResource>())
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(RunOptions {
            vault_addr: self.vault_addr,
            output_dir: self.output,
            dry_run: self.dryrun,
            exec_timeout: Duration::from_secs(self.exec_timeout),
            auth_file: self.auth_file,
            auth_format: self.format,
            auth_method: self.auth_method,
            resources,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = logging::setup_logger();

    let options = Arc::new(Cli::parse().into_options()?);
    tracing::debug!(resources = options.resources.len(), dry_run = options.dry_run, "starting");

    if let Err(e) = run_once(options).await {
        tracing::error!(error = %e, "run failed");
        return Err(e.into());
    }
    Ok(())
}
