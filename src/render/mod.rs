// src/render/mod.rs

mod encode;

pub use encode::{Artifact, encode};

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::AsyncWriteExt;

use crate::error::{Result, SidekickError};
use crate::hook::run_hook;
use crate::options::RunOptions;
use crate::payload::SecretPayload;
use crate::resource::{OutputFormat, SecretResource};

/// Writes rendered secrets to disk, or to the dry-run output
pub struct ResourceRenderer {
    options: Arc<RunOptions>,
    dry_run_output: Mutex<Box<dyn Write + Send>>,
}

impl ResourceRenderer {
    pub fn new(options: Arc<RunOptions>) -> Self {
        Self::with_output(options, Box::new(io::stdout()))
    }

    /// Renderer whose dry-run content goes to `output` instead of stdout
    pub fn with_output(options: Arc<RunOptions>, output: Box<dyn Write + Send>) -> Self {
        Self {
            options,
            dry_run_output: Mutex::new(output),
        }
    }

    /// Destination of `resource`, relative names land in the output directory
    pub fn destination(&self, resource: &SecretResource) -> PathBuf {
        let filename = Path::new(&resource.filename);
        if filename.is_absolute() {
            filename.to_path_buf()
        } else {
            self.options.output_dir.join(filename)
        }
    }

    /// Render `payload` for `resource` and run its post-write command.
    ///
    /// An unknown format fails before anything is touched. A command failure
    /// is reported even though the files were written. The command also runs
    /// in dry-run, with the would-be destination as its default argument.
    pub async fn process(&self, resource: &SecretResource, payload: &SecretPayload) -> Result<()> {
        let target = self.destination(resource);
        let format = OutputFormat::parse(&resource.format)?;

        let artifacts = encode(format, &target, resource, payload)?;
        for artifact in &artifacts {
            self.write_file(&artifact.path, &artifact.content, resource.file_mode)
                .await?;
        }

        if let Some(command) = resource.exec.as_deref().filter(|c| !c.trim().is_empty()) {
            run_hook(command, &target, self.options.exec_timeout).await?;
        }

        Ok(())
    }

    async fn write_file(&self, path: &Path, content: &[u8], mode: u32) -> Result<()> {
        if self.options.dry_run {
            tracing::info!(filename = %path.display(), "dry-run: writing content to stdout");
            return self
                .emit_dry_run(path, content)
                .map_err(|e| SidekickError::io(path, e));
        }

        tracing::debug!(filename = %path.display(), mode = %format!("{:o}", mode), "saving the file");

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SidekickError::io(parent, e))?;
        }

        write_with_mode(path, content, mode)
            .await
            .map_err(|e| SidekickError::io(path, e))
    }

    fn emit_dry_run(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        let mut output = self
            .dry_run_output
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        writeln!(output, "[dry-run] filename: {}", path.display())?;
        output.write_all(content)?;
        writeln!(output)?;
        output.flush()
    }
}

#[cfg(unix)]
async fn write_with_mode(path: &Path, content: &[u8], mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)
        .await?;
    file.write_all(content).await?;
    file.flush().await?;

    // mode only applies on creation
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await
}

#[cfg(not(unix))]
async fn write_with_mode(path: &Path, content: &[u8], _mode: u32) -> io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(content).await?;
    file.flush().await
}
