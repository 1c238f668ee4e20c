use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{Result, SidekickError};

/// Run `command_line` after `target` has been written.
///
/// The line is split on whitespace; with no arguments the target path is
/// passed as the only one. The command is killed once `timeout` elapses.
pub async fn run_hook(command_line: &str, target: &Path, timeout: Duration) -> Result<()> {
    let failure = |reason: String| SidekickError::HookFailure {
        command: command_line.to_string(),
        reason,
    };

    let mut parts = command_line.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| failure("empty command".to_string()))?;
    let mut args: Vec<OsString> = parts.map(OsString::from).collect();
    if args.is_empty() {
        args.push(target.as_os_str().to_owned());
    }

    tracing::debug!(command = %command_line, file = %target.display(), "executing the command");

    let mut child = Command::new(program)
        .args(&args)
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| failure(format!("failed to start: {}", e)))?;

    tokio::select! {
        status = child.wait() => {
            let status = status.map_err(|e| failure(format!("failed to wait: {}", e)))?;
            if status.success() {
                Ok(())
            } else {
                Err(failure(format!("exited with {}", status)))
            }
        }
        _ = tokio::time::sleep(timeout) => {
            if let Err(e) = child.kill().await {
                tracing::error!(pid = ?child.id(), error = %e, "failed to kill the command");
            }
            Err(failure(format!("killed after exceeding the {:?} timeout", timeout)))
        }
    }
}
