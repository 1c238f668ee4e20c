use std::io;
use std::path::Path;
use std::time::Duration;

use rand::Rng;

pub use vault_client::get_env;

/// Checks whether `path` exists; errors other than "not found" are returned
pub fn file_exists(path: &Path) -> io::Result<bool> {
    match std::fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Random whole-second duration in `[min, max)`.
///
/// When `max <= min` the spread collapses to one second, so the result is `min`.
pub fn jittered_duration(min: u64, max: u64) -> Duration {
    let spread = if max > min { max - min } else { 1 };
    let offset = rand::rng().random_range(0..spread);
    Duration::from_secs(min + offset)
}
