use std::env;
use std::io;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber, writing to stderr so dry-run output on
/// stdout stays clean.
///
/// `RUST_LOG` selects the filter, `JSON_LOG=true` switches to JSON lines.
/// Keep the returned guard alive until exit so buffered lines get flushed.
pub fn setup_logger() -> Option<WorkerGuard> {
    let json = env::var("JSON_LOG").is_ok_and(|s| s.parse().unwrap_or_default());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (non_blocking, guard) = tracing_appender::non_blocking(io::stderr());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    match result {
        Ok(()) => Some(guard),
        Err(e) => {
            eprintln!("global tracing subscriber already set: {}", e);
            None
        }
    }
}
