//! Logging initialization for the configmap command.

use anyhow::Result;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

/// Initialize the tracing subscriber.
///
/// # Log Levels
///
/// Console output goes to stderr and defaults to WARN so that stdout only
/// carries resolved values. Override with `RUST_LOG`:
///
/// ```sh
/// # Show resolution decisions made by the map
/// RUST_LOG=configmap_core=trace configmap env PORT --fallback 8080
/// ```
///
/// # Arguments
///
/// * `log_dir` - Optional directory for a daily rotated log file
///
/// # Returns
///
/// The file writer guard, which must be kept alive until exit so buffered
/// lines are flushed.
///
/// # Errors
///
/// Returns an error if:
/// - Log directory cannot be created
/// - Subscriber cannot be set as global default
pub fn init_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // Configure environment filter (default: WARN)
    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .from_env_lossy();

    // Console output on stderr, keeping stdout for values
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .event_format(fmt::format().compact());

    // Optional file appender (daily rotation, non-blocking)
    let (file, guard) = match log_dir {
        Some(dir) => {
            // Create log file directory
            std::fs::create_dir_all(dir)?;
            let (writer, guard) = non_blocking(rolling::daily(dir, "configmap.log"));
            let layer = fmt::layer()
                .with_writer(writer)
                .event_format(fmt::format().with_ansi(false).with_target(false));
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };

    // Configure subscriber
    let subscriber = Registry::default().with(env_filter).with(console).with(file);

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(guard)
}
