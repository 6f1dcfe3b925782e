use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::log_path;

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber.
///
/// Every event passing `RUST_LOG` (default `info`) is appended as JSON to
/// `<data_dir>/update-monitor.log`; warnings and errors are also printed to
/// stderr. The returned guard flushes the file writer when dropped.
pub fn init_logging(data_dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(data_dir)?;

    let path = log_path(data_dir);
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid log path: {:?}", path))?;
    let file_appender = tracing_appender::rolling::never(data_dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json().with_writer(file_writer))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(LevelFilter::WARN),
        )
        .try_init()?;

    Ok(guard)
}
