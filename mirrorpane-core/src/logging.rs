//! Logging infrastructure for the UI process
//!
//! Logs are written to `~/.local/state/mirrorpane/mirrorpane.log` following
//! XDG standards, with daily rotation. Rotated files beyond
//! `logging.max_files` are pruned at startup.

use crate::config::{Config, LoggingConfig};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Initialize the logging system
///
/// Sets up tracing with:
/// - File output to the XDG state directory, rotated daily
/// - Pruning of rotated files beyond `max_files`
/// - Level from config, overridable via RUST_LOG
pub fn init(config: &LoggingConfig) -> crate::error::Result<LoggingGuard> {
    let log_dir = Config::state_dir();

    std::fs::create_dir_all(&log_dir)?;
    prune_rotated_logs(&log_dir, config.max_files);

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "mirrorpane.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();

    tracing::info!(
        log_dir = %log_dir.display(),
        level = %config.level,
        "Logging initialized"
    );

    Ok(LoggingGuard { _guard: guard })
}

/// Initialize logging for tests (logs to stdout)
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .with_span_events(FmtSpan::CLOSE)
        .try_init();
}

/// Remove the oldest rotated log files, keeping at most `max_files`.
///
/// Daily rotation names files `mirrorpane.log.YYYY-MM-DD`, so lexicographic
/// order is chronological order.
fn prune_rotated_logs(log_dir: &Path, max_files: usize) {
    let Ok(entries) = std::fs::read_dir(log_dir) else {
        return;
    };

    let mut rotated: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("mirrorpane.log."))
        })
        .collect();

    if rotated.len() <= max_files {
        return;
    }

    rotated.sort();
    for stale in &rotated[..rotated.len() - max_files] {
        if let Err(error) = std::fs::remove_file(stale) {
            tracing::warn!(path = %stale.display(), %error, "failed to prune old log file");
        }
    }
}

/// Guard that keeps the logging system alive
///
/// When dropped, flushes any pending log writes.
pub struct LoggingGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Returns the log file path
pub fn log_file_path() -> PathBuf {
    Config::log_path()
}
