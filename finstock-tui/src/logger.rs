use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
        .unwrap_or_else(fallback_log_dir)
        .join("finstock")
        .join("logs")
}

fn fallback_log_dir() -> PathBuf {
    std::env::temp_dir()
}

/// File logging only; the terminal belongs to the dashboard. `$FINSTOCK_LOG`
/// overrides the configured filter. Keep the guard alive until exit.
pub fn init(default_filter: &str) -> anyhow::Result<WorkerGuard> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let primary = default_log_dir();
    let log_dir = if std::fs::create_dir_all(&primary).is_ok() {
        primary
    } else {
        let fallback = fallback_log_dir().join("finstock").join("logs");
        std::fs::create_dir_all(&fallback)?;
        fallback
    };

    let writer = RollingFileAppender::builder()
        .filename_prefix("finstock")
        .filename_suffix("log")
        .max_log_files(5)
        .rotation(Rotation::DAILY)
        .build(&log_dir)?;
    let (writer, guard) = tracing_appender::non_blocking(writer);

    let file_line = cfg!(debug_assertions);
    let layer = fmt::layer()
        .with_ansi(false)
        .with_thread_ids(true)
        .with_file(file_line)
        .with_line_number(file_line)
        .with_writer(writer);

    let directives = std::env::var("FINSTOCK_LOG").unwrap_or_else(|_| default_filter.to_string());
    let filter = tracing_subscriber::EnvFilter::try_new(&directives)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::registry().with(layer.with_filter(filter)).init();
    tracing::debug!(dir = %log_dir.display(), "logging initialised");
    Ok(guard)
}
