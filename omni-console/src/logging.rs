use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_DIR_VAR: &str = "OMNI_LOG_DIR";
const DEFAULT_LEVEL: &str = "info";

/// `--debug` wins over RUST_LOG, which wins over the default level.
pub fn filter_directive(debug: bool, rust_log: Option<&str>) -> String {
    if debug {
        return "debug".to_string();
    }
    rust_log
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_LEVEL)
        .to_string()
}

pub fn log_dir(value: Option<String>) -> Option<String> {
    value.filter(|dir| !dir.trim().is_empty())
}

/// Logs go to stderr, or to a daily file when OMNI_LOG_DIR is set.
/// The returned guard must live until exit so buffered lines are flushed.
pub fn init(debug: bool) -> Option<WorkerGuard> {
    let directive = filter_directive(debug, std::env::var("RUST_LOG").ok().as_deref());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    let (file_layer, guard) = match log_dir(std::env::var(LOG_DIR_VAR).ok()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "omni-console.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };
    let stderr_layer = file_layer
        .is_none()
        .then(|| fmt::layer().with_writer(std::io::stderr).with_target(false));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}
