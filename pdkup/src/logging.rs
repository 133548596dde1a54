//! Logging infrastructure for pdkup.
//!
//! Provides structured logging with file output and stderr output:
//! - Writes to `<log_dir>/pdkup.log`
//! - Also prints to stderr so command output on stdout stays parseable
//! - Configurable via the RUST_LOG environment variable

use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Log file name inside the log directory.
const LOG_FILE: &str = "pdkup.log";

/// Environment variable overriding the log directory.
pub const LOG_DIR_ENV: &str = "PDKUP_LOGS";

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard flushes and closes the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Default log directory: `PDKUP_LOGS` or `<default root>/logs`.
pub fn default_log_dir() -> PathBuf {
    env::var_os(LOG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| crate::store::PdkRoot::default_path().join("logs"))
}

/// Initialize the logging system.
///
/// Creates the log directory if needed and sets up dual output to the log
/// file and stderr. The default level is `info`; `RUST_LOG` overrides it.
pub fn init_logging(log_dir: &PathBuf) -> Result<LoggingGuard, io::Error> {
    fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(false);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .without_time();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
