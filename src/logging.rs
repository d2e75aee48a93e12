//! Process-wide logging setup
//!
//! Two stages:
//! - [`bootstrap_logging`] installs a stdout-only subscriber for the current
//!   thread while configuration is loaded, before any run folder exists
//! - [`init_logging`] installs the global subscriber: stdout plus, once the
//!   run folder exists, a non-blocking writer for its `crawler.log`
//!
//! Verbosity follows the `-v`/`-q` ladder unless `RUST_LOG` is set.

use std::fs::OpenOptions;
use std::path::Path;
use thiserror::Error;
use tracing::subscriber::DefaultGuard;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Errors from installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to open log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to install logger: {0}")]
    Init(#[from] TryInitError),
}

/// Keeps the run log writer alive; dropping it flushes the file
#[must_use = "dropping the guard stops writing the run log"]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Filter directives for a verbosity level
pub fn filter_directives(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "gallery_sweep=info,warn",
        1 => "gallery_sweep=debug,info",
        2 => "gallery_sweep=trace,debug",
        _ => "trace",
    }
}

fn build_filter(verbose: u8, quiet: bool) -> EnvFilter {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
    }
    EnvFilter::new(filter_directives(verbose, quiet))
}

fn stdout_layer<S>(verbose: u8, quiet: bool) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_filter(build_filter(verbose, quiet))
}

/// Installs a stdout-only subscriber for the current thread
///
/// Used until the run folder exists, so configuration errors are logged
/// without creating any files.
pub fn bootstrap_logging(verbose: u8, quiet: bool) -> DefaultGuard {
    let subscriber = tracing_subscriber::registry().with(stdout_layer(verbose, quiet));
    tracing::subscriber::set_default(subscriber)
}

/// Installs the global subscriber
///
/// # Arguments
///
/// * `verbose` - Number of `-v` flags
/// * `quiet` - Only errors on stdout
/// * `log_file` - Run log to append to; it keeps at least `info` even when
///   stdout is quiet
pub fn init_logging(
    verbose: u8,
    quiet: bool,
    log_file: Option<&Path>,
) -> Result<LoggingGuard, LoggingError> {
    let (file_layer, file_guard) = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_filter(build_filter(verbose, false));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stdout_layer(verbose, quiet))
        .with(file_layer)
        .try_init()?;

    if let Some(path) = log_file {
        tracing::debug!("Run log: {}", path.display());
    }

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
