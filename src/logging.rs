//! Diagnostic logging setup.
//!
//! Records go to stdout; diagnostics go to stderr through a
//! `tracing-subscriber` registry filtered by [`EnvFilter`]. `RUST_LOG`, when
//! set, takes precedence over the configured filter.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::LogFormat;
use crate::error::LograftError;

/// Initialize the global tracing subscriber.
///
/// Must be called at most once per process.
pub fn init_tracing(filter: &str, format: LogFormat) -> Result<(), LograftError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(env_filter) => env_filter,
        Err(_) => EnvFilter::try_new(filter)
            .map_err(|e| LograftError::Config(format!("invalid log filter '{filter}': {e}")))?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(std::io::stderr().is_terminal()),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| LograftError::Config(format!("failed to initialize tracing subscriber: {e}")))
}
