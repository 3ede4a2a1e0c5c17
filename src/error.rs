//! Error types for `lograft`.
//!
//! Uses [`thiserror`] for ergonomic error derivation.

use thiserror::Error;

/// Error raised by a [`Handler`](crate::chain::Handler).
///
/// Boxed so that handler implementations can surface whatever error type
/// their own dependencies produce.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur in `lograft`.
///
/// The binary maps [`Config`](Self::Config), [`Pattern`](Self::Pattern) and
/// [`Toml`](Self::Toml) to exit 1 and [`Io`](Self::Io) to exit 2. Errors for
/// which [`is_per_message`](Self::is_per_message) holds are logged and never
/// terminate the process.
#[derive(Debug, Error)]
pub enum LograftError {
    /// The inbound document is not a usable envelope (not JSON, not an
    /// object, or missing the `message` string).
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The capture pattern did not match the raw line.
    #[error("line does not match pattern: {line:?}")]
    NoMatch { line: String },

    /// Strict mode: a required capture did not participate in the match.
    #[error("required capture `{0}` is missing")]
    MissingCapture(&'static str),

    /// A handler failed; the remaining handlers were not invoked.
    #[error("handler #{index} ({handler}) failed: {source}")]
    Handler {
        index: usize,
        handler: String,
        #[source]
        source: HandlerError,
    },

    /// The capture pattern could not be compiled.
    #[error("pattern error: {0}")]
    Pattern(String),

    /// Configuration error (invalid flag combination, unreadable config file).
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML deserialization error.
    #[error("config file error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl LograftError {
    /// Whether this error concerns a single message rather than the process.
    pub const fn is_per_message(&self) -> bool {
        matches!(
            self,
            Self::MalformedEnvelope(_)
                | Self::NoMatch { .. }
                | Self::MissingCapture(_)
                | Self::Handler { .. }
        )
    }
}
