//! Structured log records and the builder that assembles them.
//!
//! A [`LogRecord`] combines the pattern captures of one line with the
//! routing metadata of its envelope. Host and application id follow a
//! two-tier precedence decided once per message:
//!
//! - the envelope carries a metadata mapping: both values come from it,
//!   even when one of its keys is missing;
//! - otherwise: the shipper hostname and [`NOT_PROVIDED`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::envelope::Envelope;
use crate::error::LograftError;
use crate::level::Severity;
use crate::pattern::{self, Captures};

/// Application id used when the envelope carries no metadata mapping.
pub const NOT_PROVIDED: &str = "NOT_PROVIDED";

/// Captures that strict mode requires.
const REQUIRED_CAPTURES: [&str; 4] = [
    pattern::TIMESTAMP,
    pattern::LEVEL,
    pattern::LOCATION,
    pattern::MESSAGE,
];

/// The normalized unit passed through a [`HandlerChain`](crate::chain::HandlerChain).
///
/// Every field is always populated; missing values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    /// Level token as written in the line (e.g. `INFO`).
    pub level: String,
    pub message: String,
    /// Timestamp as written in the line; never parsed.
    pub timestamp: String,
    /// Originating code location, e.g. `pkg.Cls.method(503)`.
    pub location: String,
    pub host: String,
    pub app_id: String,
    pub thread: String,
    /// Enrichment added by handlers.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl LogRecord {
    /// Severity of [`level`](Self::level), if the token is recognized.
    pub fn severity(&self) -> Option<Severity> {
        Severity::from_token(&self.level)
    }
}

/// Maps captures and envelope metadata into a [`LogRecord`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordBuilder {
    /// Reject records whose required captures are missing instead of
    /// filling them with empty strings.
    pub strict: bool,
}

impl RecordBuilder {
    pub const fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// Build the record for one message.
    ///
    /// Never fails unless [`strict`](Self::strict) is set.
    pub fn build(&self, captures: &Captures, envelope: &Envelope) -> Result<LogRecord, LograftError> {
        if self.strict
            && let Some(missing) = REQUIRED_CAPTURES
                .into_iter()
                .find(|name| !captures.contains_key(*name))
        {
            return Err(LograftError::MissingCapture(missing));
        }

        let capture = |name: &str| captures.get(name).cloned().unwrap_or_default();

        let (host, app_id) = match envelope.metadata() {
            Some(metadata) => (
                metadata.host.clone().unwrap_or_default(),
                metadata.app_id.clone().unwrap_or_default(),
            ),
            None => (envelope.fallback_host().to_string(), NOT_PROVIDED.to_string()),
        };

        Ok(LogRecord {
            level: capture(pattern::LEVEL),
            message: capture(pattern::MESSAGE),
            timestamp: capture(pattern::TIMESTAMP),
            location: capture(pattern::LOCATION),
            host,
            app_id,
            thread: capture(pattern::THREAD),
            labels: BTreeMap::new(),
        })
    }
}
