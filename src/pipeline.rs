//! One worker's view of the extraction-and-dispatch pipeline.
//!
//! [`Pipeline::process`] takes one inbound message through
//! envelope unwrap → pattern match → record build → handler chain.
//! All state is read-only, so a single pipeline can be shared (e.g. in an
//! [`Arc`]) by as many workers as the consumption layer runs.

use std::sync::Arc;

use serde::Deserialize;

use crate::chain::HandlerChain;
use crate::envelope::{Envelope, MetadataKeys};
use crate::error::LograftError;
use crate::pattern::{CapturePattern, Captures};
use crate::record::{LogRecord, RecordBuilder};

/// What to do with a line the pattern does not match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NoMatchPolicy {
    /// Dispatch a record whose extracted fields are empty.
    #[default]
    Degraded,
    /// Do not dispatch anything for the line.
    Skip,
}

/// Result of processing one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The record went through the whole chain.
    Dispatched(LogRecord),
    /// The line did not match and [`NoMatchPolicy::Skip`] is active.
    Skipped,
}

/// Unwrap, extract, build and dispatch.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pattern: Arc<CapturePattern>,
    builder: RecordBuilder,
    keys: MetadataKeys,
    on_no_match: NoMatchPolicy,
    chain: Arc<HandlerChain>,
}

impl Pipeline {
    /// A pipeline with the log4j pattern, lenient building, default
    /// metadata keys and degraded no-match handling.
    pub fn new(chain: HandlerChain) -> Self {
        Self {
            pattern: Arc::new(CapturePattern::log4j()),
            builder: RecordBuilder::default(),
            keys: MetadataKeys::default(),
            on_no_match: NoMatchPolicy::default(),
            chain: Arc::new(chain),
        }
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: CapturePattern) -> Self {
        self.pattern = Arc::new(pattern);
        self
    }

    #[must_use]
    pub fn with_builder(mut self, builder: RecordBuilder) -> Self {
        self.builder = builder;
        self
    }

    #[must_use]
    pub fn with_metadata_keys(mut self, keys: MetadataKeys) -> Self {
        self.keys = keys;
        self
    }

    #[must_use]
    pub const fn with_no_match_policy(mut self, policy: NoMatchPolicy) -> Self {
        self.on_no_match = policy;
        self
    }

    pub fn chain(&self) -> &HandlerChain {
        &self.chain
    }

    /// Flush buffered handler output; call once the input is exhausted.
    pub fn flush(&self) -> Result<(), LograftError> {
        self.chain.flush()
    }

    /// Process one raw transport message.
    ///
    /// Returns the record as the last handler left it. Errors belong to this
    /// message only; the pipeline stays usable for the next one.
    pub fn process(&self, raw: &[u8]) -> Result<Outcome, LograftError> {
        let envelope = Envelope::unwrap(raw, &self.keys)?;

        let captures = match self.pattern.match_line(envelope.raw_line()) {
            Ok(captures) => captures,
            Err(_) => match self.on_no_match {
                NoMatchPolicy::Skip => {
                    tracing::debug!(
                        source = envelope.source(),
                        offset = envelope.offset(),
                        "line does not match pattern, skipping"
                    );
                    return Ok(Outcome::Skipped);
                }
                NoMatchPolicy::Degraded if self.builder.strict => {
                    return Err(LograftError::NoMatch {
                        line: envelope.raw_line().to_string(),
                    });
                }
                NoMatchPolicy::Degraded => {
                    tracing::debug!(
                        source = envelope.source(),
                        offset = envelope.offset(),
                        "line does not match pattern, dispatching degraded record"
                    );
                    Captures::new()
                }
            },
        };

        let mut record = self.builder.build(&captures, &envelope)?;

        self.chain.handle(&mut record)?;
        tracing::trace!(level = %record.level, host = %record.host, "record dispatched");
        Ok(Outcome::Dispatched(record))
    }
}
