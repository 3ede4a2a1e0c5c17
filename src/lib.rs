//! `lograft` — extract structured records from shipped log lines.
//!
//! Log shippers such as Filebeat deliver each application log line inside a
//! JSON envelope. This library unwraps the envelope, extracts fields from
//! the line with a grok-style [`CapturePattern`], builds a [`LogRecord`]
//! and passes it through an ordered [`HandlerChain`].
//!
//! # Example
//!
//! ```
//! use lograft::{HandlerChain, HandlerError, LogRecord, Outcome, Pipeline};
//!
//! let chain = HandlerChain::builder()
//!     .with(|record: &mut LogRecord| -> Result<(), HandlerError> {
//!         record.labels.insert("team".into(), "core".into());
//!         Ok(())
//!     })
//!     .build();
//! let pipeline = Pipeline::new(chain);
//!
//! let raw = br#"{"message":"[main] 2018-07-07 10:31:12,138 INFO  [pkg.Cls.method(503)] Refreshing ctx","beat":{"hostname":"H1"}}"#;
//! let Outcome::Dispatched(record) = pipeline.process(raw).unwrap() else { unreachable!() };
//! assert_eq!(record.level, "INFO");
//! assert_eq!(record.host, "H1");
//! assert_eq!(record.app_id, "NOT_PROVIDED");
//! assert_eq!(record.labels["team"], "core");
//! ```

pub mod chain;
pub mod cli;
pub mod config;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod level;
pub mod logging;
pub mod pattern;
pub mod pipeline;
pub mod record;

// Re-export primary API types for convenience.
pub use chain::{Handler, HandlerChain, Named};
pub use config::Config;
pub use envelope::{Envelope, Metadata, MetadataKeys};
pub use error::{HandlerError, LograftError};
pub use level::Severity;
pub use pattern::{CapturePattern, Captures, NoMatch};
pub use pipeline::{NoMatchPolicy, Outcome, Pipeline};
pub use record::{LogRecord, NOT_PROVIDED, RecordBuilder};
