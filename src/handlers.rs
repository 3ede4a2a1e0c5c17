//! Reference handlers used by the `lograft` binary.
//!
//! - [`TextOutput`]: human-readable line, optionally colorized
//! - [`JsonOutput`]: one JSON object per record
//! - [`MinLevel`]: forwards to an inner handler only at or above a severity
//! - [`StaticLabels`]: adds fixed labels to every record

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

use crate::chain::Handler;
use crate::error::HandlerError;
use crate::level::Severity;
use crate::record::LogRecord;

/// Minimum width for label key alignment (right-justified).
const KEY_MIN_WIDTH: usize = 25;

/// Render a record as human-readable text:
///
/// ```text
/// 2018-07-07 10:31:12,138  INFO: [H1/NOT_PROVIDED] pkg.Cls.method(503) Refreshing ctx
///                      team: core
/// ```
pub fn render_text(record: &LogRecord, use_color: bool, out: &mut String) {
    if !record.timestamp.is_empty() {
        if use_color {
            let _ = write!(out, "{}  ", record.timestamp.bold());
        } else {
            out.push_str(&record.timestamp);
            out.push_str("  ");
        }
    }

    match record.severity() {
        Some(severity) => {
            let badge = severity.badge();
            if use_color {
                let _ = write!(out, "{}:", badge.style(severity.style()));
            } else {
                out.push_str(badge);
                out.push(':');
            }
        }
        None => {
            out.push_str(Severity::blank_badge());
            out.push(':');
        }
    }

    let origin = format!("[{}/{}]", record.host, record.app_id);
    if use_color {
        let _ = write!(out, " {}", origin.cyan());
    } else {
        out.push(' ');
        out.push_str(&origin);
    }

    if !record.location.is_empty() {
        if use_color {
            let _ = write!(out, " {}", record.location.dimmed());
        } else {
            out.push(' ');
            out.push_str(&record.location);
        }
    }

    if !record.message.is_empty() {
        out.push(' ');
        out.push_str(&record.message);
    }

    for (key, value) in &record.labels {
        if use_color {
            let _ = write!(
                out,
                "\n{}: {value}",
                format!("{key:>KEY_MIN_WIDTH$}")
                    .truecolor(150, 150, 150)
                    .bold(),
            );
        } else {
            let _ = write!(out, "\n{key:>KEY_MIN_WIDTH$}: {value}");
        }
    }
}

/// Writes each record as text to `W`.
pub struct TextOutput<W> {
    writer: Mutex<W>,
    use_color: bool,
}

impl<W: Write + Send> TextOutput<W> {
    pub fn new(writer: W, use_color: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            use_color,
        }
    }

    /// Consume the handler and return the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Handler for TextOutput<W> {
    fn handle(&self, record: &mut LogRecord) -> Result<(), HandlerError> {
        let mut line = String::with_capacity(128);
        render_text(record, self.use_color, &mut line);
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{line}")?;
        Ok(())
    }

    fn name(&self) -> &str {
        "text-output"
    }

    fn flush(&self) -> Result<(), HandlerError> {
        self.writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()?;
        Ok(())
    }
}

/// Writes each record as one JSON object per line to `W`.
pub struct JsonOutput<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonOutput<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Handler for JsonOutput<W> {
    fn handle(&self, record: &mut LogRecord) -> Result<(), HandlerError> {
        let json = serde_json::to_string(record)?;
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{json}")?;
        Ok(())
    }

    fn name(&self) -> &str {
        "json-output"
    }

    fn flush(&self) -> Result<(), HandlerError> {
        self.writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()?;
        Ok(())
    }
}

/// Forwards records at or above `min` to the inner handler.
///
/// Records whose level token is not a recognized severity are forwarded.
pub struct MinLevel<H> {
    min: Severity,
    inner: H,
}

impl<H: Handler> MinLevel<H> {
    pub const fn new(min: Severity, inner: H) -> Self {
        Self { min, inner }
    }
}

impl<H: Handler> Handler for MinLevel<H> {
    fn handle(&self, record: &mut LogRecord) -> Result<(), HandlerError> {
        match record.severity() {
            Some(severity) if severity < self.min => Ok(()),
            _ => self.inner.handle(record),
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn flush(&self) -> Result<(), HandlerError> {
        self.inner.flush()
    }
}

/// Inserts fixed labels into every record, keeping labels already set.
#[derive(Debug, Clone, Default)]
pub struct StaticLabels {
    labels: BTreeMap<String, String>,
}

impl StaticLabels {
    pub const fn new(labels: BTreeMap<String, String>) -> Self {
        Self { labels }
    }
}

impl Handler for StaticLabels {
    fn handle(&self, record: &mut LogRecord) -> Result<(), HandlerError> {
        for (key, value) in &self.labels {
            record
                .labels
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "static-labels"
    }
}
