//! Severity of a captured level token.
//!
//! Records keep the level exactly as it appeared in the line; this module
//! maps the token onto an ordered [`Severity`] for threshold filtering and
//! colored display. Matching is case-insensitive and accepts the aliases
//! emitted by log4j, logback, java.util.logging and syslog.

use std::fmt;

use owo_colors::Style;

/// Canonical severity, ordered ascending for `>=` filtering via [`Ord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Severity {
    /// 5-character display badge, right-justified (e.g., `" INFO"`, `"ERROR"`).
    #[allow(clippy::trivially_copy_pass_by_ref)] // &self required since OwoColorize has conflicting trait methods
    pub const fn badge(&self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => " INFO",
            Self::Warn => " WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }

    /// The blank badge (5 spaces) used when the token is not recognized.
    pub const fn blank_badge() -> &'static str {
        "     "
    }

    /// Badge style when colors are enabled.
    #[allow(clippy::trivially_copy_pass_by_ref)] // &self required since OwoColorize has conflicting trait methods
    pub const fn style(&self) -> Style {
        match self {
            Self::Trace => Style::new().cyan().bold(),
            Self::Debug => Style::new().blue().bold(),
            Self::Info => Style::new().green().bold(),
            Self::Warn => Style::new().yellow().bold(),
            Self::Error => Style::new().red().bold(),
            Self::Fatal => Style::new().magenta().bold(),
        }
    }

    /// Parse a level token, case-insensitive and ignoring surrounding
    /// whitespace. Returns `None` for unrecognized tokens.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "trace" | "trc" | "finest" | "finer" => Some(Self::Trace),
            "debug" | "dbg" | "fine" | "config" => Some(Self::Debug),
            "info" | "inf" | "information" | "notice" => Some(Self::Info),
            "warn" | "warning" | "wrn" | "war" => Some(Self::Warn),
            "error" | "err" | "erro" | "severe" => Some(Self::Error),
            "fatal" | "critical" | "crit" | "alert" | "emerg" | "emergency" => Some(Self::Fatal),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.badge().trim_start())
    }
}
