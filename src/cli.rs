//! Command-line argument definitions for `lograft`.
//!
//! Uses [`clap`] derive macros for argument parsing.

use clap::{Parser, ValueEnum};
use serde::Deserialize;

use crate::level::Severity;
use crate::pipeline::NoMatchPolicy;

/// Extract structured records from shipped log lines.
///
/// Reads log-shipper envelopes (one JSON document per line) from stdin,
/// extracts fields from each `message` with a grok-style pattern and writes
/// the resulting records to stdout. Diagnostics go to stderr.
#[derive(Debug, Parser)]
#[command(name = "lograft", version, about, long_about = None)]
pub struct Cli {
    /// Control color output.
    ///
    /// `auto` enables colors only when stdout is a TTY and `NO_COLOR` is unset.
    #[arg(short = 'c', long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Output format for records.
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Minimum severity level to output.
    ///
    /// Records with an unrecognized level token always pass.
    #[arg(short = 'l', long, value_parser = parse_level_arg)]
    pub level: Option<Severity>,

    /// Grok expression applied to each line (default: log4j layout).
    #[arg(short = 'p', long)]
    pub pattern: Option<String>,

    /// Reject lines whose timestamp, level, location or message was not captured.
    #[arg(long)]
    pub strict: bool,

    /// What to do with lines the pattern does not match.
    #[arg(long, value_enum)]
    pub on_no_match: Option<NoMatchPolicy>,

    /// Extra label attached to every record (repeatable).
    #[arg(short = 'L', long = "label", value_name = "KEY=VALUE", value_parser = parse_label_arg)]
    pub labels: Vec<(String, String)>,

    /// Path to configuration file.
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,

    /// Diagnostic log filter (`tracing` directive syntax, e.g. `lograft=debug`).
    ///
    /// `RUST_LOG` takes precedence when set.
    #[arg(long)]
    pub log_filter: Option<String>,

    /// Diagnostic log format.
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Shorthand for `--log-filter=debug`.
    #[arg(short = 'v', long, conflicts_with = "log_filter")]
    pub verbose: bool,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Enable colors only when stdout is a TTY.
    Auto,
    /// Always enable colors.
    Always,
    /// Never enable colors.
    Never,
}

/// Record output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One human-readable line per record.
    #[default]
    Text,
    /// One JSON object per record.
    Json,
}

/// Diagnostic log format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Parse level argument as a case-insensitive severity token.
fn parse_level_arg(s: &str) -> Result<Severity, String> {
    Severity::from_token(s).ok_or_else(|| {
        format!("invalid level '{s}': expected one of trace, debug, info, warn, error, fatal")
    })
}

/// Parse a `KEY=VALUE` label.
fn parse_label_arg(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("invalid label '{s}': expected KEY=VALUE")),
    }
}
