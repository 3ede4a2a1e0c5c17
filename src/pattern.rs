//! Grok-style capture patterns.
//!
//! A pattern is a regular expression that may reference named definitions
//! with `%{NAME}` (non-capturing) or `%{NAME:field}` (captured as `field`).
//! Definitions may themselves reference other definitions. The expression is
//! expanded and compiled once; the compiled [`CapturePattern`] is immutable
//! and can be shared across threads.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::error::LograftError;

/// Capture names produced by [`CapturePattern::log4j`].
pub const THREAD: &str = "thread";
pub const TIMESTAMP: &str = "timestamp";
pub const LEVEL: &str = "level";
pub const LOCATION: &str = "location";
pub const MESSAGE: &str = "message";

/// Expression for log4j's `[%t] %d %-5p [%c.%M(%L)] %m%n` layout.
pub const LOG4J_EXPRESSION: &str = r"\[%{NOTSPACE:thread}\]%{SPACE}%{TIMESTAMP_ISO8601:timestamp}%{SPACE}%{LOGLEVEL:level}%{SPACE}\[%{NOTSPACE:location}\]%{SPACE}%{ANYTHING:message}";

/// Maximum nesting of definition references.
const MAX_EXPANSION_DEPTH: usize = 16;

/// Built-in definitions, a subset of the standard grok pattern library.
pub const BUILTIN_DEFINITIONS: &[(&str, &str)] = &[
    ("NOTSPACE", r"\S+"),
    ("SPACE", r"\s*"),
    ("DATA", r".*?"),
    ("GREEDYDATA", r".*"),
    ("ANYTHING", r".*"),
    ("WORD", r"\b\w+\b"),
    ("INT", r"(?:[+-]?(?:[0-9]+))"),
    (
        "NUMBER",
        r"(?:[+-]?(?:(?:[0-9]+(?:\.[0-9]+)?)|(?:\.[0-9]+)))",
    ),
    ("YEAR", r"(?:\d\d){1,2}"),
    ("MONTHNUM", r"(?:0?[1-9]|1[0-2])"),
    ("MONTHDAY", r"(?:(?:0[1-9])|(?:[12][0-9])|(?:3[01])|[1-9])"),
    ("HOUR", r"(?:2[0123]|[01]?[0-9])"),
    ("MINUTE", r"(?:[0-5][0-9])"),
    ("SECOND", r"(?:(?:[0-5]?[0-9]|60)(?:[:.,][0-9]+)?)"),
    ("ISO8601_TIMEZONE", r"(?:Z|[+-]%{HOUR}(?::?%{MINUTE}))"),
    (
        "TIMESTAMP_ISO8601",
        r"%{YEAR}-%{MONTHNUM}-%{MONTHDAY}[T ]%{HOUR}:?%{MINUTE}(?::?%{SECOND})?%{ISO8601_TIMEZONE}?",
    ),
    (
        "LOGLEVEL",
        r"(?:[Aa]lert|ALERT|[Tt]race|TRACE|[Dd]ebug|DEBUG|[Nn]otice|NOTICE|[Ii]nfo|INFO|[Ww]arn?(?:ing)?|WARN?(?:ING)?|[Ee]rr?(?:or)?|ERR?(?:OR)?|[Cc]rit?(?:ical)?|CRIT?(?:ICAL)?|[Ff]atal|FATAL|[Ss]evere|SEVERE|EMERG(?:ENCY)?|[Ee]merg(?:ency)?)",
    ),
    (
        "JAVACLASS",
        r"(?:[a-zA-Z$_][a-zA-Z$_0-9]*\.)*[a-zA-Z$_][a-zA-Z$_0-9]*",
    ),
    (
        "IP",
        r"(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9]?[0-9])\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9]?[0-9])",
    ),
];

/// Matches `%{NAME}` and `%{NAME:field}` references.
static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%\{(?<name>\w+)(?::(?<field>\w+))?\}").expect("reference regex is valid")
});

/// Named substrings extracted from one line, keyed by capture name.
pub type Captures = BTreeMap<String, String>;

/// The pattern did not match the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("line does not match pattern")]
pub struct NoMatch;

/// A compiled grok-style pattern.
#[derive(Debug, Clone)]
pub struct CapturePattern {
    expression: String,
    regex: Regex,
    /// Capture names in declaration order.
    names: Vec<String>,
}

impl CapturePattern {
    /// Compile `expression` against the built-in definitions.
    pub fn compile(expression: &str) -> Result<Self, LograftError> {
        Self::compile_with(expression, &HashMap::new())
    }

    /// Compile `expression`, with `extra` definitions taking precedence over
    /// the built-in ones.
    pub fn compile_with(
        expression: &str,
        extra: &HashMap<String, String>,
    ) -> Result<Self, LograftError> {
        let mut definitions: HashMap<&str, &str> = BUILTIN_DEFINITIONS.iter().copied().collect();
        for (name, body) in extra {
            definitions.insert(name.as_str(), body.as_str());
        }

        let mut names = Vec::new();
        let expanded = expand(expression, &definitions, &mut names, 0)?;
        let regex = Regex::new(&expanded)
            .map_err(|e| LograftError::Pattern(format!("cannot compile {expression:?}: {e}")))?;

        tracing::debug!(captures = ?names, "compiled capture pattern");

        Ok(Self {
            expression: expression.to_string(),
            regex,
            names,
        })
    }

    /// The default log4j layout pattern.
    pub fn log4j() -> Self {
        static LOG4J: LazyLock<CapturePattern> = LazyLock::new(|| {
            CapturePattern::compile(LOG4J_EXPRESSION).expect("built-in log4j pattern compiles")
        });
        LOG4J.clone()
    }

    /// Apply the pattern to `line`.
    ///
    /// Names whose group did not participate in the match are left out of the
    /// returned map.
    pub fn match_line(&self, line: &str) -> Result<Captures, NoMatch> {
        let caps = self.regex.captures(line).ok_or(NoMatch)?;
        Ok(self
            .names
            .iter()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.clone(), m.as_str().to_string()))
            })
            .collect())
    }

    /// The unexpanded expression this pattern was compiled from.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Capture names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Recursively replace definition references with their regex bodies.
///
/// References carrying a field name become named groups, the others
/// non-capturing groups.
fn expand(
    expression: &str,
    definitions: &HashMap<&str, &str>,
    names: &mut Vec<String>,
    depth: usize,
) -> Result<String, LograftError> {
    if depth > MAX_EXPANSION_DEPTH {
        return Err(LograftError::Pattern(format!(
            "definitions nest deeper than {MAX_EXPANSION_DEPTH} levels (cyclic reference?)"
        )));
    }

    let mut out = String::with_capacity(expression.len());
    let mut last = 0;

    for caps in REFERENCE.captures_iter(expression) {
        let whole = caps.get(0).expect("group 0 always participates");
        out.push_str(&expression[last..whole.start()]);
        last = whole.end();

        let name = &caps["name"];
        let body = definitions
            .get(name)
            .ok_or_else(|| LograftError::Pattern(format!("unknown definition %{{{name}}}")))?;
        let inner = expand(body, definitions, names, depth + 1)?;

        match caps.name("field") {
            Some(field) => {
                let field = field.as_str();
                if names.iter().any(|n| n == field) {
                    return Err(LograftError::Pattern(format!(
                        "capture `{field}` is declared more than once"
                    )));
                }
                names.push(field.to_string());
                let _ = write!(out, "(?<{field}>{inner})");
            }
            None => {
                out.push_str("(?:");
                out.push_str(&inner);
                out.push(')');
            }
        }
    }

    out.push_str(&expression[last..]);
    Ok(out)
}
