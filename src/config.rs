//! Configuration management with TOML file support.
//!
//! Merges settings from three sources (highest precedence first):
//! 1. CLI flags
//! 2. Config file (`~/.config/lograft/config.toml` or `$XDG_CONFIG_HOME/lograft/config.toml`)
//! 3. Built-in defaults
//!
//! ```toml
//! format = "json"
//! level = "warn"
//! strict = false
//! on_no_match = "skip"
//!
//! [pattern]
//! expression = '\[%{NOTSPACE:thread}\] %{LOGLEVEL:level} %{GREEDYDATA:message}'
//!
//! [pattern.definitions]
//! LOGLEVEL = "(?:INFO|WARN|ERROR)"
//!
//! [metadata]
//! host_key = "ip"
//! app_id_key = "app_id"
//!
//! [labels]
//! env = "prod"
//! ```

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::chain::{Handler, HandlerChain};
use crate::cli::{Cli, ColorMode, LogFormat, OutputFormat};
use crate::envelope::MetadataKeys;
use crate::error::LograftError;
use crate::handlers::{JsonOutput, MinLevel, StaticLabels, TextOutput};
use crate::level::Severity;
use crate::pattern::{CapturePattern, LOG4J_EXPRESSION};
use crate::pipeline::{NoMatchPolicy, Pipeline};
use crate::record::RecordBuilder;

/// Runtime configuration merged from defaults, config file, and CLI arguments.
///
/// Use [`Config::from_cli`] to build from parsed CLI arguments, or
/// [`Config::default`] for built-in defaults (useful in tests and benchmarks).
#[derive(Debug, Clone)]
pub struct Config {
    /// Color output mode (auto/always/never).
    pub color_mode: ColorMode,
    /// Record output format.
    pub format: OutputFormat,
    /// Minimum severity to output.
    pub min_level: Option<Severity>,
    /// Grok expression applied to each line.
    pub pattern: String,
    /// Extra grok definitions, overriding built-ins of the same name.
    pub definitions: HashMap<String, String>,
    /// Reject records with missing captures.
    pub strict: bool,
    pub on_no_match: NoMatchPolicy,
    /// Keys read from the envelope's metadata mapping.
    pub metadata_keys: MetadataKeys,
    /// Labels attached to every record.
    pub labels: BTreeMap<String, String>,
    /// `tracing` filter directive for diagnostics.
    pub log_filter: String,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::Auto,
            format: OutputFormat::Text,
            min_level: None,
            pattern: LOG4J_EXPRESSION.to_string(),
            definitions: HashMap::new(),
            strict: false,
            on_no_match: NoMatchPolicy::Degraded,
            metadata_keys: MetadataKeys::default(),
            labels: BTreeMap::new(),
            log_filter: "warn".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Build a [`Config`] from CLI arguments, loading the config file if present.
    ///
    /// Merge precedence: CLI flags > config file > defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, LograftError> {
        let mut config = Self::default();

        let config_path = cli.config.clone().unwrap_or_else(Self::default_config_path);

        if config_path.exists() {
            let file_config = FileConfig::load(&config_path)?;
            config.apply_file_config(file_config);
        } else if cli.config.is_some() {
            return Err(LograftError::Config(format!(
                "config file {} does not exist",
                config_path.display()
            )));
        }

        // CLI overrides
        config.color_mode = cli.color;

        if let Some(format) = cli.format {
            config.format = format;
        }
        if cli.level.is_some() {
            config.min_level = cli.level;
        }
        if let Some(ref pattern) = cli.pattern {
            config.pattern.clone_from(pattern);
        }
        if cli.strict {
            config.strict = true;
        }
        if let Some(policy) = cli.on_no_match {
            config.on_no_match = policy;
        }
        for (key, value) in &cli.labels {
            config.labels.insert(key.clone(), value.clone());
        }

        if cli.verbose {
            config.log_filter = "debug".to_string();
        } else if let Some(ref filter) = cli.log_filter {
            config.log_filter.clone_from(filter);
        }
        if let Some(format) = cli.log_format {
            config.log_format = format;
        }

        Ok(config)
    }

    /// Default config file path: `$XDG_CONFIG_HOME/lograft/config.toml` or `~/.config/lograft/config.toml`.
    fn default_config_path() -> PathBuf {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(xdg).join("lograft").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("lograft")
                .join("config.toml")
        } else {
            PathBuf::from(".config/lograft/config.toml")
        }
    }

    /// Apply settings from a parsed config file.
    fn apply_file_config(&mut self, file: FileConfig) {
        if let Some(color) = file.color {
            self.color_mode = match color.as_str() {
                "always" => ColorMode::Always,
                "never" => ColorMode::Never,
                _ => ColorMode::Auto,
            };
        }

        if let Some(format) = file.format {
            self.format = format;
        }

        if let Some(level) = file.level {
            self.min_level = Severity::from_token(&level);
        }

        if let Some(strict) = file.strict {
            self.strict = strict;
        }

        if let Some(policy) = file.on_no_match {
            self.on_no_match = policy;
        }

        if let Some(pattern) = file.pattern {
            if let Some(expression) = pattern.expression {
                self.pattern = expression;
            }
            self.definitions.extend(pattern.definitions);
        }

        if let Some(metadata) = file.metadata {
            if let Some(host) = metadata.host_key {
                self.metadata_keys.host = host;
            }
            if let Some(app_id) = metadata.app_id_key {
                self.metadata_keys.app_id = app_id;
            }
        }

        self.labels.extend(file.labels);

        if let Some(filter) = file.log_filter {
            self.log_filter = filter;
        }
        if let Some(format) = file.log_format {
            self.log_format = format;
        }
    }

    /// Compile the configured pattern.
    pub fn capture_pattern(&self) -> Result<CapturePattern, LograftError> {
        CapturePattern::compile_with(&self.pattern, &self.definitions)
    }

    /// Assemble the pipeline: label enrichment (if any labels are
    /// configured) followed by the output handler writing to `out`.
    pub fn pipeline<W: Write + Send + 'static>(
        &self,
        out: W,
        use_color: bool,
    ) -> Result<Pipeline, LograftError> {
        let chain = match self.format {
            OutputFormat::Text => self.chain_with(TextOutput::new(out, use_color)),
            OutputFormat::Json => self.chain_with(JsonOutput::new(out)),
        };

        Ok(Pipeline::new(chain)
            .with_pattern(self.capture_pattern()?)
            .with_builder(RecordBuilder::new(self.strict))
            .with_metadata_keys(self.metadata_keys.clone())
            .with_no_match_policy(self.on_no_match))
    }

    fn chain_with<H: Handler + 'static>(&self, output: H) -> HandlerChain {
        let mut chain = HandlerChain::builder();
        if !self.labels.is_empty() {
            chain = chain.with(StaticLabels::new(self.labels.clone()));
        }
        match self.min_level {
            Some(min) => chain.with(MinLevel::new(min, output)),
            None => chain.with(output),
        }
        .build()
    }
}

/// Config file structure (TOML deserialization).
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    color: Option<String>,
    format: Option<OutputFormat>,
    level: Option<String>,
    strict: Option<bool>,
    on_no_match: Option<NoMatchPolicy>,
    pattern: Option<PatternConfig>,
    metadata: Option<MetadataConfig>,
    #[serde(default)]
    labels: BTreeMap<String, String>,
    log_filter: Option<String>,
    log_format: Option<LogFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct PatternConfig {
    expression: Option<String>,
    #[serde(default)]
    definitions: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct MetadataConfig {
    host_key: Option<String>,
    app_id_key: Option<String>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self, LograftError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LograftError::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}
