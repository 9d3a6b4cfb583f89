//! Runtime configuration
//!
//! Defaults, then environment overrides, then command-line flags.

use serde::{Deserialize, Serialize};
use ssi_engine::EngineConfig;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

/// Trace output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Log files or directories of logs; empty reads stdin
    pub inputs: Vec<PathBuf>,
    pub format: OutputFormat,
    /// `tracing` filter directive
    pub log: String,
    /// Include serialization graph edges in the text trace
    pub verbose: bool,
    pub engine: EngineConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            format: OutputFormat::Text,
            log: "warn".to_string(),
            verbose: false,
            engine: EngineConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Apply `SSI_SITES`, `SSI_VARIABLES`, `SSI_FORMAT` and `SSI_LOG`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("SSI_SITES") {
            match raw.parse() {
                Ok(count) => self.engine.site_count = count,
                Err(_) => warn!(value = %raw, "SSI_SITES must be a positive integer"),
            }
        }
        if let Some(raw) = lookup("SSI_VARIABLES") {
            match raw.parse() {
                Ok(count) => self.engine.variable_count = count,
                Err(_) => warn!(value = %raw, "SSI_VARIABLES must be a positive integer"),
            }
        }
        if let Some(raw) = lookup("SSI_FORMAT") {
            match raw.parse() {
                Ok(format) => self.format = format,
                Err(e) => warn!(error = %e, "Ignoring SSI_FORMAT"),
            }
        }
        if let Some(filter) = lookup("SSI_LOG") {
            self.log = filter;
        }
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }
}
