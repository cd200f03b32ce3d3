//! Loader configuration
//!
//! ```toml
//! [datadump]
//! author = "/data/ol_dump_authors.txt"
//! works = "/data/ol_dump_works.txt"
//!
//! [output]
//! dir = "./store"
//!
//! [import]
//! max_recorded_issues = 100
//! progress_interval = 100000
//! deferred_resolution = true
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Dump file locations
    #[serde(default)]
    pub datadump: DumpLocations,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DumpLocations {
    pub author: Option<PathBuf>,
    pub works: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory holding `authors.jsonl` and `books.jsonl`
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Issues kept in a summary; counts stay exact past this limit
    #[serde(default = "default_max_recorded_issues")]
    pub max_recorded_issues: usize,

    /// Log progress every N lines (0 disables)
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Re-resolve placeholder author names once both dumps are loaded
    #[serde(default = "default_true")]
    pub deferred_resolution: bool,
}

/// Log severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("store")
}

fn default_max_recorded_issues() -> usize {
    100
}

fn default_progress_interval() -> usize {
    100_000
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            dir: default_output_dir(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        ImportConfig {
            max_recorded_issues: default_max_recorded_issues(),
            progress_interval: default_progress_interval(),
            deferred_resolution: true,
        }
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn as_tracing(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LoaderConfig {
    /// Load and validate configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Check every field, reporting all problems at once
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if self.datadump.author.is_none() && self.datadump.works.is_none() {
            errors.push("at least one of datadump.author or datadump.works must be set".to_string());
        }
        for (name, path) in [
            ("datadump.author", &self.datadump.author),
            ("datadump.works", &self.datadump.works),
        ] {
            if matches!(path, Some(p) if p.as_os_str().is_empty()) {
                errors.push(format!("{} must not be empty", name));
            }
        }
        if self.output.dir.as_os_str().is_empty() {
            errors.push("output.dir must not be empty".to_string());
        }

        if !errors.is_empty() {
            bail!("Invalid configuration:\n  - {}", errors.join("\n  - "));
        }
        Ok(())
    }
}
