use std::path::PathBuf;
use thiserror::Error;

/// How the import driver treats an error raised while processing a dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Stops the import of the current dump
    Fatal,
    /// The line is skipped, the import continues
    Skip,
    /// The record is not persisted, the import continues
    RecordFailed,
}

/// Errors produced while loading a dump
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read dump {path:?}{}: {source}", line_suffix(.line))]
    FileAccess {
        path: PathBuf,
        line: Option<usize>,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("required field `{field}` is missing")]
    MissingField { field: String },

    #[error("invalid date {value:?} in `{field}`: {source}")]
    InvalidDate {
        field: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LoadError {
    pub fn missing(field: impl Into<String>) -> Self {
        LoadError::MissingField { field: field.into() }
    }

    pub fn severity(&self) -> Severity {
        match self {
            LoadError::FileAccess { .. } => Severity::Fatal,
            LoadError::Parse { .. } => Severity::Skip,
            LoadError::MissingField { .. }
            | LoadError::InvalidDate { .. }
            | LoadError::Store(_) => Severity::RecordFailed,
        }
    }
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(n) => format!(" at line {}", n),
        None => String::new(),
    }
}

/// Errors raised by storage adapters
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store entry at {path:?} line {line} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize entity {id}: {source}")]
    Serialize {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}
