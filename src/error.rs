//! Error types surfaced to callers.
//!
//! Only failures that abort a request live here. Column-level problems are
//! diagnostics (see `domain::diagnostics`).

use std::time::Duration;
use thiserror::Error;

/// Table metadata could not be obtained.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("table '{table}' does not exist or has no visible columns ({dialect})")]
    TableNotFound { dialect: &'static str, table: String },

    #[error("catalog query for table '{table}' failed ({dialect}): {source}")]
    Catalog {
        dialect: &'static str,
        table: String,
        #[source]
        source: sqlx::Error,
    },
}

/// A compiled statement failed to execute.
#[derive(Debug, Error)]
#[error("query on table '{table}' failed ({dialect}): {source}")]
pub struct ExecutionError {
    pub dialect: &'static str,
    pub table: String,
    #[source]
    pub source: sqlx::Error,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("query on table '{table}' timed out after {after:?} ({dialect})")]
    Timeout {
        dialect: &'static str,
        table: String,
        after: Duration,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {name} has invalid value '{value}': {reason}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to read views file {path}: {source}")]
    ViewsFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid views file {path}: {source}")]
    ViewsFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid view '{view}': {reason}")]
    InvalidView { view: String, reason: String },
}
