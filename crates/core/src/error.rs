//! Error types for schema and load operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for warehouse operations.
pub type DwhResult<T> = Result<T, DwhError>;

/// Errors that can occur while configuring, connecting to, or running
/// statements against the warehouse.
#[derive(Error, Debug)]
pub enum DwhError {
    /// Configuration file is missing a section or key, or holds an unusable value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("Failed to parse config {path}: {message}")]
    ConfigParse {
        /// File that failed to parse
        path: PathBuf,
        /// Parser diagnostic
        message: String,
    },

    /// IO error while reading configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Warehouse unreachable or rejected the session
    #[error("Failed to connect to warehouse at {endpoint}: {source}")]
    Connection {
        /// host:port/database being connected to
        endpoint: String,
        /// Driver error
        #[source]
        source: sqlx::Error,
    },

    /// A statement in the run failed; the remaining sequence was not executed
    #[error("Statement '{label}' failed: {source}")]
    Statement {
        /// Label of the statement, usually the table it targets
        label: String,
        /// Driver error
        #[source]
        source: sqlx::Error,
    },

    /// Transaction control (BEGIN/COMMIT) failed
    #[error("Transaction error: {0}")]
    Transaction(#[source] sqlx::Error),

    /// The session could not be closed cleanly
    #[error("Failed to close warehouse session at {endpoint}: {source}")]
    Close {
        /// host:port/database of the session
        endpoint: String,
        /// Driver error
        #[source]
        source: sqlx::Error,
    },
}

impl DwhError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Label of the failing statement, if this error came from one.
    pub fn statement_label(&self) -> Option<&str> {
        match self {
            Self::Statement { label, .. } => Some(label),
            _ => None,
        }
    }
}
