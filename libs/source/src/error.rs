//! Source error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching or persisting issued IDs.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read or write an ID file.
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to connect to the database.
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    /// Failed to execute a query.
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    /// The configured table name is not a plain SQL identifier.
    #[error("invalid table name '{0}': expected [A-Za-z_][A-Za-z0-9_]* optionally schema-qualified")]
    InvalidTableName(String),
}

impl SourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if the error came from the database.
    pub fn is_database_error(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Query(_))
    }
}
