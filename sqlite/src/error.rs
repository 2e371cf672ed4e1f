//! Error types for the SQLite probe backend.

use thiserror::Error;

/// Errors that can occur while opening or probing a SQLite database.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite rejected the statement or the connection.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// The init script could not be read.
    #[error("failed to read init script '{path}': {source}")]
    InitScript {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<SqliteError> for sqlgen_core::DriverError {
    fn from(err: SqliteError) -> Self {
        sqlgen_core::DriverError::new(err)
    }
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
