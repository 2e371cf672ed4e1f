//! Error types for code emission and build orchestration.
//!
//! Every variant that concerns one SQL file carries that file's path, so a
//! failed run is locatable from the error message alone.

use std::path::PathBuf;

use sqlgen_core::CodegenError;
use thiserror::Error;

/// Errors that can occur while generating accessors.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Filesystem failure on a source or output path.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Parsing, probing, or emission failed for one SQL file.
    #[error("{}: {source}", path.display())]
    Codegen {
        path: PathBuf,
        #[source]
        source: CodegenError,
    },

    /// The file's base name is not a valid Rust identifier.
    #[error("{}: file name is not a valid identifier", path.display())]
    InvalidFileName { path: PathBuf },

    /// Configuration or identity file could not be parsed or written.
    #[error("invalid configuration '{}': {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// The worker pool could not be started.
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl GenerateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenerateError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn codegen(path: impl Into<PathBuf>, source: impl Into<CodegenError>) -> Self {
        GenerateError::Codegen {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn config(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        GenerateError::Config {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Path of the file the error concerns, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            GenerateError::Io { path, .. }
            | GenerateError::Codegen { path, .. }
            | GenerateError::InvalidFileName { path }
            | GenerateError::Config { path, .. } => Some(path),
            GenerateError::Pool(_) => None,
        }
    }
}

/// Convenience alias for results with [`GenerateError`].
pub type Result<T> = std::result::Result<T, GenerateError>;
