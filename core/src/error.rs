//! Error types for template parsing, schema probing, and type mapping.

use std::fmt;

use thiserror::Error;

use crate::template::ParamType;

/// Errors raised while parsing `${name:Type=default}` placeholders.
///
/// Every variant carries the byte offset of the placeholder's `$` in the
/// original SQL text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// `${` without a closing `}`.
    #[error("unterminated placeholder at byte {offset}")]
    Unterminated { offset: usize },

    /// Placeholder has no `:Type` part.
    #[error("placeholder '{name}' at byte {offset} has no declared type (expected ${{{name}:Type}})")]
    MissingType { name: String, offset: usize },

    /// Placeholder name is not an identifier.
    #[error("invalid placeholder name '{name}' at byte {offset}")]
    InvalidName { name: String, offset: usize },

    /// Declared type is not one of the supported scalar types.
    #[error("unknown type '{type_name}' for placeholder '{name}' at byte {offset}")]
    UnknownType {
        name: String,
        type_name: String,
        offset: usize,
    },

    /// Default literal does not parse as the declared type.
    #[error("default '{value}' of placeholder '{name}' at byte {offset} is not a valid {param_type}")]
    InvalidDefault {
        name: String,
        param_type: ParamType,
        value: String,
        offset: usize,
    },

    /// The same name is declared again with a different type.
    #[error("placeholder '{name}' at byte {offset} is declared as {second} but was {first} earlier")]
    ConflictingParamType {
        name: String,
        first: ParamType,
        second: ParamType,
        offset: usize,
    },

    /// The same name is declared again with a different default.
    #[error("placeholder '{name}' at byte {offset} has default '{second}' but was '{first}' earlier")]
    ConflictingDefault {
        name: String,
        first: String,
        second: String,
        offset: usize,
    },
}

/// Failure reported by a database collaborator.
///
/// Wraps the driver's own error so callers can inspect it through
/// [`std::error::Error::source`].
pub struct DriverError(Box<dyn std::error::Error + Send + Sync>);

impl DriverError {
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(err))
    }

    /// Builds an error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self(message.into().into())
    }
}

impl fmt::Debug for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.0.as_ref())
    }
}

/// Errors that stop code generation for one SQL file.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// The SQL template could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Connecting, running the zero-row probe, or reading metadata failed.
    #[error("schema probe failed: {0}")]
    SchemaProbe(#[source] DriverError),

    /// A column's database type has no entry in the type mapping table.
    #[error("unsupported database type {sql_type} for column '{column}'")]
    UnsupportedType { column: String, sql_type: String },

    /// A column's access kind has no reader operation (maps, unresolved arrays).
    #[error("column '{column}' of kind {access_kind} has no reader operation")]
    UnsupportedColumn { column: String, access_kind: String },
}

/// Convenience alias for results with [`CodegenError`].
pub type Result<T> = std::result::Result<T, CodegenError>;
