//! Schema discovery through a zero-row probe query.
//!
//! The probe wraps the populated query in an outer `SELECT` bounded to zero
//! rows, so the database plans the query and resolves its column types
//! without fetching data. The connection is opened for the probe and
//! dropped when it returns, on success and failure alike.

use tracing::debug;

use crate::error::{CodegenError, DriverError, Result};
use crate::types::{ColumnInfo, Schema};

/// An open database connection able to describe a query's result columns.
pub trait ProbeConnection {
    /// Runs `sql` and reports its result columns in order.
    fn describe(&mut self, sql: &str) -> std::result::Result<Vec<ColumnInfo>, DriverError>;

    /// Builds the zero-row wrapper for this dialect.
    fn zero_rows(&self, sql: &str) -> String {
        limit_zero(sql)
    }
}

/// Opens probe connections. Shared across worker threads.
pub trait ConnectionFactory: Sync {
    type Connection: ProbeConnection;

    fn connect(&self) -> std::result::Result<Self::Connection, DriverError>;
}

/// Default zero-row wrapper: `SELECT * FROM (<sql>) LIMIT 0`.
///
/// Trailing whitespace and semicolons are removed first. The inner query
/// sits on its own lines so a trailing `--` comment cannot swallow the
/// closing parenthesis.
///
/// ```
/// use sqlgen_core::limit_zero;
///
/// assert_eq!(limit_zero("select 1;\n"), "SELECT * FROM (\nselect 1\n) LIMIT 0");
/// ```
pub fn limit_zero(sql: &str) -> String {
    let inner = sql.trim_end_matches(|ch: char| ch.is_whitespace() || ch == ';');
    format!("SELECT * FROM (\n{inner}\n) LIMIT 0")
}

/// Discovers the result schema of `populated_sql`.
///
/// # Errors
///
/// Returns [`CodegenError::SchemaProbe`] when connecting or running the
/// probe fails, and [`CodegenError::UnsupportedType`] when a column type
/// has no mapping. No partial schema is ever returned.
pub fn probe<F: ConnectionFactory>(factory: &F, populated_sql: &str) -> Result<Schema> {
    let mut conn = factory.connect().map_err(CodegenError::SchemaProbe)?;
    let sql = conn.zero_rows(populated_sql);
    debug!(sql = %sql, "probing result schema");

    let columns = conn.describe(&sql).map_err(CodegenError::SchemaProbe)?;
    drop(conn);

    debug!(columns = columns.len(), "probe returned column metadata");
    Schema::from_columns(columns)
}
