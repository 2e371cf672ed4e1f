//! SQLite connection factory and probe connection.
//!
//! Two database sources are supported:
//!
//! - an existing database file, opened read-only;
//! - an in-memory database primed by an init script, for probing against
//!   a schema without a populated database (CI, tests).
//!
//! # Example
//!
//! ```
//! use sqlgen_core::{SqlType, probe};
//! use sqlgen_sqlite::SqliteConnectionFactory;
//!
//! let factory = SqliteConnectionFactory::in_memory(
//!     "CREATE TABLE prices (symbol VARCHAR(8) NOT NULL, open DOUBLE, volume BIGINT);",
//! );
//! let schema = probe(&factory, "select symbol, open, volume from prices").unwrap();
//! assert_eq!(schema.columns()[0].sql_type, SqlType::VarChar);
//! assert_eq!(schema.columns()[2].sql_type, SqlType::BigInt);
//! ```

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use sqlgen_core::{ColumnInfo, ConnectionFactory, DriverError, ProbeConnection};
use tracing::debug;

use crate::decltype::parse_declared_type;
use crate::error::{Result, SqliteError};

/// How result-column nullability is reported.
///
/// SQLite reports nullability only through the column a result traces
/// back to. Outer joins can still yield NULL from a `NOT NULL` column;
/// use [`Nullability::Nullable`] for those queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Nullability {
    /// Follow the origin column's `NOT NULL` constraint. Columns without an
    /// origin table column are reported non-null.
    #[default]
    Declared,
    /// Every column is reported nullable; generated fields use `Option<T>`.
    Nullable,
    /// Every column is reported non-null; generated fields use plain types.
    NotNull,
}

/// Where probe connections come from.
#[derive(Debug, Clone)]
pub enum DatabaseSource {
    /// An existing database file, opened read-only.
    File(PathBuf),
    /// A fresh in-memory database per connection, primed with this script.
    Memory { init_sql: String },
}

/// Opens one SQLite connection per probe.
#[derive(Debug, Clone)]
pub struct SqliteConnectionFactory {
    source: DatabaseSource,
    nullability: Nullability,
}

impl SqliteConnectionFactory {
    /// Probes against an existing database file.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            source: DatabaseSource::File(path.into()),
            nullability: Nullability::default(),
        }
    }

    /// Probes against an in-memory database created by `init_sql`.
    pub fn in_memory(init_sql: impl Into<String>) -> Self {
        Self {
            source: DatabaseSource::Memory {
                init_sql: init_sql.into(),
            },
            nullability: Nullability::default(),
        }
    }

    /// Probes against an in-memory database created by the script at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::InitScript`] if the script cannot be read.
    pub fn in_memory_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let init_sql = std::fs::read_to_string(path).map_err(|source| SqliteError::InitScript {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::in_memory(init_sql))
    }

    /// Sets the nullability policy.
    pub fn with_nullability(mut self, nullability: Nullability) -> Self {
        self.nullability = nullability;
        self
    }

    pub fn source(&self) -> &DatabaseSource {
        &self.source
    }

    /// Opens a connection without going through the probe trait.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::DatabaseError`] if the file cannot be opened
    /// or the init script fails.
    pub fn open_connection(&self) -> Result<SqliteProbeConnection> {
        let conn = match &self.source {
            DatabaseSource::File(path) => {
                debug!(path = %path.display(), "opening sqlite database read-only");
                Connection::open_with_flags(
                    path,
                    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
                )?
            }
            DatabaseSource::Memory { init_sql } => {
                let conn = Connection::open_in_memory()?;
                conn.execute_batch(init_sql)?;
                conn
            }
        };
        Ok(SqliteProbeConnection {
            conn,
            nullability: self.nullability,
        })
    }
}

impl ConnectionFactory for SqliteConnectionFactory {
    type Connection = SqliteProbeConnection;

    fn connect(&self) -> std::result::Result<Self::Connection, DriverError> {
        self.open_connection().map_err(DriverError::from)
    }
}

/// An open SQLite connection used for a single probe.
///
/// Closed when dropped.
#[derive(Debug)]
pub struct SqliteProbeConnection {
    conn: Connection,
    nullability: Nullability,
}

impl SqliteProbeConnection {
    /// Prepares and runs `sql`, returning its result columns.
    ///
    /// The statement is stepped to completion so errors SQLite raises only
    /// at execution time are reported here too.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::DatabaseError`] if SQLite rejects the query.
    pub fn describe_columns(&self, sql: &str) -> Result<Vec<ColumnInfo>> {
        let mut stmt = self.conn.prepare(sql)?;
        let origins = stmt.columns_with_metadata();
        let mut columns = Vec::with_capacity(origins.len());
        for (column, origin) in stmt.columns().iter().zip(&origins) {
            let nullable =
                self.is_nullable(origin.database_name(), origin.table_name(), origin.origin_name())?;
            columns.push(ColumnInfo {
                name: column.name().to_string(),
                sql_type: column.decl_type().map(parse_declared_type),
                nullable,
            });
        }
        drop(origins);

        let mut rows = stmt.query([])?;
        while rows.next()?.is_some() {}

        Ok(columns)
    }

    /// Applies the nullability policy to one result column.
    fn is_nullable(
        &self,
        database: Option<&str>,
        table: Option<&str>,
        column: Option<&str>,
    ) -> Result<bool> {
        match self.nullability {
            Nullability::Nullable => Ok(true),
            Nullability::NotNull => Ok(false),
            Nullability::Declared => {
                let (Some(table), Some(column)) = (table, column) else {
                    return Ok(false);
                };
                let (_, _, not_null, _, _) =
                    self.conn.column_metadata(database, table, column)?;
                debug!(table, column, not_null, "origin column metadata");
                Ok(!not_null)
            }
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl ProbeConnection for SqliteProbeConnection {
    fn describe(&mut self, sql: &str) -> std::result::Result<Vec<ColumnInfo>, DriverError> {
        self.describe_columns(sql).map_err(DriverError::from)
    }
}

#[cfg(test)]
mod tests {
    use sqlgen_core::{CodegenError, SqlType, probe};

    use super::*;

    const SCHEMA: &str = "
        CREATE TABLE prices (
            symbol VARCHAR(16) NOT NULL,
            time INTEGER NOT NULL,
            open DOUBLE,
            volume BIGINT,
            type TEXT,
            tags TEXT ARRAY,
            attrs MAP,
            raw BLOB
        );";

    #[test]
    fn test_probe_reports_declared_types() {
        let factory = SqliteConnectionFactory::in_memory(SCHEMA);
        let schema = probe(&factory, "select symbol, open, volume from prices where time > 0").unwrap();
        let types: Vec<&SqlType> = schema.columns().iter().map(|c| &c.sql_type).collect();
        assert_eq!(types, vec![&SqlType::VarChar, &SqlType::Double, &SqlType::BigInt]);
    }

    #[test]
    fn test_declared_nullability_follows_origin_column() {
        let factory = SqliteConnectionFactory::in_memory(SCHEMA);
        let schema = probe(&factory, "select symbol, open, time, volume from prices").unwrap();
        let flags: Vec<bool> = schema.columns().iter().map(|c| c.nullable).collect();
        assert_eq!(flags, vec![false, true, false, true]);
    }

    #[test]
    fn test_declared_nullability_through_view_and_alias() {
        let factory = SqliteConnectionFactory::in_memory(format!(
            "{SCHEMA} CREATE VIEW quotes AS SELECT symbol AS ticker, open AS price FROM prices;"
        ));
        let schema = probe(&factory, "select q.ticker, q.price from quotes q").unwrap();
        assert!(!schema.columns()[0].nullable);
        assert!(schema.columns()[1].nullable);
    }

    #[test]
    fn test_not_null_policy() {
        let factory =
            SqliteConnectionFactory::in_memory(SCHEMA).with_nullability(Nullability::NotNull);
        let schema = probe(&factory, "select open, volume from prices").unwrap();
        assert!(schema.columns().iter().all(|c| !c.nullable));
    }

    #[test]
    fn test_nullable_policy() {
        let factory =
            SqliteConnectionFactory::in_memory(SCHEMA).with_nullability(Nullability::Nullable);
        let schema = probe(&factory, "select symbol from prices").unwrap();
        assert!(schema.columns()[0].nullable);
    }

    #[test]
    fn test_reserved_column_name() {
        let factory = SqliteConnectionFactory::in_memory(SCHEMA);
        let schema = probe(&factory, "select type from prices").unwrap();
        assert_eq!(schema.columns()[0].qualified_name, "r#type");
    }

    #[test]
    fn test_array_and_map_columns() {
        let factory = SqliteConnectionFactory::in_memory(SCHEMA);
        let schema = probe(&factory, "select tags, attrs from prices").unwrap();
        assert_eq!(schema.columns()[0].element_type, SqlType::LongVarChar);
        assert_eq!(schema.columns()[1].sql_type, SqlType::Map);
    }

    #[test]
    fn test_expression_column_without_type() {
        let factory = SqliteConnectionFactory::in_memory(SCHEMA);
        let err = probe(&factory, "select count(*) as n from prices").unwrap_err();
        assert!(matches!(err, CodegenError::UnsupportedType { ref column, .. } if column == "n"));
    }

    #[test]
    fn test_cast_column_has_no_declared_type() {
        let factory = SqliteConnectionFactory::in_memory(SCHEMA);
        let err = probe(&factory, "select cast(open as BIGINT) as whole from prices").unwrap_err();
        assert!(matches!(err, CodegenError::UnsupportedType { ref column, .. } if column == "whole"));
    }

    #[test]
    fn test_blob_column_is_unsupported() {
        let factory = SqliteConnectionFactory::in_memory(SCHEMA);
        let err = probe(&factory, "select raw from prices").unwrap_err();
        assert!(err.to_string().contains("BLOB"));
    }

    #[test]
    fn test_missing_table_is_probe_error() {
        let factory = SqliteConnectionFactory::in_memory(SCHEMA);
        let err = probe(&factory, "select * from missing").unwrap_err();
        assert!(matches!(err, CodegenError::SchemaProbe(_)));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_file_database_is_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.db");
        Connection::open(&path).unwrap().execute_batch(SCHEMA).unwrap();

        let factory = SqliteConnectionFactory::open(&path);
        let conn = factory.open_connection().unwrap();
        assert!(conn.connection().execute_batch("DELETE FROM prices").is_err());
        assert_eq!(probe(&factory, "select symbol from prices").unwrap().len(), 1);
    }

    #[test]
    fn test_init_script_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.sql");
        std::fs::write(&path, SCHEMA).unwrap();
        let factory = SqliteConnectionFactory::in_memory_from_file(&path).unwrap();
        assert!(probe(&factory, "select * from prices").is_err());
        assert!(probe(&factory, "select symbol, time from prices").is_ok());

        let missing = SqliteConnectionFactory::in_memory_from_file(dir.path().join("nope.sql"));
        assert!(matches!(missing, Err(SqliteError::InitScript { .. })));
    }
}
