//! SQLite schema probing backend for sqlgen.
//!
//! This crate implements the [`ConnectionFactory`](sqlgen_core::ConnectionFactory)
//! and [`ProbeConnection`](sqlgen_core::ProbeConnection) traits on top of
//! `rusqlite`, so [`sqlgen_core::probe`] can discover result schemas from a
//! SQLite database.
//!
//! # Architecture
//!
//! - **`connection`**: Connection factory (database file or in-memory
//!   database with an init script) and the probe connection
//! - **`decltype`**: Declared column type text → [`SqlType`](sqlgen_core::SqlType)
//!
//! # Quick start
//!
//! ```
//! use sqlgen_core::{AccessKind, probe};
//! use sqlgen_sqlite::SqliteConnectionFactory;
//!
//! let factory = SqliteConnectionFactory::in_memory(
//!     "CREATE TABLE prices (symbol TEXT NOT NULL, open REAL, volume INTEGER);",
//! );
//!
//! let schema = probe(&factory, "select symbol, volume from prices").unwrap();
//! assert_eq!(schema.columns()[1].access_kind, AccessKind::Long);
//! assert!(!schema.columns()[0].nullable);
//! assert!(schema.columns()[1].nullable);
//! ```
//!
//! # Declared types
//!
//! SQLite reports the type a column was declared with, not the type of its
//! values. Columns computed from expressions (including `CAST`) carry no
//! declared type and are rejected as unsupported; select the value from a
//! table column declared with the wanted type instead.
//!
//! # Nullability
//!
//! By default a result column is nullable unless the table column it comes
//! from is declared `NOT NULL`. [`Nullability`] overrides this for every
//! column, e.g. for outer joins.

mod connection;
mod decltype;
mod error;

pub use connection::{DatabaseSource, Nullability, SqliteConnectionFactory, SqliteProbeConnection};
pub use decltype::parse_declared_type;
pub use error::{Result, SqliteError};
