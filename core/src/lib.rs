//! Core building blocks for generating typed SQL accessors.
//!
//! This crate holds the driver-agnostic half of the generator:
//!
//! - [`parse_template`]: parses `${name:Type}` / `${name:Type=default}`
//!   placeholders into a [`SqlTemplate`].
//! - [`AccessKind`] and [`SqlType`]: the type mapping table from database
//!   type tags to reader operations and Rust types.
//! - [`probe`]: discovers a query's [`Schema`] through any
//!   [`ConnectionFactory`] by running a zero-row wrapper query.
//! - [`escape_identifier`]: turns column names into legal Rust identifiers.
//!
//! # Example
//!
//! ```
//! use sqlgen_core::*;
//!
//! let template = parse_template("select id, type from items where owner = '${owner:String}'").unwrap();
//! assert_eq!(template.populated(), "select id, type from items where owner = ''");
//!
//! let schema = Schema::from_columns(vec![
//!     ColumnInfo::new("id", SqlType::BigInt, false),
//!     ColumnInfo::new("type", SqlType::VarChar, false),
//! ])
//! .unwrap();
//! assert_eq!(schema.columns()[1].qualified_name, "r#type");
//! ```

mod error;
mod ident;
mod probe;
mod template;
mod types;

pub use error::{CodegenError, DriverError, ParseError, Result};
pub use ident::{escape_identifier, is_identifier, is_keyword, is_snake_case};
pub use probe::{ConnectionFactory, ProbeConnection, limit_zero, probe};
pub use template::{ParamType, SqlTemplate, TemplateParam, parse_template};
pub use types::{AccessKind, Column, ColumnInfo, ReaderOp, Schema, SqlType};
