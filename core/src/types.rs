//! Database type tags, access kinds, and the result-set schema.
//!
//! The type mapping table lives here: [`AccessKind::from_sql_type`] maps a
//! database type tag to the value category that drives code generation, and
//! [`AccessKind::reader`] describes how a value of that category is read
//! out of a row and which Rust type holds it.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{CodegenError, Result};
use crate::ident::escape_identifier;

/// Database column type tag.
///
/// Mirrors the common JDBC/ANSI type names. `Array` optionally carries the
/// element tag; `None` means the driver did not resolve it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SqlType {
    Bit,
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Float,
    Double,
    Numeric,
    Decimal,
    Char,
    VarChar,
    LongVarChar,
    NChar,
    NVarChar,
    LongNVarChar,
    Clob,
    NClob,
    Date,
    Time,
    Timestamp,
    Binary,
    VarBinary,
    Blob,
    Array(Option<Box<SqlType>>),
    Map,
    Null,
    Other(String),
}

impl SqlType {
    /// Shorthand for an array with a resolved element type.
    pub fn array_of(element: SqlType) -> Self {
        SqlType::Array(Some(Box::new(element)))
    }

    /// The element tag of an array, or [`SqlType::Null`] for anything else
    /// (including arrays whose element type is unresolved).
    pub fn element_type(&self) -> SqlType {
        match self {
            SqlType::Array(Some(element)) => element.as_ref().clone(),
            _ => SqlType::Null,
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SqlType::Bit => "BIT",
            SqlType::Boolean => "BOOLEAN",
            SqlType::TinyInt => "TINYINT",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Real => "REAL",
            SqlType::Float => "FLOAT",
            SqlType::Double => "DOUBLE",
            SqlType::Numeric => "NUMERIC",
            SqlType::Decimal => "DECIMAL",
            SqlType::Char => "CHAR",
            SqlType::VarChar => "VARCHAR",
            SqlType::LongVarChar => "LONGVARCHAR",
            SqlType::NChar => "NCHAR",
            SqlType::NVarChar => "NVARCHAR",
            SqlType::LongNVarChar => "LONGNVARCHAR",
            SqlType::Clob => "CLOB",
            SqlType::NClob => "NCLOB",
            SqlType::Date => "DATE",
            SqlType::Time => "TIME",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Binary => "BINARY",
            SqlType::VarBinary => "VARBINARY",
            SqlType::Blob => "BLOB",
            SqlType::Array(Some(element)) => return write!(f, "ARRAY<{element}>"),
            SqlType::Array(None) => "ARRAY",
            SqlType::Map => "MAP",
            SqlType::Null => "NULL",
            SqlType::Other(name) => return write!(f, "OTHER({name})"),
        };
        f.write_str(name)
    }
}

impl Serialize for SqlType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Value category of a column.
///
/// Selects both the reader operation used on a result row and the Rust
/// type of the generated field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Boolean,
    Int,
    Long,
    Float,
    Double,
    String,
    /// Array of the given element kind; `None` when the element is unresolved.
    Array(Option<Box<AccessKind>>),
    /// Key/value column. Has no reader operation.
    Map,
}

/// How to read one access kind out of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOp {
    /// `RowReader` method name.
    pub method: &'static str,
    /// Turbofish argument for generic readers (`get_array::<T>`).
    pub type_arg: Option<String>,
    /// Rust type of a non-null value. Std types are written as absolute
    /// paths so a generated record named `String` or `Vec` cannot shadow them.
    pub host_type: String,
    /// Whether `host_type` is `Copy`.
    pub copy: bool,
}

impl ReaderOp {
    fn scalar(method: &'static str, host_type: &str, copy: bool) -> Self {
        Self {
            method,
            type_arg: None,
            host_type: host_type.to_string(),
            copy,
        }
    }

    /// Method path usable as a function value, e.g. `RowReader::get_array::<i64>`.
    pub fn path(&self) -> String {
        match &self.type_arg {
            Some(arg) => format!("RowReader::{}::<{arg}>", self.method),
            None => format!("RowReader::{}", self.method),
        }
    }

    /// Method call on `row` at the given 1-based position.
    pub fn call(&self, row: &str, index: usize) -> String {
        match &self.type_arg {
            Some(arg) => format!("{row}.{}::<{arg}>({index})", self.method),
            None => format!("{row}.{}({index})", self.method),
        }
    }
}

impl AccessKind {
    /// The type mapping table. Returns `None` for tags with no mapping.
    ///
    /// ```
    /// use sqlgen_core::{AccessKind, SqlType};
    ///
    /// assert_eq!(AccessKind::from_sql_type(&SqlType::VarChar), Some(AccessKind::String));
    /// assert_eq!(AccessKind::from_sql_type(&SqlType::BigInt), Some(AccessKind::Long));
    /// assert_eq!(AccessKind::from_sql_type(&SqlType::Blob), None);
    /// ```
    pub fn from_sql_type(sql_type: &SqlType) -> Option<AccessKind> {
        let kind = match sql_type {
            SqlType::Bit | SqlType::Boolean => AccessKind::Boolean,
            SqlType::TinyInt | SqlType::SmallInt | SqlType::Integer => AccessKind::Int,
            SqlType::BigInt => AccessKind::Long,
            SqlType::Real => AccessKind::Float,
            SqlType::Float | SqlType::Double | SqlType::Numeric | SqlType::Decimal => {
                AccessKind::Double
            }
            SqlType::Char
            | SqlType::VarChar
            | SqlType::LongVarChar
            | SqlType::NChar
            | SqlType::NVarChar
            | SqlType::LongNVarChar
            | SqlType::Clob
            | SqlType::NClob
            | SqlType::Date
            | SqlType::Time
            | SqlType::Timestamp => AccessKind::String,
            SqlType::Array(None) => AccessKind::Array(None),
            SqlType::Array(Some(element)) => {
                AccessKind::Array(Some(Box::new(AccessKind::from_sql_type(element)?)))
            }
            SqlType::Map => AccessKind::Map,
            SqlType::Binary
            | SqlType::VarBinary
            | SqlType::Blob
            | SqlType::Null
            | SqlType::Other(_) => return None,
        };
        Some(kind)
    }

    /// Reader operation and host type, or `None` when the kind cannot be read.
    ///
    /// Arrays derive their element reader recursively; a map anywhere in
    /// the chain, or an unresolved element, yields `None`.
    pub fn reader(&self) -> Option<ReaderOp> {
        let op = match self {
            AccessKind::Boolean => ReaderOp::scalar("get_boolean", "bool", true),
            AccessKind::Int => ReaderOp::scalar("get_int", "i32", true),
            AccessKind::Long => ReaderOp::scalar("get_long", "i64", true),
            AccessKind::Float => ReaderOp::scalar("get_float", "f32", true),
            AccessKind::Double => ReaderOp::scalar("get_double", "f64", true),
            AccessKind::String => ReaderOp::scalar("get_string", "::std::string::String", false),
            AccessKind::Array(Some(element)) => {
                let element = element.reader()?;
                ReaderOp {
                    method: "get_array",
                    host_type: format!("::std::vec::Vec<{}>", element.host_type),
                    type_arg: Some(element.host_type),
                    copy: false,
                }
            }
            AccessKind::Array(None) | AccessKind::Map => return None,
        };
        Some(op)
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::Boolean => f.write_str("Boolean"),
            AccessKind::Int => f.write_str("Int"),
            AccessKind::Long => f.write_str("Long"),
            AccessKind::Float => f.write_str("Float"),
            AccessKind::Double => f.write_str("Double"),
            AccessKind::String => f.write_str("String"),
            AccessKind::Array(Some(element)) => write!(f, "Array<{element}>"),
            AccessKind::Array(None) => f.write_str("Array<?>"),
            AccessKind::Map => f.write_str("Map"),
        }
    }
}

impl Serialize for AccessKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Column description reported by a database collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// `None` when the driver reports no type (e.g. SQLite expression columns).
    pub sql_type: Option<SqlType>,
    pub nullable: bool,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, sql_type: SqlType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            sql_type: Some(sql_type),
            nullable,
        }
    }
}

/// One result column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Name as reported by the database.
    pub name: String,
    /// Escaped, unique Rust identifier for the field.
    pub qualified_name: String,
    pub access_kind: AccessKind,
    pub sql_type: SqlType,
    pub nullable: bool,
    /// Array element tag; [`SqlType::Null`] for non-array columns.
    pub element_type: SqlType,
}

impl Column {
    /// Reader operation for this column, or [`CodegenError::UnsupportedColumn`].
    pub fn reader(&self) -> Result<ReaderOp> {
        self.access_kind
            .reader()
            .ok_or_else(|| CodegenError::UnsupportedColumn {
                column: self.name.clone(),
                access_kind: self.access_kind.to_string(),
            })
    }

    /// Declared Rust type of the generated field.
    pub fn field_type(&self) -> Result<String> {
        let reader = self.reader()?;
        Ok(if self.nullable {
            format!("::std::option::Option<{}>", reader.host_type)
        } else {
            reader.host_type
        })
    }
}

/// Ordered result-set shape of one query.
///
/// Built once from driver metadata by [`Schema::from_columns`] and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Maps driver column descriptions into a schema.
    ///
    /// Names are escaped with [`escape_identifier`] and made unique by
    /// appending `_2`, `_3`, ... to later duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError::UnsupportedType`] for the first column whose
    /// type tag is missing or has no mapping.
    pub fn from_columns(infos: Vec<ColumnInfo>) -> Result<Self> {
        let mut columns: Vec<Column> = Vec::with_capacity(infos.len());

        for (index, info) in infos.into_iter().enumerate() {
            let Some(sql_type) = info.sql_type else {
                return Err(CodegenError::UnsupportedType {
                    column: info.name,
                    sql_type: "<none>".to_string(),
                });
            };
            let Some(access_kind) = AccessKind::from_sql_type(&sql_type) else {
                return Err(CodegenError::UnsupportedType {
                    column: info.name,
                    sql_type: sql_type.to_string(),
                });
            };

            let mut base = escape_identifier(&info.name);
            if base.is_empty() {
                base = format!("column_{}", index + 1);
            }
            let mut qualified_name = base.clone();
            let mut suffix = 2;
            while columns.iter().any(|c| c.qualified_name == qualified_name) {
                qualified_name = format!("{base}_{suffix}");
                suffix += 1;
            }

            columns.push(Column {
                element_type: sql_type.element_type(),
                name: info.name,
                qualified_name,
                access_kind,
                sql_type,
                nullable: info.nullable,
            });
        }

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
