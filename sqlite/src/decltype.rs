//! Declared-type parsing.
//!
//! SQLite reports the declared type of a result column verbatim, as it was
//! written in `CREATE TABLE`. This module normalizes that text into a
//! [`SqlType`] tag:
//!
//! - size and precision arguments are dropped (`VARCHAR(255)` → `VARCHAR`);
//! - well-known type names map to their tag directly;
//! - `ARRAY<elem>`, `elem[]` and `elem ARRAY` become arrays with a resolved
//!   element, a bare `ARRAY` an array with an unresolved element. SQLite's
//!   own parser only accepts the last form in `CREATE TABLE`;
//! - anything else falls back to SQLite's column affinity rules, and to
//!   [`SqlType::Other`] when no rule applies.

use std::sync::LazyLock;

use regex::Regex;
use sqlgen_core::SqlType;

static ARRAY_GENERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^ARRAY\s*<\s*(.+?)\s*>$").expect("static regex must compile")
});
static ARRAY_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s*\[\s*\]$").expect("static regex must compile"));
static ARRAY_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.+?)\s+ARRAY$").expect("static regex must compile"));
static MAP_GENERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^MAP\s*<.*>$").expect("static regex must compile"));
static TYPE_ARGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*\)").expect("static regex must compile"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex must compile"));

/// Maps a SQLite declared type to a [`SqlType`].
///
/// # Examples
///
/// ```
/// use sqlgen_core::SqlType;
/// use sqlgen_sqlite::parse_declared_type;
///
/// assert_eq!(parse_declared_type("varchar(32)"), SqlType::VarChar);
/// assert_eq!(parse_declared_type("INTEGER"), SqlType::BigInt);
/// assert_eq!(parse_declared_type("ARRAY<TEXT>"), SqlType::array_of(SqlType::LongVarChar));
/// ```
pub fn parse_declared_type(declared: &str) -> SqlType {
    let declared = declared.trim();

    if let Some(caps) = ARRAY_GENERIC.captures(declared) {
        return SqlType::array_of(parse_declared_type(&caps[1]));
    }
    if let Some(caps) = ARRAY_SUFFIX.captures(declared) {
        return SqlType::array_of(parse_declared_type(&caps[1]));
    }
    if let Some(caps) = ARRAY_KEYWORD.captures(declared) {
        return SqlType::array_of(parse_declared_type(&caps[1]));
    }
    if MAP_GENERIC.is_match(declared) {
        return SqlType::Map;
    }

    let stripped = TYPE_ARGS.replace_all(declared, "");
    let name = WHITESPACE.replace_all(stripped.trim(), " ").to_ascii_uppercase();

    match name.as_str() {
        "INT" | "INTEGER" | "MEDIUMINT" | "BIGINT" | "INT8" | "UNSIGNED BIG INT" => SqlType::BigInt,
        "TINYINT" => SqlType::TinyInt,
        "SMALLINT" | "INT2" => SqlType::SmallInt,
        "BOOL" | "BOOLEAN" => SqlType::Boolean,
        "BIT" => SqlType::Bit,
        "REAL" => SqlType::Real,
        "FLOAT" => SqlType::Float,
        "DOUBLE" | "DOUBLE PRECISION" => SqlType::Double,
        "NUMERIC" => SqlType::Numeric,
        "DECIMAL" => SqlType::Decimal,
        "TEXT" => SqlType::LongVarChar,
        "CLOB" => SqlType::Clob,
        "CHAR" | "CHARACTER" => SqlType::Char,
        "VARCHAR" | "VARYING CHARACTER" | "CHARACTER VARYING" => SqlType::VarChar,
        "NCHAR" | "NATIVE CHARACTER" => SqlType::NChar,
        "NVARCHAR" => SqlType::NVarChar,
        "DATE" => SqlType::Date,
        "TIME" => SqlType::Time,
        "DATETIME" | "TIMESTAMP" => SqlType::Timestamp,
        "BLOB" => SqlType::Blob,
        "BINARY" => SqlType::Binary,
        "VARBINARY" => SqlType::VarBinary,
        "ARRAY" => SqlType::Array(None),
        "MAP" => SqlType::Map,
        _ => affinity(&name),
    }
}

/// SQLite's column affinity rules (section 3.1 of the datatype docs).
fn affinity(name: &str) -> SqlType {
    if name.contains("INT") {
        SqlType::BigInt
    } else if name.contains("CHAR") || name.contains("CLOB") || name.contains("TEXT") {
        SqlType::LongVarChar
    } else if name.contains("BLOB") {
        SqlType::Blob
    } else if name.contains("REAL") || name.contains("FLOA") || name.contains("DOUB") {
        SqlType::Double
    } else {
        SqlType::Other(name.to_string())
    }
}
