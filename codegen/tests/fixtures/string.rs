// @generated by sqlgen 0.1.0 from `string.sql`. Do not edit.
//
// Module: string

use sqlgen_runtime::RowReader as _;

/// Module path of this file, derived from the SQL file's location.
pub const MODULE_PATH: &str = "string";

/// Path of the stored query, relative to the resource root.
pub const RESOURCE_PATH: &str = "string.sql";

/// The stored query as literal text and named markers.
pub const SEGMENTS: &[sqlgen_runtime::Segment<'static>] = &[
    sqlgen_runtime::Segment::Text("select id, body, labels from notes where id >= "),
    sqlgen_runtime::Segment::Param("min_id"),
    sqlgen_runtime::Segment::Text(" order by id\n"),
];

/// One result row of `string.sql`.
#[derive(Debug, Clone, PartialEq)]
pub struct String {
    pub id: i64,
    pub body: ::std::option::Option<::std::string::String>,
    pub labels: ::std::vec::Vec<::std::string::String>,
}

impl String {
    /// Reads one row. Columns are read by position, starting at 1.
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        ::std::result::Result::Ok(Self {
            id: row.get_long(1)?,
            body: row.get_nullable(2, sqlgen_runtime::RowReader::get_string)?,
            labels: row.get_array::<::std::string::String>(3)?,
        })
    }

    /// Field values in column order.
    pub fn values(&self) -> ::std::vec::Vec<sqlgen_runtime::Value> {
        vec![
            sqlgen_runtime::Value::from(self.id),
            sqlgen_runtime::Value::from(self.body.clone()),
            sqlgen_runtime::Value::from(self.labels.clone()),
        ]
    }
}

impl ::std::fmt::Display for String {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        for (index, value) in self.values().iter().enumerate() {
            if index > 0 {
                f.write_str("\t")?;
            }
            write!(f, "{value}")?;
        }
        ::std::result::Result::Ok(())
    }
}

/// Renders the query. Arguments are substituted as text, without quoting.
pub fn sql(min_id: i64) -> ::std::string::String {
    sqlgen_runtime::render(SEGMENTS, &[("min_id", &min_id)])
}

/// Arguments of [`sql`] as an owned value.
#[derive(Debug, Clone, PartialEq)]
pub struct StringParams {
    pub min_id: i64,
}

impl StringParams {
    /// Takes the parameters without a declared default; the rest start at their default.
    pub fn new() -> Self {
        Self {
            min_id: 0,
        }
    }

    /// Renders the query with these arguments.
    pub fn sql(&self) -> ::std::string::String {
        self::sql(self.min_id)
    }

    /// Renders and runs the query.
    pub fn select(&self, conn: &rusqlite::Connection) -> rusqlite::Result<::std::vec::Vec<String>> {
        self::select_with(conn, &self.sql())
    }
}

impl ::std::default::Default for StringParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the query and reads every row.
pub fn select(conn: &rusqlite::Connection, min_id: i64) -> rusqlite::Result<::std::vec::Vec<String>> {
    self::select_with(conn, &self::sql(min_id))
}

/// Runs already-rendered SQL and reads every row.
pub fn select_with(conn: &rusqlite::Connection, sql: &str) -> rusqlite::Result<::std::vec::Vec<String>> {
    sqlgen_runtime::query_rows(conn, sql, String::from_row)
}
