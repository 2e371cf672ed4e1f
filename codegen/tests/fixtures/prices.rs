// @generated by sqlgen 0.1.0 from `reports/prices.sql`. Do not edit.
//
// Module: reports::prices

use sqlgen_runtime::RowReader as _;

/// Module path of this file, derived from the SQL file's location.
pub const MODULE_PATH: &str = "reports::prices";

/// Path of the stored query, relative to the resource root.
pub const RESOURCE_PATH: &str = "reports/prices.sql";

/// The stored query as literal text and named markers.
pub const SEGMENTS: &[sqlgen_runtime::Segment<'static>] = &[
    sqlgen_runtime::Segment::Text("select symbol, time, open, volume, tags, type from prices where symbol = '"),
    sqlgen_runtime::Segment::Param("symbol"),
    sqlgen_runtime::Segment::Text("' and time >= "),
    sqlgen_runtime::Segment::Param("start"),
    sqlgen_runtime::Segment::Text(" order by time limit "),
    sqlgen_runtime::Segment::Param("limit"),
    sqlgen_runtime::Segment::Text("\n"),
];

/// One result row of `reports/prices.sql`.
#[derive(Debug, Clone, PartialEq)]
pub struct Prices {
    pub symbol: ::std::string::String,
    pub time: i64,
    pub open: f64,
    pub volume: i64,
    pub tags: ::std::vec::Vec<::std::string::String>,
    pub r#type: ::std::string::String,
}

impl Prices {
    /// Reads one row. Columns are read by position, starting at 1.
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        ::std::result::Result::Ok(Self {
            symbol: row.get_string(1)?,
            time: row.get_long(2)?,
            open: row.get_double(3)?,
            volume: row.get_long(4)?,
            tags: row.get_array::<::std::string::String>(5)?,
            r#type: row.get_string(6)?,
        })
    }

    /// Field values in column order.
    pub fn values(&self) -> ::std::vec::Vec<sqlgen_runtime::Value> {
        vec![
            sqlgen_runtime::Value::from(self.symbol.clone()),
            sqlgen_runtime::Value::from(self.time),
            sqlgen_runtime::Value::from(self.open),
            sqlgen_runtime::Value::from(self.volume),
            sqlgen_runtime::Value::from(self.tags.clone()),
            sqlgen_runtime::Value::from(self.r#type.clone()),
        ]
    }
}

impl ::std::fmt::Display for Prices {
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
pub fn sql(symbol: &str, start: i64, limit: i32) -> ::std::string::String {
    sqlgen_runtime::render(SEGMENTS, &[("symbol", &symbol), ("start", &start), ("limit", &limit)])
}

/// Arguments of [`sql`] as an owned value.
#[derive(Debug, Clone, PartialEq)]
pub struct PricesParams {
    pub symbol: ::std::string::String,
    pub start: i64,
    pub limit: i32,
}

impl PricesParams {
    /// Takes the parameters without a declared default; the rest start at their default.
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            start: 0,
            limit: 10,
        }
    }

    /// Renders the query with these arguments.
    pub fn sql(&self) -> ::std::string::String {
        self::sql(&self.symbol, self.start, self.limit)
    }

    /// Renders and runs the query.
    pub fn select(&self, conn: &rusqlite::Connection) -> rusqlite::Result<::std::vec::Vec<Prices>> {
        self::select_with(conn, &self.sql())
    }
}

/// Renders the query and reads every row.
pub fn select(conn: &rusqlite::Connection, symbol: &str, start: i64, limit: i32) -> rusqlite::Result<::std::vec::Vec<Prices>> {
    self::select_with(conn, &self::sql(symbol, start, limit))
}

/// Runs already-rendered SQL and reads every row.
pub fn select_with(conn: &rusqlite::Connection, sql: &str) -> rusqlite::Result<::std::vec::Vec<Prices>> {
    sqlgen_runtime::query_rows(conn, sql, Prices::from_row)
}
