//! Positional row readers used by generated `from_row` functions.
//!
//! Every reader takes a 1-based column position. Position 0 is reported as
//! [`rusqlite::Error::InvalidColumnIndex`].

use rusqlite::types::{Type, ValueRef};
use rusqlite::{Connection, Row};
use serde::de::DeserializeOwned;

/// Typed access to the columns of a result row.
///
/// Implemented for [`rusqlite::Row`]. Array columns are stored as JSON
/// array text and decoded with `serde_json`.
///
/// ```
/// use rusqlite::Connection;
/// use sqlgen_runtime::RowReader;
///
/// let conn = Connection::open_in_memory().unwrap();
/// let (name, count): (String, i64) = conn
///     .query_row("select 'a', 3", [], |row| Ok((row.get_string(1)?, row.get_long(2)?)))
///     .unwrap();
/// assert_eq!(name, "a");
/// assert_eq!(count, 3);
/// ```
pub trait RowReader {
    fn get_boolean(&self, index: usize) -> rusqlite::Result<bool>;
    fn get_int(&self, index: usize) -> rusqlite::Result<i32>;
    fn get_long(&self, index: usize) -> rusqlite::Result<i64>;
    fn get_float(&self, index: usize) -> rusqlite::Result<f32>;
    fn get_double(&self, index: usize) -> rusqlite::Result<f64>;
    fn get_string(&self, index: usize) -> rusqlite::Result<String>;

    /// Decodes a JSON array column into `Vec<T>`.
    fn get_array<T: DeserializeOwned>(&self, index: usize) -> rusqlite::Result<Vec<T>>;

    /// Returns `true` if the column holds SQL `NULL`.
    fn is_null(&self, index: usize) -> rusqlite::Result<bool>;

    /// Reads a nullable column with one of the typed readers above.
    ///
    /// ```
    /// use rusqlite::Connection;
    /// use sqlgen_runtime::RowReader;
    ///
    /// let conn = Connection::open_in_memory().unwrap();
    /// let value = conn
    ///     .query_row("select null", [], |row| row.get_nullable(1, RowReader::get_long))
    ///     .unwrap();
    /// assert_eq!(value, None);
    /// ```
    fn get_nullable<T, F>(&self, index: usize, read: F) -> rusqlite::Result<Option<T>>
    where
        F: FnOnce(&Self, usize) -> rusqlite::Result<T>,
    {
        if self.is_null(index)? {
            Ok(None)
        } else {
            read(self, index).map(Some)
        }
    }
}

fn position(index: usize) -> rusqlite::Result<usize> {
    index
        .checked_sub(1)
        .ok_or(rusqlite::Error::InvalidColumnIndex(index))
}

impl RowReader for Row<'_> {
    fn get_boolean(&self, index: usize) -> rusqlite::Result<bool> {
        self.get(position(index)?)
    }

    fn get_int(&self, index: usize) -> rusqlite::Result<i32> {
        self.get(position(index)?)
    }

    fn get_long(&self, index: usize) -> rusqlite::Result<i64> {
        self.get(position(index)?)
    }

    fn get_float(&self, index: usize) -> rusqlite::Result<f32> {
        self.get(position(index)?)
    }

    fn get_double(&self, index: usize) -> rusqlite::Result<f64> {
        self.get(position(index)?)
    }

    fn get_string(&self, index: usize) -> rusqlite::Result<String> {
        self.get(position(index)?)
    }

    fn get_array<T: DeserializeOwned>(&self, index: usize) -> rusqlite::Result<Vec<T>> {
        let idx = position(index)?;
        let text: String = self.get(idx)?;
        serde_json::from_str(&text)
            .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
    }

    fn is_null(&self, index: usize) -> rusqlite::Result<bool> {
        Ok(matches!(self.get_ref(position(index)?)?, ValueRef::Null))
    }
}

/// Runs `sql` and materializes every row with `read`, preserving row order.
///
/// Generated `select` and `select_with` functions delegate here.
pub fn query_rows<T, F>(conn: &Connection, sql: &str, read: F) -> rusqlite::Result<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], read)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE t (flag BOOLEAN, small INTEGER, big BIGINT, ratio REAL, name TEXT, tags TEXT);
             INSERT INTO t VALUES (1, 7, 9000000000, 0.25, 'x', '[\"a\",\"b\"]');
             INSERT INTO t VALUES (0, NULL, 1, 1.0, 'y', '[]');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_positional_readers_are_one_based() {
        let conn = conn();
        let row = conn
            .query_row("SELECT * FROM t WHERE name = 'x'", [], |row| {
                Ok((
                    row.get_boolean(1)?,
                    row.get_int(2)?,
                    row.get_long(3)?,
                    row.get_double(4)?,
                    row.get_string(5)?,
                    row.get_array::<String>(6)?,
                ))
            })
            .unwrap();
        assert_eq!(
            row,
            (true, 7, 9_000_000_000, 0.25, "x".to_string(), vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_index_zero_is_invalid() {
        let conn = conn();
        let err = conn
            .query_row("SELECT name FROM t LIMIT 1", [], |row| row.get_string(0))
            .unwrap_err();
        assert!(matches!(err, rusqlite::Error::InvalidColumnIndex(0)));
    }

    #[test]
    fn test_get_nullable() {
        let conn = conn();
        let value = conn
            .query_row("SELECT small FROM t WHERE name = 'y'", [], |row| {
                row.get_nullable(1, RowReader::get_int)
            })
            .unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_get_array_rejects_non_json() {
        let conn = conn();
        let err = conn
            .query_row("SELECT name FROM t LIMIT 1", [], |row| row.get_array::<i64>(1))
            .unwrap_err();
        assert!(matches!(err, rusqlite::Error::FromSqlConversionFailure(0, Type::Text, _)));
    }

    #[test]
    fn test_query_rows_keeps_order() {
        let conn = conn();
        let names = query_rows(&conn, "SELECT name FROM t ORDER BY name DESC", |row| {
            row.get_string(1)
        })
        .unwrap();
        assert_eq!(names, vec!["y", "x"]);
    }
}
