//! Runtime support for accessors generated by `sqlgen`.
//!
//! Generated modules depend on this crate for three things:
//!
//! - **`template`**: marker templates ([`Template`], [`Segment`],
//!   [`render`]) that substitute named parameters into stored SQL without
//!   ever re-scanning substituted values.
//! - **`row`**: the [`RowReader`] trait with 1-based positional readers
//!   over [`rusqlite::Row`], and [`query_rows`] for collecting results.
//! - **`value`**: [`Value`], the untyped column value returned by the
//!   generated `values()` method.
//!
//! # Example
//!
//! ```
//! use rusqlite::Connection;
//! use sqlgen_runtime::{RowReader, Segment, query_rows, render};
//!
//! const SEGMENTS: &[Segment<'static>] = &[
//!     Segment::Text("select name from fruit where price < "),
//!     Segment::Param("max"),
//!     Segment::Text(" order by name"),
//! ];
//!
//! let conn = Connection::open_in_memory().unwrap();
//! conn.execute_batch(
//!     "create table fruit (name text, price real);
//!      insert into fruit values ('apple', 1.0), ('kiwi', 3.5), ('fig', 0.5);",
//! )
//! .unwrap();
//!
//! let sql = render(SEGMENTS, &[("max", &2)]);
//! let names = query_rows(&conn, &sql, |row| row.get_string(1)).unwrap();
//! assert_eq!(names, vec!["apple", "fig"]);
//! ```

mod row;
mod template;
mod value;

pub use row::{RowReader, query_rows};
pub use template::{MarkerError, Segment, Template, render};
pub use value::Value;
