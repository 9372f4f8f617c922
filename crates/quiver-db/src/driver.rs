//! The execution boundary.
//!
//! A [`Driver`] prepares and runs one statement with positional parameters and
//! hands back a fully materialized [`Cursor`]. [`SqliteDriver`] is the built-in
//! implementation; any other engine plugs in through
//! [`crate::Registry::attach`].

use std::{collections::VecDeque, path::Path};

use rusqlite::{params_from_iter, Connection, OpenFlags};
use tracing::trace;

use crate::{
    error::Result,
    value::{Row, Value},
};

/// Prepares and executes statements against one database handle.
pub trait Driver: Send {
    /// Executes `sql`, binding `params` to its `?` placeholders in order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DbError::Execution`] carrying the driver's own error
    /// when preparation or execution fails.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<Cursor>;
}

/// The outcome of one executed statement.
///
/// Iterating a cursor yields its rows in the order the database returned them.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Cursor {
    columns: Vec<String>,
    rows: VecDeque<Row>,
    rows_affected: usize,
    last_insert_id: Option<Value>,
}

impl Cursor {
    /// A cursor over the rows of a query.
    pub fn from_rows(columns: Vec<String>, rows: impl IntoIterator<Item = Row>) -> Self {
        Self {
            columns,
            rows: rows.into_iter().collect(),
            ..Self::default()
        }
    }

    /// A cursor for a statement that returned no rows.
    pub fn from_affected(rows_affected: usize, last_insert_id: Option<Value>) -> Self {
        Self {
            rows_affected,
            last_insert_id,
            ..Self::default()
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows_affected(&self) -> usize {
        self.rows_affected
    }

    /// Id generated by this statement when it was an INSERT that added a row.
    pub fn last_insert_id(&self) -> Option<&Value> {
        self.last_insert_id.as_ref()
    }

    /// Takes the next row.
    pub fn fetch(&mut self) -> Option<Row> {
        self.rows.pop_front()
    }

    /// Takes the next row and returns its first column.
    pub fn fetch_column(&mut self) -> Option<Value> {
        self.fetch()
            .and_then(|row| row.into_iter().next().map(|(_, value)| value))
    }
}

impl Iterator for Cursor {
    type Item = Row;

    fn next(&mut self) -> Option<Self::Item> {
        self.fetch()
    }
}

/// Driver backed by an embedded SQLite database.
pub struct SqliteDriver {
    conn: Connection,
}

impl SqliteDriver {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Connection::open_in_memory()?))
    }

    pub fn open<P: AsRef<Path>>(path: P, flags: OpenFlags) -> Result<Self> {
        Ok(Self::new(Connection::open_with_flags(path, flags)?))
    }

    /// Gets a reference to the underlying connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

impl Driver for SqliteDriver {
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<Cursor> {
        trace!(sql, ?params, "sqlite execute");
        let mut stmt = self.conn.prepare(sql)?;

        if stmt.column_count() == 0 {
            let affected = stmt.execute(params_from_iter(params.iter()))?;
            let last_insert_id = (affected > 0 && is_insert(sql))
                .then(|| Value::Integer(self.conn.last_insert_rowid()));
            return Ok(Cursor::from_affected(affected, last_insert_id));
        }

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Row::with_capacity(columns.len());
            for (idx, name) in columns.iter().enumerate() {
                values.insert(name.clone(), Value::from(row.get_ref(idx)?));
            }
            result.push(values);
        }

        Ok(Cursor::from_rows(columns, result))
    }
}

/// Whether `sql` starts with INSERT or REPLACE, the statements that assign a
/// rowid.
fn is_insert(sql: &str) -> bool {
    let keyword = sql
        .trim_start()
        .split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or_default();
    keyword.eq_ignore_ascii_case("insert") || keyword.eq_ignore_ascii_case("replace")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> SqliteDriver {
        let mut driver = SqliteDriver::open_in_memory().unwrap();
        driver
            .execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)", &[])
            .unwrap();
        driver
    }

    #[test]
    fn test_insert_reports_last_id_and_affected() {
        let mut driver = setup();
        let cursor = driver
            .execute("INSERT INTO t (name) VALUES (?)", &["a".into()])
            .unwrap();

        assert_eq!(cursor.rows_affected(), 1);
        assert_eq!(cursor.last_insert_id(), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_only_inserts_report_last_id() {
        let mut driver = setup();
        driver
            .execute("insert into t (name) values (?)", &["a".into()])
            .unwrap();

        let cursor = driver.execute("UPDATE t SET name = ?", &["b".into()]).unwrap();
        assert_eq!(cursor.rows_affected(), 1);
        assert_eq!(cursor.last_insert_id(), None);

        let cursor = driver.execute("DELETE FROM t", &[]).unwrap();
        assert_eq!(cursor.rows_affected(), 1);
        assert_eq!(cursor.last_insert_id(), None);

        let cursor = driver.execute("CREATE TABLE u (id INTEGER PRIMARY KEY)", &[]).unwrap();
        assert_eq!(cursor.last_insert_id(), None);

        let cursor = driver
            .execute("INSERT OR IGNORE INTO u (id) VALUES (?)", &[5.into()])
            .unwrap();
        assert_eq!(cursor.last_insert_id(), Some(&Value::Integer(5)));

        let cursor = driver
            .execute("INSERT OR IGNORE INTO u (id) VALUES (?)", &[5.into()])
            .unwrap();
        assert_eq!(cursor.rows_affected(), 0);
        assert_eq!(cursor.last_insert_id(), None);

        let cursor = driver
            .execute("  REPLACE INTO u (id) VALUES (?)", &[9.into()])
            .unwrap();
        assert_eq!(cursor.last_insert_id(), Some(&Value::Integer(9)));
    }

    #[test]
    fn test_select_keeps_column_order() {
        let mut driver = setup();
        driver
            .execute("INSERT INTO t (name) VALUES (?), (?)", &["a".into(), "b".into()])
            .unwrap();

        let mut cursor = driver.execute("SELECT name, id FROM t ORDER BY id", &[]).unwrap();
        assert_eq!(cursor.columns(), ["name", "id"]);

        let first = cursor.fetch().unwrap();
        assert_eq!(first.keys().collect::<Vec<_>>(), ["name", "id"]);
        assert_eq!(first["name"], Value::Text("a".into()));
        assert_eq!(cursor.count(), 1);
    }

    #[test]
    fn test_fetch_column() {
        let mut driver = setup();
        let mut cursor = driver.execute("SELECT COUNT(*) FROM t", &[]).unwrap();
        assert_eq!(cursor.fetch_column(), Some(Value::Integer(0)));
        assert_eq!(cursor.fetch_column(), None);
    }

    #[test]
    fn test_errors_are_execution_failures() {
        let mut driver = setup();
        let err = driver
            .execute("INSERT INTO t (missing) VALUES (?)", &[1.into()])
            .unwrap_err();
        assert!(matches!(err, crate::DbError::Execution(_)));
        assert!(err.to_string().contains("no column named missing"));
    }
}
