//! Table and column discovery.
//!
//! Inspection is kept out of the model layer; callers that need the live
//! schema (the CLI, mostly) ask an inspector for it.

use tracing::debug;

use crate::{
    connection::Registry,
    dialect::Dialect,
    driver::Cursor,
    error::Result,
    value::Value,
};

/// Lists tables and their columns on one connection.
pub trait SchemaInspector {
    /// User tables, sorted by name.
    fn tables(&self) -> Result<Vec<String>>;

    /// Column names of `table` in declaration order.
    fn columns_of(&self, table: &str) -> Result<Vec<String>>;
}

/// Collects the first column of every row as text.
fn first_column(cursor: Cursor) -> Vec<String> {
    cursor
        .filter_map(|row| row.into_iter().next())
        .filter_map(|(_, value)| match value {
            Value::Null => None,
            value => Some(value.to_string()),
        })
        .collect()
}

/// Inspector for SQLite, backed by `sqlite_master` and `pragma_table_info`.
pub struct SqliteInspector {
    registry: Registry,
    connection: String,
}

impl SqliteInspector {
    pub fn new(registry: Registry, connection: impl Into<String>) -> Self {
        Self {
            registry,
            connection: connection.into(),
        }
    }
}

impl SchemaInspector for SqliteInspector {
    fn tables(&self) -> Result<Vec<String>> {
        let cursor = self.registry.execute_on(
            &self.connection,
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            &[],
        )?;
        Ok(first_column(cursor))
    }

    fn columns_of(&self, table: &str) -> Result<Vec<String>> {
        debug!(connection = %self.connection, table, "inspecting columns");
        let cursor = self.registry.execute_on(
            &self.connection,
            "SELECT name FROM pragma_table_info(?) ORDER BY cid",
            &[Value::from(table)],
        )?;
        Ok(first_column(cursor))
    }
}

/// Inspector for engines exposing the standard `INFORMATION_SCHEMA` views.
pub struct InformationSchemaInspector {
    registry: Registry,
    connection: String,
}

impl InformationSchemaInspector {
    pub fn new(registry: Registry, connection: impl Into<String>) -> Self {
        Self {
            registry,
            connection: connection.into(),
        }
    }
}

impl SchemaInspector for InformationSchemaInspector {
    fn tables(&self) -> Result<Vec<String>> {
        let cursor = self.registry.execute_on(
            &self.connection,
            "SELECT table_name FROM information_schema.tables \
             WHERE table_type = 'BASE TABLE' \
             AND table_schema NOT IN ('information_schema', 'pg_catalog') \
             ORDER BY table_name",
            &[],
        )?;
        Ok(first_column(cursor))
    }

    fn columns_of(&self, table: &str) -> Result<Vec<String>> {
        debug!(connection = %self.connection, table, "inspecting columns");
        let cursor = self.registry.execute_on(
            &self.connection,
            "SELECT column_name FROM information_schema.columns \
             WHERE table_name = ? ORDER BY ordinal_position",
            &[Value::from(table)],
        )?;
        Ok(first_column(cursor))
    }
}

/// Picks the inspector matching the dialect of connection `name`.
pub fn inspector_for(registry: &Registry, name: &str) -> Result<Box<dyn SchemaInspector>> {
    let inspector: Box<dyn SchemaInspector> = match registry.dialect(name)? {
        Dialect::Sqlite => Box::new(SqliteInspector::new(registry.clone(), name)),
        _ => Box::new(InformationSchemaInspector::new(registry.clone(), name)),
    };
    Ok(inspector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        connection::{tests::RecordingDriver, ConnectOptions},
        error::DbError,
        value::Row,
    };

    fn sqlite() -> Registry {
        let registry = Registry::new();
        registry
            .connect("sqlite::memory:", "", "", &ConnectOptions::default())
            .unwrap();
        registry
            .execute(
                "CREATE TABLE user (id INTEGER PRIMARY KEY, name TEXT, email TEXT)",
                &[],
            )
            .unwrap();
        registry
            .execute("CREATE TABLE article (id INTEGER PRIMARY KEY)", &[])
            .unwrap();
        registry
    }

    #[test]
    fn test_sqlite_tables_and_columns() {
        let registry = sqlite();
        let inspector = inspector_for(&registry, "default").unwrap();

        assert_eq!(inspector.tables().unwrap(), vec!["article", "user"]);
        assert_eq!(inspector.columns_of("user").unwrap(), vec!["id", "name", "email"]);
        assert!(inspector.columns_of("missing").unwrap().is_empty());
    }

    #[test]
    fn test_information_schema_queries() {
        let registry = Registry::new();
        let mut row = Row::new();
        row.insert("column_name".into(), "id".into());
        let driver = RecordingDriver {
            response: Cursor::from_rows(vec!["column_name".into()], [row]),
            ..Default::default()
        };
        registry.attach("pg", Dialect::Postgres, Box::new(driver.clone()));

        let inspector = inspector_for(&registry, "pg").unwrap();
        assert_eq!(inspector.columns_of("user").unwrap(), vec!["id"]);

        let statements = driver.statements.lock().unwrap();
        assert!(statements[0].0.contains("information_schema.columns"));
        assert_eq!(statements[0].1, vec![Value::Text("user".into())]);
    }

    #[test]
    fn test_inspector_for_unknown_connection() {
        let err = inspector_for(&Registry::new(), "nope").err().unwrap();
        assert!(matches!(err, DbError::UnknownConnection(_)));
    }
}
