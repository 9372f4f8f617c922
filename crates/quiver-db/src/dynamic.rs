//! Models whose table is chosen at runtime.

use crate::{
    connection::Registry,
    model::{Model, Record, DEFAULT_PRIMARY_KEY},
    value::Row,
};

/// A model bound to a table and primary key picked at runtime.
///
/// ```rust
/// use quiver_db::{DynamicModel, Model, Registry, Row};
///
/// let users = DynamicModel::create(Registry::new(), "users", None, Row::new());
/// assert_eq!(users.table_name(), "users");
/// assert_eq!(users.primary_key_name(), "id");
/// ```
#[derive(Debug)]
pub struct DynamicModel {
    record: Record,
    table: String,
    primary_key: Option<String>,
}

impl DynamicModel {
    pub fn create(
        registry: Registry,
        table: impl Into<String>,
        primary_key: Option<&str>,
        columns: Row,
    ) -> Self {
        Self {
            record: Record::with_columns(registry, columns),
            table: table.into(),
            primary_key: primary_key.map(String::from),
        }
    }

    /// Rebinds this model to another table, replacing its columns.
    ///
    /// Any in-flight query is dropped since it was built for the old table.
    pub fn with_table(
        &mut self,
        table: impl Into<String>,
        primary_key: Option<&str>,
        columns: Row,
    ) -> &mut Self {
        self.table = table.into();
        self.primary_key = primary_key.map(String::from);
        self.record.clear_builder();
        self.set_columns(columns);
        self
    }

    /// Takes over the table, primary key, connection and columns of `model`.
    pub fn with_model<M: Model>(&mut self, model: &M) -> &mut Self {
        let primary_key = model.primary_key_name();
        self.record.set_connection(model.connection_name());
        self.with_table(
            model.table_name(),
            Some(&primary_key),
            model.columns().clone(),
        )
    }
}

impl Model for DynamicModel {
    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    fn with_record(&self, record: Record) -> Self {
        Self {
            record,
            table: self.table.clone(),
            primary_key: self.primary_key.clone(),
        }
    }

    fn table_name(&self) -> String {
        self.table.clone()
    }

    fn primary_key_name(&self) -> String {
        self.primary_key
            .clone()
            .unwrap_or_else(|| DEFAULT_PRIMARY_KEY.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        connection::tests::RecordingDriver, define_model, dialect::Dialect, fluent::Fluent,
        value::Value,
    };

    define_model!(Book, table = "books", primary_key = "isbn");

    #[test]
    fn test_with_table_rebinds() {
        let mut model = DynamicModel::create(Registry::new(), "a", Some("a_id"), Row::new());
        model.eq("x", 1);

        let mut columns = Row::new();
        columns.insert("title".into(), "Dune".into());
        model.with_table("b", None, columns);

        assert_eq!(model.table_name(), "b");
        assert_eq!(model.primary_key_name(), "id");
        assert!(!model.record().has_builder());
        assert_eq!(model.get_column("title"), Some(&Value::Text("Dune".into())));
    }

    #[test]
    fn test_with_model_copies_identity() {
        let registry = Registry::new();
        let mut book = Book::new(registry.clone());
        book.set_column("isbn", "978-0441013593");
        book.on("library");

        let mut model = DynamicModel::create(registry, "unused", None, Row::new());
        model.with_model(&book);

        assert_eq!(model.table_name(), "books");
        assert_eq!(model.primary_key_name(), "isbn");
        assert_eq!(model.connection_name(), "library");
        assert_eq!(model.primary_key_value(), Some(&Value::Text("978-0441013593".into())));
    }

    #[test]
    fn test_results_keep_table() {
        let registry = Registry::new();
        let mut row = Row::new();
        row.insert("id".into(), 1.into());
        let driver = RecordingDriver {
            response: crate::driver::Cursor::from_rows(vec!["id".into()], [row]),
            ..Default::default()
        };
        registry.attach("default", Dialect::Sqlite, Box::new(driver.clone()));

        let mut model = DynamicModel::create(registry, "logs", Some("log_id"), Row::new());
        let rows = model.all().unwrap();
        assert_eq!(rows[0].table_name(), "logs");
        assert_eq!(rows[0].primary_key_name(), "log_id");
        assert_eq!(
            driver.statements.lock().unwrap()[0].0,
            "SELECT * FROM `logs`"
        );
    }
}
