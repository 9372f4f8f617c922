//! Row-backed models.
//!
//! A model is any type that embeds a [`Record`] and implements [`Model`] to
//! expose it. The record carries everything the persistence layer needs: the
//! registry handle, the connection name, the current column values and the
//! query builder of an in-flight fluent chain.
//!
//! Most models are declared with [`crate::define_model!`]; the [`Fluent`] and
//! [`ActiveRecord`] traits are then available on them automatically.
//!
//! [`Fluent`]: crate::fluent::Fluent
//! [`ActiveRecord`]: crate::active_record::ActiveRecord

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    builder::QueryBuilder,
    connection::{Registry, DEFAULT_CONNECTION},
    value::{Row, Value},
};

/// Primary key column used when a model does not name one.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

static UPPERCASE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[A-Z]+").expect("unable to compile uppercase regex"));

/// Derives a table name from a Rust type path.
///
/// Takes the last path segment, puts `_` in front of every run of uppercase
/// letters, lowercases the result and strips leading underscores.
///
/// ```
/// use quiver_db::model::table_name_from_type;
///
/// assert_eq!(table_name_from_type("app::models::FluentUser"), "fluent_user");
/// assert_eq!(table_name_from_type("User"), "user");
/// ```
pub fn table_name_from_type(type_name: &str) -> String {
    let path = type_name.split('<').next().unwrap_or(type_name);
    let last = path.rsplit("::").next().unwrap_or(path);
    UPPERCASE_RUN
        .replace_all(last, "_$0")
        .to_lowercase()
        .trim_start_matches('_')
        .to_string()
}

/// The state embedded in every model.
#[derive(Debug)]
pub struct Record {
    registry: Registry,
    connection: String,
    columns: Row,
    builder: Option<QueryBuilder>,
}

impl Record {
    /// An empty record bound to the default connection of `registry`.
    pub fn new(registry: Registry) -> Self {
        Self::with_columns(registry, Row::new())
    }

    pub fn with_columns(registry: Registry, columns: Row) -> Self {
        Self {
            registry,
            connection: DEFAULT_CONNECTION.to_string(),
            columns,
            builder: None,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    pub fn set_connection(&mut self, name: impl Into<String>) {
        self.connection = name.into();
    }

    pub fn columns(&self) -> &Row {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut Row {
        &mut self.columns
    }

    /// A fresh record sharing this one's registry and connection.
    pub fn sibling(&self, columns: Row) -> Self {
        Self {
            registry: self.registry.clone(),
            connection: self.connection.clone(),
            columns,
            builder: None,
        }
    }

    /// The in-flight builder, created for `table` on first use.
    pub(crate) fn builder_for(&mut self, table: impl FnOnce() -> String) -> &mut QueryBuilder {
        let connection = &self.connection;
        self.builder
            .get_or_insert_with(|| QueryBuilder::new(table()).on(connection.clone()))
    }

    /// Takes the in-flight builder, or a fresh one for `table`.
    pub(crate) fn take_builder(&mut self, table: impl FnOnce() -> String) -> QueryBuilder {
        match self.builder.take() {
            Some(builder) => builder,
            None => QueryBuilder::new(table()).on(self.connection.clone()),
        }
    }

    pub(crate) fn clear_builder(&mut self) {
        self.builder = None;
    }

    pub fn has_builder(&self) -> bool {
        self.builder.is_some()
    }
}

/// A row-shaped value backed by a [`Record`].
///
/// Implementors provide the three record hooks; everything else has a default.
pub trait Model: Sized {
    fn record(&self) -> &Record;

    fn record_mut(&mut self) -> &mut Record;

    /// Builds another value of the same model around `record`.
    ///
    /// Used to materialize query results, so it must carry over whatever
    /// decides the table and primary key.
    fn with_record(&self, record: Record) -> Self;

    /// Table this model is stored in; derived from the type name by default.
    fn table_name(&self) -> String {
        table_name_from_type(std::any::type_name::<Self>())
    }

    fn primary_key_name(&self) -> String {
        DEFAULT_PRIMARY_KEY.to_string()
    }

    fn registry(&self) -> &Registry {
        self.record().registry()
    }

    fn connection_name(&self) -> &str {
        self.record().connection()
    }

    /// Routes every following query of this model to connection `name`.
    fn on(&mut self, name: &str) -> &mut Self {
        let record = self.record_mut();
        record.set_connection(name);
        if let Some(builder) = record.builder.as_mut() {
            builder.set_connection(name);
        }
        self
    }

    fn get_column(&self, name: &str) -> Option<&Value> {
        self.record().columns().get(name)
    }

    fn set_column(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.record_mut()
            .columns_mut()
            .insert(name.to_string(), value.into());
        self
    }

    /// Removes a column so it is no longer written by `save` or `update`.
    fn unset_column(&mut self, name: &str) -> Option<Value> {
        self.record_mut().columns_mut().shift_remove(name)
    }

    fn columns(&self) -> &Row {
        self.record().columns()
    }

    /// Replaces all columns at once.
    fn set_columns(&mut self, columns: Row) {
        *self.record_mut().columns_mut() = columns;
    }

    /// Current primary key value; `None` while the model is not persisted.
    fn primary_key_value(&self) -> Option<&Value> {
        self.get_column(&self.primary_key_name())
            .filter(|value| !value.is_null())
    }
}
