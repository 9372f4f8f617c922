//! Chainable filters on models.
//!
//! Filter and modifier methods lazily create the model's [`QueryBuilder`] and
//! return the model itself so calls chain. Terminal methods (`fetch`, `all`,
//! `one`, `count`, `update_all`, `delete_all`) execute the accumulated query
//! and always drop the builder, whether the query succeeded or not; the next
//! filter starts from scratch.
//!
//! ```rust
//! use quiver_db::{define_model, prelude::*, ConnectOptions, Registry};
//!
//! define_model!(User);
//!
//! let registry = Registry::new();
//! registry.connect("sqlite::memory:", "", "", &ConnectOptions::default()).unwrap();
//! registry
//!     .execute("CREATE TABLE user (id INTEGER PRIMARY KEY, name TEXT)", &[])
//!     .unwrap();
//!
//! for name in ["John", "Jane", "Mark"] {
//!     let mut user = User::new(registry.clone());
//!     user.set_column("name", name);
//!     user.save().unwrap();
//! }
//!
//! let users = User::new(registry.clone()).like("name", "J%").all().unwrap();
//! assert_eq!(users.len(), 2);
//! ```

use crate::{
    builder::{Order, QueryBuilder, QueryKind},
    condition::Condition,
    error::{DbError, Result},
    model::Model,
    traits::Expression,
    value::{Row, Value},
};

/// Query-building methods available on every [`Model`].
pub trait Fluent: Model {
    /// The in-flight builder, created on first use.
    fn query_builder(&mut self) -> &mut QueryBuilder {
        let table = self.table_name();
        self.record_mut().builder_for(|| table)
    }

    /// Discards the in-flight builder.
    fn reset(&mut self) -> &mut Self {
        self.record_mut().clear_builder();
        self
    }

    /// Adds any [`Expression`] as a condition.
    fn filter<E: Expression + Send + 'static>(&mut self, expr: E) -> &mut Self {
        self.query_builder().add_where(expr);
        self
    }

    fn eq(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.filter(Condition::eq(column, value))
    }

    /// Same as [`Fluent::eq`].
    fn r#where(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.eq(column, value)
    }

    fn neq(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.filter(Condition::neq(column, value))
    }

    fn lt(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.filter(Condition::lt(column, value))
    }

    fn lte(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.filter(Condition::lte(column, value))
    }

    fn gt(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.filter(Condition::gt(column, value))
    }

    fn gte(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.filter(Condition::gte(column, value))
    }

    /// `column IN (...)`; an empty list is rejected before anything is added.
    fn in_<T, I>(&mut self, column: &str, values: I) -> Result<&mut Self>
    where
        T: Into<Value>,
        I: IntoIterator<Item = T>,
    {
        let condition = Condition::in_list(column, values)?;
        Ok(self.filter(condition))
    }

    fn not_in<T, I>(&mut self, column: &str, values: I) -> Result<&mut Self>
    where
        T: Into<Value>,
        I: IntoIterator<Item = T>,
    {
        let condition = Condition::not_in_list(column, values)?;
        Ok(self.filter(condition))
    }

    /// `column LIKE pattern`, with `=` as the escape character.
    fn like(&mut self, column: &str, pattern: impl Into<String>) -> &mut Self {
        self.filter(Condition::like(column, pattern))
    }

    fn not_like(&mut self, column: &str, pattern: impl Into<String>) -> &mut Self {
        self.filter(Condition::not_like(column, pattern))
    }

    fn is_null(&mut self, column: &str) -> &mut Self {
        self.filter(Condition::is_null(column))
    }

    fn not_null(&mut self, column: &str) -> &mut Self {
        self.filter(Condition::not_null(column))
    }

    fn limit(&mut self, limit: u64) -> &mut Self {
        self.query_builder().set_limit(limit);
        self
    }

    fn offset(&mut self, offset: u64) -> &mut Self {
        self.query_builder().set_offset(offset);
        self
    }

    fn page(&mut self, page: u64, per_page: u64) -> &mut Self {
        self.query_builder().page(page, per_page);
        self
    }

    fn order_asc(&mut self, column: &str) -> &mut Self {
        self.query_builder().push_order(column, Order::Asc);
        self
    }

    fn order_desc(&mut self, column: &str) -> &mut Self {
        self.query_builder().push_order(column, Order::Desc);
        self
    }

    /// Orders by `column`; `direction` must be `ASC` or `DESC`.
    fn order_by(&mut self, column: &str, direction: &str) -> Result<&mut Self> {
        self.query_builder().add_order(column, direction)?;
        Ok(self)
    }

    /// Loads the first matching row into this model.
    ///
    /// With `primary_key`, earlier filters are discarded and the row is looked
    /// up by primary key alone. On a hit the columns are replaced and `true` is
    /// returned; on a miss the columns are cleared and `false` is returned.
    fn fetch(&mut self, primary_key: Option<Value>) -> Result<bool> {
        if let Some(pk) = primary_key {
            let pk_name = self.primary_key_name();
            self.reset().eq(&pk_name, pk);
        }
        self.limit(1);

        let builder = take_builder(self);
        let row = builder.execute(self.registry())?.fetch();
        let found = row.is_some();
        self.set_columns(row.unwrap_or_default());
        Ok(found)
    }

    /// Every matching row, each as a new model.
    fn all(&mut self) -> Result<Vec<Self>> {
        let builder = take_builder(self);
        let cursor = builder.execute(self.registry())?;
        Ok(cursor.map(|row| self.materialize(row)).collect())
    }

    /// The first matching row as a new model, or `None`.
    fn one(&mut self) -> Result<Option<Self>> {
        self.limit(1);
        let builder = take_builder(self);
        let row = builder.execute(self.registry())?.fetch();
        Ok(row.map(|row| self.materialize(row)))
    }

    /// Number of matching rows.
    ///
    /// # Errors
    ///
    /// Besides driver failures, [`DbError::Execution`] when the driver answers
    /// the COUNT with anything but one non-negative integer.
    fn count(&mut self) -> Result<u64> {
        let mut builder = take_builder(self);
        builder.set_kind(QueryKind::Count);
        let table = builder.table().to_string();
        match builder.execute(self.registry())?.fetch_column() {
            Some(Value::Integer(count)) if count >= 0 => Ok(count.unsigned_abs()),
            Some(other) => Err(DbError::execution(format!(
                "COUNT on `{table}` returned {other} instead of a row count"
            ))),
            None => Err(DbError::execution(format!(
                "COUNT on `{table}` returned no row"
            ))),
        }
    }

    /// Writes every column this model holds to all matching rows and returns
    /// how many were affected.
    ///
    /// Without any filter this updates the whole table.
    fn update_all(&mut self) -> Result<usize> {
        let mut builder = take_builder(self);
        builder.set_kind(QueryKind::Update);
        builder.set_row_data(self.columns().clone());
        Ok(builder.execute(self.registry())?.rows_affected())
    }

    /// Deletes all matching rows and returns how many were affected.
    ///
    /// Without any filter this empties the whole table.
    fn delete_all(&mut self) -> Result<usize> {
        let mut builder = take_builder(self);
        builder.set_kind(QueryKind::Delete);
        Ok(builder.execute(self.registry())?.rows_affected())
    }

    /// Wraps a result row in a new model sharing this one's connection.
    fn materialize(&self, row: Row) -> Self {
        self.with_record(self.record().sibling(row))
    }
}

impl<M: Model> Fluent for M {}

fn take_builder<M: Model>(model: &mut M) -> QueryBuilder {
    let table = model.table_name();
    model.record_mut().take_builder(|| table)
}
