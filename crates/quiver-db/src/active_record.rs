//! Persistence of a single model.
//!
//! A model is *transient* until [`ActiveRecord::save`] gives it a primary key,
//! *persisted* afterwards, and stays deleted once [`ActiveRecord::delete`] has
//! removed its row.

use tracing::debug;

use crate::{
    builder::{QueryBuilder, QueryKind},
    error::{DbError, Result},
    fluent::Fluent,
    model::Model,
    value::Value,
};

/// Save, update, delete and load one model by primary key.
pub trait ActiveRecord: Fluent {
    /// Inserts every column currently set, then stores the id reported by the
    /// database in the primary key column.
    ///
    /// A primary key that is already set is inserted like any other column;
    /// unset it first to let the database assign one. Driver failures such as
    /// constraint violations are returned unchanged.
    fn save(&mut self) -> Result<()> {
        let mut builder = QueryBuilder::new(self.table_name()).on(self.connection_name());
        builder.set_kind(QueryKind::Insert);
        builder.set_row_data(self.columns().clone());

        let cursor = builder.execute(self.registry())?;
        if let Some(id) = cursor.last_insert_id().cloned() {
            let pk_name = self.primary_key_name();
            debug!(table = %builder.table(), pk = %id, "saved");
            self.set_column(&pk_name, id);
        }
        Ok(())
    }

    /// Writes every column this model holds to its own row and returns the
    /// number of affected rows.
    ///
    /// Columns that were never set or fetched are not written.
    fn update(&mut self) -> Result<usize> {
        let pk = self.require_primary_key("update")?;
        let pk_name = self.primary_key_name();
        self.reset().eq(&pk_name, pk).update_all()
    }

    /// Deletes this model's row; returns whether a row was removed.
    fn delete(&mut self) -> Result<bool> {
        let pk = self.require_primary_key("delete")?;
        let pk_name = self.primary_key_name();
        Ok(self.reset().eq(&pk_name, pk).delete_all()? > 0)
    }

    /// Loads the row with primary key `pk`, replacing every column.
    ///
    /// Returns `false` and clears the columns when no row matches.
    fn get(&mut self, pk: impl Into<Value>) -> Result<bool> {
        self.fetch(Some(pk.into()))
    }

    fn require_primary_key(&self, action: &str) -> Result<Value> {
        self.primary_key_value().cloned().ok_or_else(|| {
            DbError::InvalidArgument(format!(
                "cannot {action} a `{}` row without a value for primary key `{}`",
                self.table_name(),
                self.primary_key_name()
            ))
        })
    }
}

impl<M: Model> ActiveRecord for M {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        connection::{tests::RecordingDriver, Registry},
        define_model,
        dialect::Dialect,
        driver::Cursor,
    };

    define_model!(Person, table = "people", primary_key = "person_id");

    fn recording(response: Cursor) -> (Registry, RecordingDriver) {
        let registry = Registry::new();
        let driver = RecordingDriver {
            response,
            ..Default::default()
        };
        registry.attach("default", Dialect::Postgres, Box::new(driver.clone()));
        (registry, driver)
    }

    #[test]
    fn test_save_sets_primary_key_from_last_insert_id() {
        let (registry, driver) = recording(Cursor::from_affected(1, Some(Value::Integer(42))));
        let mut person = Person::new(registry);
        person.set_column("name", "John");

        person.save().unwrap();

        assert_eq!(person.primary_key_value(), Some(&Value::Integer(42)));
        let statements = driver.statements.lock().unwrap();
        assert_eq!(statements[0].0, r#"INSERT INTO "people" ("name") VALUES (?)"#);
    }

    #[test]
    fn test_update_writes_all_columns_restricted_by_pk() {
        let (registry, driver) = recording(Cursor::from_affected(1, None));
        let mut person = Person::new(registry);
        person.set_column("person_id", 5).set_column("name", "Jane");

        assert_eq!(person.update().unwrap(), 1);

        let statements = driver.statements.lock().unwrap();
        assert_eq!(
            statements[0].0,
            r#"UPDATE "people" SET "person_id" = ?,"name" = ? WHERE "person_id" = ?"#
        );
        assert_eq!(
            statements[0].1,
            vec![Value::Integer(5), Value::Text("Jane".into()), Value::Integer(5)]
        );
    }

    #[test]
    fn test_update_ignores_pending_filters() {
        let (registry, driver) = recording(Cursor::from_affected(1, None));
        let mut person = Person::new(registry);
        person.set_column("person_id", 5);
        person.like("name", "J%");

        person.update().unwrap();

        let statements = driver.statements.lock().unwrap();
        assert_eq!(
            statements[0].0,
            r#"UPDATE "people" SET "person_id" = ? WHERE "person_id" = ?"#
        );
    }

    #[test]
    fn test_update_and_delete_need_primary_key() {
        let (registry, driver) = recording(Cursor::default());
        let mut person = Person::new(registry);
        person.set_column("name", "ghost");

        assert!(matches!(person.update(), Err(DbError::InvalidArgument(_))));
        assert!(matches!(person.delete(), Err(DbError::InvalidArgument(_))));
        assert!(driver.statements.lock().unwrap().is_empty());
    }

    #[test]
    fn test_delete_reports_whether_row_was_removed() {
        let (registry, driver) = recording(Cursor::from_affected(0, None));
        let mut person = Person::new(registry);
        person.set_column("person_id", 9);

        assert!(!person.delete().unwrap());
        let statements = driver.statements.lock().unwrap();
        assert_eq!(statements[0].0, r#"DELETE FROM "people" WHERE "person_id" = ?"#);
    }
}
