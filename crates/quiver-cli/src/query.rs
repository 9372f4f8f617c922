use quiver_db::{DynamicModel, Fluent, Model, Registry, Row};
use tracing::debug;

use crate::{
    cli::FilterArgs,
    error::CliResult,
    utils::{parse_literal, print_rows},
};

/// Runs a filtered SELECT through a [`DynamicModel`] bound to `table`.
///
/// With `get`, the filters are narrowed to the row whose `primary_key` equals
/// that value and at most one row comes back.
pub fn select_rows(
    registry: &Registry,
    connection: &str,
    table: &str,
    primary_key: &str,
    get: Option<&str>,
    filters: &FilterArgs,
) -> CliResult<Vec<Row>> {
    let mut model = DynamicModel::create(registry.clone(), table, Some(primary_key), Row::new());
    model.on(connection);
    filters.apply_to_model(&mut model)?;

    let rows = match get {
        Some(raw) => {
            let pk_name = model.primary_key_name();
            model.eq(&pk_name, parse_literal(raw));
            if model.fetch(None)? {
                vec![model.columns().clone()]
            } else {
                Vec::new()
            }
        }
        None => model
            .all()?
            .into_iter()
            .map(|record| record.columns().clone())
            .collect(),
    };
    debug!(table, connection, count = rows.len(), "query finished");
    Ok(rows)
}

pub fn query_table(
    registry: &Registry,
    connection: &str,
    table: &str,
    primary_key: &str,
    get: Option<&str>,
    filters: &FilterArgs,
    json: bool,
) -> CliResult<()> {
    let rows = select_rows(registry, connection, table, primary_key, get, filters)?;
    print_rows(&rows, json)
}

#[cfg(test)]
mod tests {
    use quiver_db::{ConnectOptions, Value};

    use super::*;

    fn registry() -> Registry {
        let registry = Registry::new();
        registry
            .connect_as("local", "sqlite::memory:", "", "", &ConnectOptions::default())
            .unwrap();
        registry
            .execute_on(
                "local",
                "CREATE TABLE person (person_id INTEGER PRIMARY KEY, name TEXT, age INTEGER)",
                &[],
            )
            .unwrap();
        for (name, age) in [("Ann", 31), ("Bob", 17), ("Cid", 45)] {
            registry
                .execute_on(
                    "local",
                    "INSERT INTO person (name, age) VALUES (?, ?)",
                    &[name.into(), age.into()],
                )
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_select_rows_with_filters() {
        let registry = registry();
        let filters = FilterArgs {
            gte: vec!["age=18".into()],
            order: vec!["age:desc".into()],
            ..Default::default()
        };

        let rows =
            select_rows(&registry, "local", "person", "person_id", None, &filters).unwrap();
        let names = rows.iter().map(|row| row["name"].clone()).collect::<Vec<_>>();
        assert_eq!(names, vec![Value::from("Cid"), Value::from("Ann")]);
    }

    #[test]
    fn test_get_by_primary_key() {
        let registry = registry();

        let rows = select_rows(
            &registry,
            "local",
            "person",
            "person_id",
            Some("2"),
            &FilterArgs::default(),
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], Value::from("Bob"));

        // the filters still apply
        let adults = FilterArgs {
            gte: vec!["age=18".into()],
            ..Default::default()
        };
        let rows =
            select_rows(&registry, "local", "person", "person_id", Some("2"), &adults).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_select_rows_unknown_connection() {
        let registry = registry();
        let err = select_rows(&registry, "missing", "person", "id", None, &FilterArgs::default());
        assert!(err.is_err());
    }
}
