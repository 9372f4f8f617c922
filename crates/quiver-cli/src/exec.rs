use nu_ansi_term::Color::{Cyan, Green};
use quiver_db::{Cursor, Registry, Row};
use tracing::{debug, info};

use crate::{
    error::CliResult,
    utils::{parse_literal, print_rows, Colored},
};

/// Runs raw SQL with positional parameters read as literals.
pub fn run_sql(
    registry: &Registry,
    connection: &str,
    sql: &str,
    params: &[String],
) -> CliResult<Cursor> {
    let params = params.iter().map(|raw| parse_literal(raw)).collect::<Vec<_>>();
    debug!(connection, sql, param_count = params.len(), "executing raw sql");
    Ok(registry.execute_on(connection, sql, &params)?)
}

pub fn exec_sql(
    registry: &Registry,
    connection: &str,
    sql: &str,
    params: &[String],
    json: bool,
) -> CliResult<()> {
    let cursor = run_sql(registry, connection, sql, params)?;

    if !cursor.columns().is_empty() {
        let rows = cursor.collect::<Vec<Row>>();
        return print_rows(&rows, json);
    }

    if json {
        let output = serde_json::json!({
            "rows_affected": cursor.rows_affected(),
            "last_insert_id": cursor.last_insert_id(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    info!(
        "{} row(s) affected",
        Colored(Green, cursor.rows_affected())
    );
    if let Some(id) = cursor.last_insert_id() {
        info!("Last insert id: {}", Colored(Cyan, id));
    }
    Ok(())
}
