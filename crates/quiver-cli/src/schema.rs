use nu_ansi_term::Color::Cyan;
use quiver_db::{inspector_for, Registry};
use tracing::info;

use crate::{error::CliResult, utils::Colored};

fn print_names(names: &[String], json: bool) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(names)?);
        return Ok(());
    }
    for name in names {
        info!("{}", Colored(Cyan, name));
    }
    Ok(())
}

pub fn list_tables(registry: &Registry, connection: &str, json: bool) -> CliResult<()> {
    let tables = inspector_for(registry, connection)?.tables()?;
    if tables.is_empty() && !json {
        info!("No tables on {connection}");
        return Ok(());
    }
    print_names(&tables, json)
}

pub fn list_columns(registry: &Registry, connection: &str, table: &str, json: bool) -> CliResult<()> {
    let columns = inspector_for(registry, connection)?.columns_of(table)?;
    if columns.is_empty() && !json {
        info!("Table {table} has no columns or does not exist");
        return Ok(());
    }
    print_names(&columns, json)
}
