use clap::Parser;
use cli::{Args, Commands};
use error::CliResult;
use exec::exec_sql;
use logging::setup_logging;
use query::query_table;
use quiver_config::config::Config;
use quiver_db::{ConnectOptions, Registry};
use render::render_query;
use schema::{list_columns, list_tables};
use tracing::debug;
use utils::disable_color;

mod cli;
mod error;
mod exec;
mod filter;
mod logging;
mod query;
mod render;
mod schema;
mod utils;

/// Opens the selected connection from the configuration file.
///
/// Returns the registry holding it along with the connection's name.
fn connect(args: &Args) -> CliResult<(Registry, String)> {
    let config = Config::load(args.config.as_deref())?;
    let name = args
        .connection
        .clone()
        .unwrap_or_else(|| config.default_connection.clone());
    let settings = config.get_connection(&name)?;
    let password = settings.password(&name)?;

    let options = ConnectOptions {
        read_only: settings.read_only,
        busy_timeout: settings.busy_timeout(),
    };
    debug!(connection = %name, read_only = options.read_only, "opening connection");

    let registry = Registry::new();
    registry.connect_as(&name, &settings.dsn, &settings.username, &password, &options)?;
    Ok((registry, name))
}

fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        disable_color();
    }

    debug!("starting");

    match &args.command {
        Commands::Render {
            dialect,
            table,
            kind,
            filters,
        } => render_query(dialect, table, *kind, filters, args.json)?,
        Commands::Query {
            table,
            primary_key,
            get,
            filters,
        } => {
            let (registry, name) = connect(&args)?;
            query_table(
                &registry,
                &name,
                table,
                primary_key,
                get.as_deref(),
                filters,
                args.json,
            )?;
        }
        Commands::Exec { sql, params } => {
            let (registry, name) = connect(&args)?;
            exec_sql(&registry, &name, sql, params, args.json)?;
        }
        Commands::Tables => {
            let (registry, name) = connect(&args)?;
            list_tables(&registry, &name, args.json)?;
        }
        Commands::Columns { table } => {
            let (registry, name) = connect(&args)?;
            list_columns(&registry, &name, table, args.json)?;
        }
    }

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use quiver_config::error::ConfigError;

    use super::*;
    use crate::error::CliError;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_connect_uses_selected_connection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiver.toml");
        let db = dir.path().join("app.db");
        fs::write(
            &path,
            format!(
                "default_connection = \"main\"\n\
                 [connections.main]\ndsn = \"sqlite::memory:\"\n\
                 [connections.disk]\ndsn = \"sqlite:{}\"\nbusy_timeout = 250\n",
                db.display()
            ),
        )
        .unwrap();
        let config = path.to_str().unwrap();

        let (registry, name) = connect(&args(&["quiver", "-c", config, "tables"])).unwrap();
        assert_eq!(name, "main");
        assert!(registry.has_connection("main"));

        let (registry, name) =
            connect(&args(&["quiver", "-c", config, "-C", "disk", "tables"])).unwrap();
        assert_eq!(name, "disk");
        assert!(registry.has_connection("disk"));
        assert!(!registry.has_connection("main"));
        assert!(db.exists());
    }

    #[test]
    fn test_connect_unknown_connection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiver.toml");
        fs::write(&path, "[connections.default]\ndsn = \"sqlite::memory:\"\n").unwrap();

        let err = connect(&args(&[
            "quiver",
            "-c",
            path.to_str().unwrap(),
            "-C",
            "nope",
            "tables",
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            CliError::Config(ConfigError::MissingConnection(_))
        ));
    }

    #[test]
    fn test_args_parse_query_alias() {
        let parsed = args(&["quiver", "q", "-t", "user", "--eq", "id=1", "--limit", "1"]);
        match parsed.command {
            Commands::Query {
                table,
                primary_key,
                get,
                filters,
            } => {
                assert_eq!(table, "user");
                assert_eq!(primary_key, "id");
                assert_eq!(get, None);
                assert_eq!(filters.eq, vec!["id=1".to_string()]);
                assert_eq!(filters.limit, Some(1));
            }
            _ => panic!("expected query"),
        }

        let parsed = args(&["quiver", "query", "-t", "person", "--primary-key", "person_id", "-g", "7"]);
        match parsed.command {
            Commands::Query { primary_key, get, .. } => {
                assert_eq!(primary_key, "person_id");
                assert_eq!(get.as_deref(), Some("7"));
            }
            _ => panic!("expected query"),
        }
    }
}
