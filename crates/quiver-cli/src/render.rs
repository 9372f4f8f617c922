use nu_ansi_term::Color::{Cyan, Green};
use quiver_db::{Dialect, QueryBuilder, QueryKind, Value};
use tracing::{debug, info};

use crate::{cli::FilterArgs, cli::RenderKind, error::CliResult, utils::Colored};

impl From<RenderKind> for QueryKind {
    fn from(kind: RenderKind) -> Self {
        match kind {
            RenderKind::Select => QueryKind::Select,
            RenderKind::Delete => QueryKind::Delete,
            RenderKind::Count => QueryKind::Count,
        }
    }
}

/// Builds the statement without a connection and returns it for `dialect`.
pub fn render_sql(
    dialect: Dialect,
    table: &str,
    kind: RenderKind,
    filters: &FilterArgs,
) -> CliResult<(String, Vec<Value>)> {
    let mut builder = QueryBuilder::new(table);
    builder.set_kind(kind.into());
    filters.apply_to_builder(&mut builder)?;
    Ok(builder.build_sql(dialect)?)
}

pub fn render_query(
    dialect: &str,
    table: &str,
    kind: RenderKind,
    filters: &FilterArgs,
    json: bool,
) -> CliResult<()> {
    let dialect: Dialect = dialect.parse()?;
    debug!(%dialect, table, ?kind, "rendering query");

    let (sql, params) = render_sql(dialect, table, kind, filters)?;

    if json {
        let output = serde_json::json!({
            "dialect": dialect.name(),
            "sql": sql,
            "params": params,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    info!("{}", Colored(Green, &sql));
    for (idx, param) in params.iter().enumerate() {
        info!("  {} {param}", Colored(Cyan, format!("?{}", idx + 1)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use quiver_db::DbError;

    use super::*;
    use crate::error::CliError;

    fn limited(limit: u64, offset: Option<u64>) -> FilterArgs {
        FilterArgs {
            eq: vec!["status=active".into()],
            limit: Some(limit),
            offset,
            ..Default::default()
        }
    }

    #[test]
    fn test_render_count_ignores_paging() {
        let (sql, params) =
            render_sql(Dialect::Sqlite, "user", RenderKind::Count, &limited(10, Some(20))).unwrap();
        assert_eq!(sql, "SELECT COUNT(*) FROM `user` WHERE `status` = ?");
        assert_eq!(params, vec![Value::Text("active".into())]);
    }

    #[test]
    fn test_render_top_dialects() {
        let (sql, _) =
            render_sql(Dialect::MsSql, "user", RenderKind::Select, &limited(3, None)).unwrap();
        assert_eq!(sql, r#"SELECT TOP 3 * FROM "user" WHERE "status" = ?"#);

        let err = render_sql(Dialect::MsSql, "user", RenderKind::Delete, &limited(3, None))
            .unwrap_err();
        assert!(matches!(err, CliError::Db(DbError::UnsupportedOperation(_))));
    }

    #[test]
    fn test_render_firebird_rows() {
        let (sql, _) =
            render_sql(Dialect::Firebird, "user", RenderKind::Select, &limited(5, Some(10)))
                .unwrap();
        assert_eq!(sql, r#"SELECT * FROM "user" WHERE "status" = ? ROWS 5 TO 10"#);
    }

    #[test]
    fn test_render_unknown_dialect() {
        let err = render_query("oracle", "user", RenderKind::Select, &FilterArgs::default(), true)
            .unwrap_err();
        assert!(matches!(err, CliError::Db(DbError::UnsupportedDriver(_))));
    }
}
