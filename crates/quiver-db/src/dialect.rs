//! SQL dialects and identifier quoting.
//!
//! A [`Dialect`] decides the identifier quote character and how row limits and
//! offsets are spelled. Everything else the builder emits is shared across
//! dialects.

use std::{fmt, str::FromStr};

use crate::error::DbError;

/// How a dialect restricts the number of returned rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitStyle {
    /// `SELECT TOP n * FROM t`, no trailing clause.
    Top,
    /// `... LIMIT n`
    Limit,
    /// `... ROWS n`
    Rows,
}

/// A database engine's SQL syntax variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    MySql,
    Sqlite,
    Postgres,
    MsSql,
    Firebird,
    Sybase,
}

impl Dialect {
    /// Maps a DSN driver prefix (`sqlite`, `pgsql`, `sqlsrv`, ...) to a dialect.
    pub fn from_driver(driver: &str) -> Option<Self> {
        let dialect = match driver.to_ascii_lowercase().as_str() {
            "mysql" => Dialect::MySql,
            "sqlite" | "sqlite2" | "sqlite3" => Dialect::Sqlite,
            "pgsql" | "postgres" | "postgresql" => Dialect::Postgres,
            "sqlsrv" | "dblib" | "mssql" => Dialect::MsSql,
            "firebird" => Dialect::Firebird,
            "sybase" => Dialect::Sybase,
            _ => return None,
        };
        Some(dialect)
    }

    pub fn name(self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
            Dialect::Postgres => "postgres",
            Dialect::MsSql => "mssql",
            Dialect::Firebird => "firebird",
            Dialect::Sybase => "sybase",
        }
    }

    pub fn quote_character(self) -> char {
        match self {
            Dialect::Postgres | Dialect::MsSql | Dialect::Firebird | Dialect::Sybase => '"',
            Dialect::MySql | Dialect::Sqlite => '`',
        }
    }

    pub fn limit_style(self) -> LimitStyle {
        match self {
            Dialect::MsSql => LimitStyle::Top,
            Dialect::Firebird => LimitStyle::Rows,
            _ => LimitStyle::Limit,
        }
    }

    /// Body of an INSERT that sets no column at all.
    pub(crate) fn empty_insert(self) -> &'static str {
        match self {
            Dialect::MySql => "() VALUES ()",
            _ => "DEFAULT VALUES",
        }
    }

    /// Quotes an identifier, treating each dot-separated segment separately.
    ///
    /// `*` is left as is and embedded quote characters are doubled.
    ///
    /// ```
    /// use quiver_db::Dialect;
    ///
    /// assert_eq!(Dialect::Postgres.quote_identifier("user.name"), r#""user"."name""#);
    /// assert_eq!(Dialect::Sqlite.quote_identifier("user.*"), "`user`.*");
    /// ```
    pub fn quote_identifier(self, identifier: &str) -> String {
        identifier
            .split('.')
            .map(|part| self.quote_segment(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Quotes each identifier and joins them with `,`.
    pub fn quote_list<S: AsRef<str>>(self, identifiers: &[S]) -> String {
        identifiers
            .iter()
            .map(|ident| self.quote_identifier(ident.as_ref()))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn quote_segment(self, segment: &str) -> String {
        if segment == "*" {
            return segment.to_string();
        }
        let quote = self.quote_character();
        let escaped = segment.replace(quote, &format!("{quote}{quote}"));
        format!("{quote}{escaped}{quote}")
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::from_driver(s).ok_or_else(|| DbError::UnsupportedDriver(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_names() {
        assert_eq!(Dialect::from_driver("pgsql"), Some(Dialect::Postgres));
        assert_eq!(Dialect::from_driver("dblib"), Some(Dialect::MsSql));
        assert_eq!(Dialect::from_driver("SQLite"), Some(Dialect::Sqlite));
        assert_eq!(Dialect::from_driver("oracle"), None);
        assert!(matches!(
            "oracle".parse::<Dialect>(),
            Err(DbError::UnsupportedDriver(_))
        ));
    }

    #[test]
    fn test_quote_character_per_dialect() {
        assert_eq!(Dialect::MySql.quote_character(), '`');
        assert_eq!(Dialect::Sqlite.quote_character(), '`');
        assert_eq!(Dialect::Postgres.quote_character(), '"');
        assert_eq!(Dialect::MsSql.quote_character(), '"');
        assert_eq!(Dialect::Firebird.quote_character(), '"');
        assert_eq!(Dialect::Sybase.quote_character(), '"');
    }

    #[test]
    fn test_quote_compound_identifier() {
        assert_eq!(Dialect::MySql.quote_identifier("db.user"), "`db`.`user`");
        assert_eq!(Dialect::MySql.quote_identifier("*"), "*");
        assert_eq!(Dialect::Postgres.quote_identifier("t.*"), r#""t".*"#);
    }

    #[test]
    fn test_quote_escapes_embedded_quotes() {
        assert_eq!(Dialect::Sqlite.quote_identifier("we`ird"), "`we``ird`");
        assert_eq!(Dialect::Postgres.quote_identifier(r#"a"b"#), r#""a""b""#);
    }

    #[test]
    fn test_quote_list() {
        assert_eq!(Dialect::Sqlite.quote_list(&["id", "name"]), "`id`,`name`");
        assert_eq!(Dialect::Sqlite.quote_list::<&str>(&[]), "");
    }

    #[test]
    fn test_limit_styles() {
        assert_eq!(Dialect::MsSql.limit_style(), LimitStyle::Top);
        assert_eq!(Dialect::Firebird.limit_style(), LimitStyle::Rows);
        assert_eq!(Dialect::Sybase.limit_style(), LimitStyle::Limit);
        assert_eq!(Dialect::Sqlite.limit_style(), LimitStyle::Limit);
    }
}
