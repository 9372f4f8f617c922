use std::{
    fmt::Display,
    sync::{LazyLock, PoisonError, RwLock},
};

use nu_ansi_term::Color::{self, Cyan};
use quiver_db::{Row, Value};
use tabled::{builder::Builder, settings::Style};
use tracing::info;

use crate::error::{CliError, CliResult};

pub static COLOR: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let color = COLOR.read().unwrap_or_else(PoisonError::into_inner);
        if *color {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}

pub fn disable_color() {
    *COLOR.write().unwrap_or_else(PoisonError::into_inner) = false;
}

/// `[+-]digits[.digits]`, with digits on at least one side of the point.
fn is_plain_decimal(raw: &str) -> bool {
    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    !(int.is_empty() && frac.is_empty())
        && int.bytes().all(|b| b.is_ascii_digit())
        && frac.bytes().all(|b| b.is_ascii_digit())
}

/// Reads a command line literal: integer, then plain decimal, then `null`,
/// else text.
///
/// Exponents, `inf` and `nan` stay text.
pub fn parse_literal(raw: &str) -> Value {
    if let Ok(v) = raw.parse::<i64>() {
        return Value::Integer(v);
    }
    if is_plain_decimal(raw) {
        if let Ok(v) = raw.parse::<f64>() {
            return Value::Real(v);
        }
    }
    if raw.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    Value::Text(raw.to_string())
}

/// Splits `column=value` at the first `=`.
pub fn split_pair(raw: &str) -> CliResult<(&str, &str)> {
    match raw.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => Ok((column.trim(), value)),
        _ => Err(CliError::InvalidFilter(raw.to_string())),
    }
}

/// Prints rows as a table, or as a JSON array in json mode.
pub fn print_rows(rows: &[Row], json: bool) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }

    let Some(first) = rows.first() else {
        info!("No rows");
        return Ok(());
    };

    let mut builder = Builder::new();
    builder.push_record(
        first
            .keys()
            .map(|column| format!("{}", Colored(Cyan, column))),
    );
    for row in rows {
        builder.push_record(row.values().map(|value| value.to_string()));
    }

    let table = builder.build().with(Style::rounded()).to_string();
    info!("\n{table}");
    info!("{} row(s)", rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_literal() {
        assert_eq!(parse_literal("42"), Value::Integer(42));
        assert_eq!(parse_literal("-1"), Value::Integer(-1));
        assert_eq!(parse_literal("2.5"), Value::Real(2.5));
        assert_eq!(parse_literal("NULL"), Value::Null);
        assert_eq!(parse_literal("John"), Value::Text("John".into()));
        assert_eq!(parse_literal(""), Value::Text(String::new()));
    }

    #[test]
    fn test_parse_literal_keeps_float_lookalikes_as_text() {
        for raw in ["NaN", "nan", "inf", "-Infinity", "1e3", ".", "-", "1.2.3"] {
            assert_eq!(parse_literal(raw), Value::Text(raw.into()), "{raw}");
        }
        assert_eq!(parse_literal(".5"), Value::Real(0.5));
        assert_eq!(parse_literal("-3."), Value::Real(-3.0));
        assert_eq!(parse_literal("+1.25"), Value::Real(1.25));
    }

    #[test]
    fn test_split_pair() {
        assert_eq!(split_pair("name=John").unwrap(), ("name", "John"));
        assert_eq!(split_pair("expr=a=b").unwrap(), ("expr", "a=b"));
        assert_eq!(split_pair("name=").unwrap(), ("name", ""));
        assert!(matches!(split_pair("name"), Err(CliError::InvalidFilter(_))));
        assert!(matches!(split_pair("=x"), Err(CliError::InvalidFilter(_))));
    }
}
