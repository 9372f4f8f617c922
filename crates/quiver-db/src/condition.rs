//! Single-column WHERE conditions.
//!
//! A [`Condition`] is `column operator value(s)`. Column names are quoted for
//! the target dialect; values never touch the SQL text and travel as
//! placeholder parameters instead.

use std::fmt;

use crate::{
    dialect::Dialect,
    error::{DbError, Result},
    traits::Expression,
    value::{Operand, Value},
};

/// Escape character used by every `LIKE` / `NOT LIKE` fragment.
pub const LIKE_ESCAPE: char = '=';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    NotIn,
    Like,
    NotLike,
    IsNull,
    NotNull,
}

/// What an operator expects on its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    Nothing,
    One,
    List,
}

impl Operator {
    pub fn keyword(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Neq => "!=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::IsNull => "IS NULL",
            Operator::NotNull => "IS NOT NULL",
        }
    }

    fn arity(self) -> Arity {
        match self {
            Operator::In | Operator::NotIn => Arity::List,
            Operator::IsNull | Operator::NotNull => Arity::Nothing,
            _ => Arity::One,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One `column operator value` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    column: String,
    operator: Operator,
    operand: Operand,
}

impl Condition {
    /// Builds a condition, rejecting operands that do not fit the operator.
    ///
    /// `IN` / `NOT IN` need a non-empty list, single-value operators refuse a
    /// list. Null checks ignore whatever operand they are given.
    pub fn new(column: impl Into<String>, operator: Operator, operand: Operand) -> Result<Self> {
        let column = column.into();
        let operand = match (operator.arity(), operand) {
            (Arity::Nothing, _) => Operand::None,
            (Arity::List, Operand::List(values)) if values.is_empty() => {
                return Err(DbError::InvalidArgument(format!(
                    "{operator} on column `{column}` needs at least one value"
                )));
            }
            (Arity::List, Operand::List(values)) => Operand::List(values),
            (Arity::List, _) => {
                return Err(DbError::InvalidArgument(format!(
                    "expecting a list of values when using SQL operator {operator}"
                )));
            }
            (Arity::One, Operand::Scalar(value)) => Operand::Scalar(value),
            (Arity::One, Operand::None) => Operand::Scalar(Value::Null),
            (Arity::One, Operand::List(_)) => {
                return Err(DbError::InvalidArgument(format!(
                    "SQL operator {operator} takes a single value, got a list"
                )));
            }
        };

        Ok(Self {
            column,
            operator,
            operand,
        })
    }

    fn single(column: impl Into<String>, operator: Operator, value: Value) -> Self {
        Self {
            column: column.into(),
            operator,
            operand: Operand::Scalar(value),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(column, Operator::Eq, value.into())
    }

    pub fn neq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(column, Operator::Neq, value.into())
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(column, Operator::Lt, value.into())
    }

    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(column, Operator::Lte, value.into())
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(column, Operator::Gt, value.into())
    }

    pub fn gte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(column, Operator::Gte, value.into())
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::single(column, Operator::Like, Value::Text(pattern.into()))
    }

    pub fn not_like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::single(column, Operator::NotLike, Value::Text(pattern.into()))
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            operator: Operator::IsNull,
            operand: Operand::None,
        }
    }

    pub fn not_null(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            operator: Operator::NotNull,
            operand: Operand::None,
        }
    }

    /// `column IN (...)`; fails on an empty list.
    pub fn in_list<T, I>(column: impl Into<String>, values: I) -> Result<Self>
    where
        T: Into<Value>,
        I: IntoIterator<Item = T>,
    {
        let values = values.into_iter().map(Into::into).collect();
        Self::new(column, Operator::In, Operand::List(values))
    }

    /// `column NOT IN (...)`; fails on an empty list.
    pub fn not_in_list<T, I>(column: impl Into<String>, values: I) -> Result<Self>
    where
        T: Into<Value>,
        I: IntoIterator<Item = T>,
    {
        let values = values.into_iter().map(Into::into).collect();
        Self::new(column, Operator::NotIn, Operand::List(values))
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn operand(&self) -> &Operand {
        &self.operand
    }
}

impl Expression for Condition {
    fn render(&self, dialect: Dialect) -> String {
        let column = dialect.quote_identifier(&self.column);
        match (self.operator, &self.operand) {
            (Operator::In | Operator::NotIn, Operand::List(values)) => {
                let placeholders = vec!["?"; values.len()].join(",");
                format!("{column} {} ({placeholders})", self.operator)
            }
            (Operator::IsNull | Operator::NotNull, _) => format!("{column} {}", self.operator),
            (Operator::Like | Operator::NotLike, _) => {
                format!("{column} {} ? ESCAPE '{LIKE_ESCAPE}'", self.operator)
            }
            _ => format!("{column} {} ?", self.operator),
        }
    }

    fn parameters(&self) -> Vec<Value> {
        match &self.operand {
            Operand::None => vec![],
            Operand::Scalar(value) => vec![value.clone()],
            Operand::List(values) => values.clone(),
        }
    }
}

/// Escapes `%`, `_` and the escape character itself so `text` matches
/// literally inside a `LIKE` pattern.
///
/// ```
/// use quiver_db::condition::escape_like;
///
/// assert_eq!(escape_like("100%"), "100=%");
/// assert_eq!(format!("{}%", escape_like("a_b")), "a=_b%");
/// ```
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_') || ch == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_condition() {
        let cond = Condition::gte("age", 18);
        assert_eq!(cond.render(Dialect::Sqlite), "`age` >= ?");
        assert_eq!(cond.parameters(), vec![Value::Integer(18)]);
    }

    #[test]
    fn test_in_condition_placeholders() {
        let cond = Condition::in_list("id", [1, 2, 3]).unwrap();
        assert_eq!(cond.render(Dialect::Postgres), r#""id" IN (?,?,?)"#);
        assert_eq!(cond.parameters().len(), 3);

        let cond = Condition::not_in_list("name", ["a"]).unwrap();
        assert_eq!(cond.render(Dialect::MySql), "`name` NOT IN (?)");
    }

    #[test]
    fn test_in_rejects_empty_list() {
        let result = Condition::in_list::<i64, _>("id", []);
        assert!(matches!(result, Err(DbError::InvalidArgument(_))));

        let result = Condition::not_in_list::<i64, _>("id", vec![]);
        assert!(matches!(result, Err(DbError::InvalidArgument(_))));
    }

    #[test]
    fn test_in_rejects_scalar() {
        let result = Condition::new("id", Operator::In, Operand::Scalar(1.into()));
        assert!(matches!(result, Err(DbError::InvalidArgument(_))));
    }

    #[test]
    fn test_scalar_operator_rejects_list() {
        let result = Condition::new("id", Operator::Eq, Operand::List(vec![1.into()]));
        assert!(matches!(result, Err(DbError::InvalidArgument(_))));
    }

    #[test]
    fn test_null_checks_carry_no_parameter() {
        let cond = Condition::new("deleted_at", Operator::IsNull, Operand::Scalar("x".into()))
            .unwrap();
        assert_eq!(cond.render(Dialect::Sqlite), "`deleted_at` IS NULL");
        assert!(cond.parameters().is_empty());

        let cond = Condition::not_null("deleted_at");
        assert_eq!(cond.render(Dialect::Postgres), r#""deleted_at" IS NOT NULL"#);
        assert!(cond.parameters().is_empty());
    }

    #[test]
    fn test_like_has_escape_clause() {
        let cond = Condition::like("name", "J%");
        assert_eq!(cond.render(Dialect::Sqlite), "`name` LIKE ? ESCAPE '='");
        assert_eq!(cond.parameters(), vec![Value::Text("J%".into())]);

        let cond = Condition::not_like("name", "J%");
        assert_eq!(cond.render(Dialect::Sqlite), "`name` NOT LIKE ? ESCAPE '='");
    }

    #[test]
    fn test_compound_column_is_quoted_per_segment() {
        let cond = Condition::eq("user.name", "x");
        assert_eq!(cond.render(Dialect::Postgres), r#""user"."name" = ?"#);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%_off"), "50=%=_off");
        assert_eq!(escape_like("a=b"), "a==b");
    }
}
