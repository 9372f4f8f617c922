//! Core traits that power the query builder.

use crate::{dialect::Dialect, value::Value};

/// A WHERE condition that can render itself as SQL with `?` placeholders.
///
/// Implementors are [`crate::condition::Condition`] and anything callers want
/// to plug into [`crate::QueryBuilder::add_where`]. The only contract is that
/// [`Expression::parameters`] yields exactly one value per placeholder emitted
/// by [`Expression::render`], in the same order.
pub trait Expression {
    /// Renders the SQL fragment, quoting identifiers for `dialect`.
    fn render(&self, dialect: Dialect) -> String;

    /// Values bound to the placeholders of [`Expression::render`].
    ///
    /// Must return an empty list when the fragment has no placeholder.
    fn parameters(&self) -> Vec<Value>;

    /// Renders the fragment and appends its parameters to `params`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use quiver_db::{Condition, Dialect, Expression as _};
    ///
    /// let cond = Condition::eq("name", "User");
    /// let mut params = vec![];
    /// let sql = cond.to_sql(Dialect::Sqlite, &mut params);
    /// assert_eq!(sql, "`name` = ?");
    /// assert_eq!(params.len(), 1);
    /// ```
    fn to_sql(&self, dialect: Dialect, params: &mut Vec<Value>) -> String {
        let sql = self.render(dialect);
        params.extend(self.parameters());
        sql
    }
}
