//! The query builder.
//!
//! A [`QueryBuilder`] accumulates the pieces of one statement against one
//! table (conditions, ordering, limit and offset, and the row data of an
//! INSERT or UPDATE) and renders them for a [`Dialect`]. Rendering always
//! walks the clauses in the same order:
//!
//! type clause, WHERE, ORDER BY, limit, offset
//!
//! # Example
//!
//! ```rust
//! use quiver_db::{Condition, Dialect, QueryBuilder};
//!
//! let mut query = QueryBuilder::new("user");
//! query.add_where(Condition::like("name", "J%"));
//! query.add_order("id", "DESC").unwrap();
//! query.set_limit(5);
//!
//! let (sql, params) = query.build_sql(Dialect::Sqlite).unwrap();
//! assert_eq!(
//!     sql,
//!     "SELECT * FROM `user` WHERE `name` LIKE ? ESCAPE '=' ORDER BY `id` DESC LIMIT 5"
//! );
//! assert_eq!(params.len(), 1);
//!
//! let (sql, _) = query.build_sql(Dialect::MsSql).unwrap();
//! assert!(sql.starts_with(r#"SELECT TOP 5 * FROM "user""#));
//! ```

use std::{fmt, str::FromStr};

use tracing::debug;

use crate::{
    connection::{Registry, DEFAULT_CONNECTION},
    dialect::{Dialect, LimitStyle},
    driver::Cursor,
    error::{DbError, Result},
    traits::Expression,
    value::{Row, Value},
};

/// The statement a builder renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryKind {
    #[default]
    Select,
    Insert,
    Update,
    Delete,
    /// `SELECT COUNT(*)` over the WHERE clause.
    Count,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn keyword(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Order {
    type Err = DbError;

    /// Accepts exactly `ASC` or `DESC`.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ASC" => Ok(Order::Asc),
            "DESC" => Ok(Order::Desc),
            other => Err(DbError::InvalidArgument(format!(
                "sort direction must be either \"ASC\" or \"DESC\", got \"{other}\""
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderClause {
    pub column: String,
    pub order: Order,
}

/// Accumulates one statement against one table.
pub struct QueryBuilder {
    table: String,
    connection: String,
    kind: QueryKind,
    wheres: Vec<Box<dyn Expression + Send>>,
    orders: Vec<OrderClause>,
    limit: Option<u64>,
    offset: Option<u64>,
    row_data: Option<Row>,
}

impl QueryBuilder {
    /// Starts a SELECT on `table` against the default connection.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            connection: DEFAULT_CONNECTION.to_string(),
            kind: QueryKind::Select,
            wheres: vec![],
            orders: vec![],
            limit: None,
            offset: None,
            row_data: None,
        }
    }

    /// Runs the statement on connection `name`. The name is resolved when the
    /// builder executes, not here.
    pub fn on(mut self, name: impl Into<String>) -> Self {
        self.connection = name.into();
        self
    }

    pub fn set_connection(&mut self, name: impl Into<String>) {
        self.connection = name.into();
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: QueryKind) {
        self.kind = kind;
    }

    /// Column values written by an INSERT or UPDATE, in column order.
    pub fn set_row_data(&mut self, row: Row) {
        self.row_data = Some(row);
    }

    /// Appends a condition; conditions are joined with `AND` in the order they
    /// were added.
    pub fn add_where<E: Expression + Send + 'static>(&mut self, expr: E) {
        self.wheres.push(Box::new(expr));
    }

    /// Drops every condition added so far.
    pub fn clear_wheres(&mut self) {
        self.wheres.clear();
    }

    pub fn has_conditions(&self) -> bool {
        !self.wheres.is_empty()
    }

    /// Adds an ORDER BY entry; `direction` must be exactly `ASC` or `DESC`.
    pub fn add_order(&mut self, column: impl Into<String>, direction: &str) -> Result<()> {
        let order = direction.parse()?;
        self.push_order(column, order);
        Ok(())
    }

    pub fn push_order(&mut self, column: impl Into<String>, order: Order) {
        self.orders.push(OrderClause {
            column: column.into(),
            order,
        });
    }

    pub fn set_limit(&mut self, limit: u64) {
        self.limit = Some(limit);
    }

    pub fn set_offset(&mut self, offset: u64) {
        self.offset = Some(offset);
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// Limits to `per_page` rows starting at 1-based `page`.
    pub fn page(&mut self, page: u64, per_page: u64) {
        self.limit = Some(per_page);
        self.offset = Some(page.saturating_sub(1).saturating_mul(per_page));
    }

    /// Renders the statement and its parameters for `dialect`.
    ///
    /// Every call starts from an empty parameter list, so the builder can be
    /// rendered any number of times.
    ///
    /// # Errors
    ///
    /// - [`DbError::UnsupportedOperation`] for an offset on a `TOP` dialect, or
    ///   a limit on an UPDATE/DELETE there.
    /// - [`DbError::InvalidArgument`] for an UPDATE without row data.
    pub fn build_sql(&self, dialect: Dialect) -> Result<(String, Vec<Value>)> {
        let style = dialect.limit_style();
        let mut params = Vec::new();

        let mut sql = self.type_sql(dialect, style, &mut params)?;
        sql.push_str(&self.where_sql(dialect, &mut params));

        if self.kind != QueryKind::Count {
            sql.push_str(&self.order_sql(dialect));
            sql.push_str(&self.limit_sql(style));
            sql.push_str(&self.offset_sql(dialect, style)?);
        }

        Ok((sql, params))
    }

    /// Renders for the builder's connection and executes there.
    pub fn execute(&self, registry: &Registry) -> Result<Cursor> {
        let conn = registry.connection(&self.connection)?;
        let (sql, params) = self.build_sql(conn.dialect())?;
        debug!(
            table = %self.table,
            connection = %self.connection,
            kind = ?self.kind,
            sql = %sql,
            param_count = params.len(),
            "executing query"
        );
        conn.execute(&sql, &params)
    }

    fn type_sql(&self, dialect: Dialect, style: LimitStyle, params: &mut Vec<Value>) -> Result<String> {
        let table = dialect.quote_identifier(&self.table);

        if style == LimitStyle::Top
            && self.limit.is_some()
            && matches!(self.kind, QueryKind::Update | QueryKind::Delete)
        {
            return Err(DbError::UnsupportedOperation(format!(
                "{dialect} cannot limit an UPDATE or DELETE"
            )));
        }

        let sql = match self.kind {
            QueryKind::Select => match (style, self.limit) {
                (LimitStyle::Top, Some(limit)) => format!("SELECT TOP {limit} * FROM {table}"),
                _ => format!("SELECT * FROM {table}"),
            },
            QueryKind::Count => format!("SELECT COUNT(*) FROM {table}"),
            QueryKind::Delete => format!("DELETE FROM {table}"),
            QueryKind::Update => {
                let row = self
                    .row_data
                    .as_ref()
                    .filter(|row| !row.is_empty())
                    .ok_or_else(|| {
                        DbError::InvalidArgument(format!(
                            "UPDATE on `{}` has no column to set",
                            self.table
                        ))
                    })?;
                let sets = row
                    .iter()
                    .map(|(column, value)| {
                        params.push(value.clone());
                        format!("{} = ?", dialect.quote_identifier(column))
                    })
                    .collect::<Vec<_>>();
                format!("UPDATE {table} SET {}", sets.join(","))
            }
            QueryKind::Insert => match self.row_data.as_ref().filter(|row| !row.is_empty()) {
                Some(row) => {
                    let columns = row.keys().collect::<Vec<_>>();
                    let placeholders = vec!["?"; row.len()].join(",");
                    params.extend(row.values().cloned());
                    format!(
                        "INSERT INTO {table} ({}) VALUES ({placeholders})",
                        dialect.quote_list(&columns)
                    )
                }
                None => format!("INSERT INTO {table} {}", dialect.empty_insert()),
            },
        };

        Ok(sql)
    }

    fn where_sql(&self, dialect: Dialect, params: &mut Vec<Value>) -> String {
        if self.wheres.is_empty() {
            return String::new();
        }
        let conditions = self
            .wheres
            .iter()
            .map(|expr| expr.to_sql(dialect, params))
            .collect::<Vec<_>>();
        format!(" WHERE {}", conditions.join(" AND "))
    }

    fn order_sql(&self, dialect: Dialect) -> String {
        if self.orders.is_empty() {
            return String::new();
        }
        let orders = self
            .orders
            .iter()
            .map(|o| format!("{} {}", dialect.quote_identifier(&o.column), o.order))
            .collect::<Vec<_>>();
        format!(" ORDER BY {}", orders.join(","))
    }

    fn limit_sql(&self, style: LimitStyle) -> String {
        match (style, self.limit) {
            (LimitStyle::Limit, Some(limit)) => format!(" LIMIT {limit}"),
            (LimitStyle::Rows, Some(limit)) => format!(" ROWS {limit}"),
            // the type clause already rendered TOP
            _ => String::new(),
        }
    }

    fn offset_sql(&self, dialect: Dialect, style: LimitStyle) -> Result<String> {
        let Some(offset) = self.offset else {
            return Ok(String::new());
        };
        match style {
            LimitStyle::Top => Err(DbError::UnsupportedOperation(format!(
                "offsets are not supported by {dialect}"
            ))),
            LimitStyle::Rows => Ok(format!(" TO {offset}")),
            LimitStyle::Limit => Ok(format!(" OFFSET {offset}")),
        }
    }
}

impl fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("table", &self.table)
            .field("connection", &self.connection)
            .field("kind", &self.kind)
            .field("conditions", &self.wheres.len())
            .field("orders", &self.orders)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .field("row_data", &self.row_data)
            .finish()
    }
}
