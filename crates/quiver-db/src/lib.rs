//! Active Record models over a fluent, dialect-aware SQL query builder.
//!
//! - [`Registry`] holds named connections, each with its [`Dialect`].
//! - [`Condition`] and [`QueryBuilder`] render SQL with `?` placeholders and
//!   an ordered parameter list.
//! - [`Model`] types (see [`define_model!`]) get chainable filters from
//!   [`Fluent`] and `save`/`update`/`delete`/`get` from [`ActiveRecord`].

pub mod active_record;
pub mod builder;
pub mod condition;
pub mod connection;
pub mod dialect;
pub mod driver;
pub mod dynamic;
pub mod error;
pub mod fluent;
pub mod macros;
pub mod model;
pub mod schema;
pub mod traits;
pub mod value;

pub use active_record::ActiveRecord;
pub use builder::{Order, QueryBuilder, QueryKind};
pub use condition::{Condition, Operator};
pub use connection::{ConnectOptions, Connection, Registry, DEFAULT_CONNECTION};
pub use dialect::{Dialect, LimitStyle};
pub use driver::{Cursor, Driver, SqliteDriver};
pub use dynamic::DynamicModel;
pub use error::{DbError, Result};
pub use fluent::Fluent;
pub use model::{Model, Record};
pub use schema::{inspector_for, SchemaInspector};
pub use traits::Expression;
pub use value::{Operand, Row, Value};

/// The traits needed to call model methods.
pub mod prelude {
    pub use crate::{active_record::ActiveRecord, fluent::Fluent, model::Model};
}
