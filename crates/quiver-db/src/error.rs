//! Error types for quiver-db.

use miette::Diagnostic;
use thiserror::Error;

/// Boxed error raised by a [`crate::driver::Driver`].
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Database error type for quiver-db operations.
///
/// "No matching row" is never an error: `fetch`, `get` and `one` report it
/// through their return value instead.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Invalid argument: {0}")]
    #[diagnostic(
        code(quiver_db::invalid_argument),
        help("Check the column, operator and values passed to the query builder")
    )]
    InvalidArgument(String),

    #[error("Unsupported operation: {0}")]
    #[diagnostic(
        code(quiver_db::unsupported),
        help("This dialect cannot express the requested query; drop the clause or switch connection")
    )]
    UnsupportedOperation(String),

    #[error("Statement execution failed: {0}")]
    #[diagnostic(code(quiver_db::execution))]
    Execution(#[source] DriverError),

    #[error("Database connection failed: {0}")]
    #[diagnostic(
        code(quiver_db::connection),
        help("Check the DSN and that the database file exists and is accessible")
    )]
    ConnectionError(String),

    #[error("Unknown connection: {0}")]
    #[diagnostic(
        code(quiver_db::unknown_connection),
        help("Call `connect` or `attach` for this name before running queries on it")
    )]
    UnknownConnection(String),

    #[error("Unsupported driver: {0}")]
    #[diagnostic(
        code(quiver_db::unsupported_driver),
        help("Only sqlite is built in; register other databases with `Registry::attach`")
    )]
    UnsupportedDriver(String),
}

impl DbError {
    /// Wraps any driver failure without altering it.
    pub fn execution(err: impl Into<DriverError>) -> Self {
        DbError::Execution(err.into())
    }

    /// Returns the driver error behind an [`DbError::Execution`], if any.
    pub fn driver_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            DbError::Execution(source) => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        DbError::Execution(Box::new(err))
    }
}

/// Result type alias for quiver-db operations.
pub type Result<T> = std::result::Result<T, DbError>;
