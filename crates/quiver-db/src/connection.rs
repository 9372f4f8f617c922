//! Named connection registry.
//!
//! A [`Registry`] owns every database handle the application talks to, keyed by
//! name. Each [`Connection`] pairs a [`Driver`] with the [`Dialect`] used to
//! render SQL for it. The registry is an explicit, cloneable handle: models and
//! query builders receive it at construction instead of reaching for a global.
//!
//! # Example
//!
//! ```rust
//! use quiver_db::{ConnectOptions, Registry};
//!
//! let registry = Registry::new();
//! registry
//!     .connect("sqlite::memory:", "", "", &ConnectOptions::default())
//!     .unwrap();
//!
//! registry
//!     .execute("CREATE TABLE user (id INTEGER PRIMARY KEY, name TEXT)", &[])
//!     .unwrap();
//! assert!(registry.has_connection("default"));
//! ```

use std::{
    collections::HashMap,
    fmt,
    path::Path,
    sync::{Arc, Mutex, PoisonError, RwLock},
    time::Duration,
};

use rusqlite::OpenFlags;
use tracing::{debug, trace};

use crate::{
    dialect::Dialect,
    driver::{Cursor, Driver, SqliteDriver},
    error::{DbError, Result},
    value::Value,
};

/// Name used when no connection name is given.
pub const DEFAULT_CONNECTION: &str = "default";

/// Driver-level options applied when opening a connection.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// Open the database read-only.
    pub read_only: bool,
    /// How long to wait on a locked database before failing.
    pub busy_timeout: Option<Duration>,
}

/// One named database handle.
pub struct Connection {
    name: String,
    dialect: Dialect,
    quote_character: char,
    driver: Mutex<Box<dyn Driver>>,
}

impl Connection {
    pub fn new(name: impl Into<String>, dialect: Dialect, driver: Box<dyn Driver>) -> Self {
        Self {
            name: name.into(),
            dialect,
            quote_character: dialect.quote_character(),
            driver: Mutex::new(driver),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn quote_character(&self) -> char {
        self.quote_character
    }

    /// Executes one statement on this connection.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<Cursor> {
        debug!(
            connection = %self.name,
            sql,
            param_count = params.len(),
            "executing statement"
        );
        let mut driver = self.driver.lock().unwrap_or_else(PoisonError::into_inner);
        driver.execute(sql, params)
    }
}

/// Splits a `driver:rest` DSN.
fn parse_dsn(dsn: &str) -> Result<(Dialect, &str)> {
    let (driver, rest) = dsn
        .split_once(':')
        .ok_or_else(|| DbError::ConnectionError(format!("malformed DSN `{dsn}`")))?;
    let dialect = Dialect::from_driver(driver)
        .ok_or_else(|| DbError::UnsupportedDriver(driver.to_string()))?;
    Ok((dialect, rest))
}

fn open_sqlite(target: &str, options: &ConnectOptions) -> Result<SqliteDriver> {
    let driver = if target.is_empty() || target == ":memory:" {
        SqliteDriver::open_in_memory()
    } else {
        let flags = if options.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI
        } else {
            OpenFlags::default()
        };
        SqliteDriver::open(Path::new(target), flags)
    }
    .map_err(|err| DbError::ConnectionError(format!("{target}: {err}")))?;

    if let Some(timeout) = options.busy_timeout {
        driver
            .conn()
            .busy_timeout(timeout)
            .map_err(|err| DbError::ConnectionError(err.to_string()))?;
    }

    Ok(driver)
}

/// Holds the named connections of an application.
#[derive(Clone, Default)]
pub struct Registry {
    connections: Arc<RwLock<HashMap<String, Arc<Connection>>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects the [`DEFAULT_CONNECTION`].
    ///
    /// See [`Registry::connect_as`].
    pub fn connect(
        &self,
        dsn: &str,
        username: &str,
        password: &str,
        options: &ConnectOptions,
    ) -> Result<()> {
        self.connect_as(DEFAULT_CONNECTION, dsn, username, password, options)
    }

    /// Opens a connection from a `driver:target` DSN and registers it as `name`.
    ///
    /// The dialect, and with it the identifier quote character, is fixed here.
    /// Only `sqlite:` DSNs have a built-in driver (`sqlite::memory:` or
    /// `sqlite:/path/to/db`); other engines fail with
    /// [`DbError::UnsupportedDriver`] and must be registered with
    /// [`Registry::attach`]. Credentials are accepted for parity with network
    /// databases and ignored by SQLite.
    pub fn connect_as(
        &self,
        name: &str,
        dsn: &str,
        username: &str,
        password: &str,
        options: &ConnectOptions,
    ) -> Result<()> {
        let (dialect, target) = parse_dsn(dsn)?;
        if dialect != Dialect::Sqlite {
            return Err(DbError::UnsupportedDriver(format!(
                "no built-in driver for {dialect} (connection `{name}`)"
            )));
        }
        if !username.is_empty() || !password.is_empty() {
            trace!(connection = name, "sqlite ignores credentials");
        }

        let driver = open_sqlite(target, options)?;
        self.attach(name, dialect, Box::new(driver));
        debug!(connection = name, %dialect, "connected");
        Ok(())
    }

    /// Registers an already-open driver under `name`, replacing any previous
    /// connection with that name.
    pub fn attach(&self, name: &str, dialect: Dialect, driver: Box<dyn Driver>) {
        let conn = Arc::new(Connection::new(name, dialect, driver));
        let mut connections = self
            .connections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if connections.insert(name.to_string(), conn).is_some() {
            debug!(connection = name, "replaced existing connection");
        }
    }

    /// Removes a connection; returns whether it existed.
    pub fn disconnect(&self, name: &str) -> bool {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    /// Looks up a connection by name.
    pub fn connection(&self, name: &str) -> Result<Arc<Connection>> {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| DbError::UnknownConnection(name.to_string()))
    }

    pub fn has_connection(&self, name: &str) -> bool {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Returns the names of all registered connections, sorted.
    pub fn connection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn dialect(&self, name: &str) -> Result<Dialect> {
        Ok(self.connection(name)?.dialect())
    }

    /// Quotes `identifier` with the quote character of connection `name`.
    pub fn quote_identifier(&self, name: &str, identifier: &str) -> Result<String> {
        Ok(self.dialect(name)?.quote_identifier(identifier))
    }

    /// Executes on the [`DEFAULT_CONNECTION`].
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<Cursor> {
        self.execute_on(DEFAULT_CONNECTION, sql, params)
    }

    /// Executes `sql` with `params` on connection `name`.
    pub fn execute_on(&self, name: &str, sql: &str, params: &[Value]) -> Result<Cursor> {
        self.connection(name)?.execute(sql, params)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("connections", &self.connection_names())
            .finish()
    }
}
