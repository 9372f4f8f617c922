use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, Result};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "QUIVER_CONFIG";

/// File looked up in the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "quiver.toml";

fn default_connection_name() -> String {
    "default".to_string()
}

/// Application's configuration
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    /// The name of the connection used when none is selected.
    /// Default: "default"
    #[serde(default = "default_connection_name")]
    pub default_connection: String,

    /// A map of connection names to their settings.
    #[serde(default)]
    pub connections: HashMap<String, ConnectionConfig>,
}

/// Settings of one named connection.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ConnectionConfig {
    /// `driver:target` data source name, e.g. `sqlite:app.db` or `sqlite::memory:`.
    pub dsn: String,

    #[serde(default)]
    pub username: String,

    /// Inline password. Prefer `password_env`.
    pub password: Option<String>,

    /// Name of the environment variable holding the password.
    pub password_env: Option<String>,

    /// Open the database read-only.
    /// Default: false
    #[serde(default)]
    pub read_only: bool,

    /// Milliseconds to wait on a locked database.
    pub busy_timeout: Option<u64>,
}

impl ConnectionConfig {
    /// Resolves the password: the inline value first, then `password_env`,
    /// else empty.
    pub fn password(&self, name: &str) -> Result<String> {
        if let Some(password) = &self.password {
            return Ok(password.clone());
        }
        match &self.password_env {
            Some(var) => std::env::var(var).map_err(|_| ConfigError::MissingPasswordEnv {
                connection: name.to_string(),
                var: var.clone(),
            }),
            None => Ok(String::new()),
        }
    }

    pub fn busy_timeout(&self) -> Option<Duration> {
        self.busy_timeout.map(Duration::from_millis)
    }
}

/// Picks the configuration file: `explicit`, else `$QUIVER_CONFIG`, else
/// `./quiver.toml`.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match std::env::var(CONFIG_ENV) {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_CONFIG_FILE),
    }
}

impl Config {
    /// Loads and validates the configuration file chosen by [`config_path`].
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = config_path(explicit);
        debug!(path = %path.display(), "loading configuration");

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path));
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        Self::parse(&content)
    }

    /// Parses and validates TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.resolve()?;
        Ok(config)
    }

    pub fn resolve(&mut self) -> Result<()> {
        if self.connections.is_empty() {
            return Err(ConfigError::NoConnections);
        }

        if !self.connections.contains_key(&self.default_connection) {
            return Err(ConfigError::MissingDefaultConnection(
                self.default_connection.clone(),
            ));
        }

        for (name, conn) in &mut self.connections {
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidConnectionName(name.clone()));
            }

            conn.dsn = conn.dsn.trim().to_string();
            if conn.dsn.is_empty() {
                return Err(ConfigError::EmptyDsn(name.clone()));
            }

            if conn.password.is_some() && conn.password_env.is_some() {
                warn!(
                    connection = %name,
                    "both password and password_env are set; using password"
                );
            }
        }

        Ok(())
    }

    pub fn default_connection(&self) -> Result<&ConnectionConfig> {
        self.connections
            .get(&self.default_connection)
            .ok_or_else(|| ConfigError::MissingDefaultConnection(self.default_connection.clone()))
    }

    pub fn get_connection(&self, name: &str) -> Result<&ConnectionConfig> {
        self.connections
            .get(name)
            .ok_or(ConfigError::MissingConnection(name.to_string()))
    }

    /// Connection names, sorted.
    pub fn connection_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.connections.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
