use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(quiver_config::toml_deserialize),
        help("Check your quiver.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(quiver_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(quiver_config::io))]
    IoError(#[from] std::io::Error),

    #[error("Configuration file not found: {}", .0.display())]
    #[diagnostic(
        code(quiver_config::not_found),
        help("Pass --config, set QUIVER_CONFIG or create ./quiver.toml")
    )]
    NotFound(PathBuf),

    #[error("No connections configured")]
    #[diagnostic(
        code(quiver_config::no_connections),
        help("Add at least one [connections.<name>] table")
    )]
    NoConnections,

    #[error("Missing default connection: {0}")]
    #[diagnostic(
        code(quiver_config::missing_default_connection),
        help("Ensure the default_connection field references an existing connection")
    )]
    MissingDefaultConnection(String),

    #[error("Missing connection: {0}")]
    #[diagnostic(
        code(quiver_config::missing_connection),
        help("Add the connection to your configuration or use an existing one")
    )]
    MissingConnection(String),

    #[error("Invalid connection name: {0:?}")]
    #[diagnostic(
        code(quiver_config::invalid_connection_name),
        help("Connection names must be non-empty and contain no whitespace")
    )]
    InvalidConnectionName(String),

    #[error("Connection '{0}' has an empty dsn")]
    #[diagnostic(
        code(quiver_config::empty_dsn),
        help("Set dsn, e.g. \"sqlite:app.db\" or \"sqlite::memory:\"")
    )]
    EmptyDsn(String),

    #[error("Environment variable {var} for connection '{connection}' is not set")]
    #[diagnostic(
        code(quiver_config::missing_password_env),
        help("Export the variable or set password directly in the config")
    )]
    MissingPasswordEnv { connection: String, var: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
