use miette::Diagnostic;
use quiver_config::error::ConfigError;
use quiver_db::DbError;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Db(#[from] DbError),

    #[error("Invalid filter '{0}'")]
    #[diagnostic(
        code(quiver::invalid_filter),
        help("Filters take the form COLUMN=VALUE, e.g. --eq name=John")
    )]
    InvalidFilter(String),

    #[error("Failed to serialize output: {0}")]
    #[diagnostic(code(quiver::json))]
    Json(#[from] serde_json::Error),
}

pub type CliResult<T> = std::result::Result<T, CliError>;
