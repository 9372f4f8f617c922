use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Use this connection instead of the configured default
    #[arg(short = 'C', long, global = true)]
    pub connection: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the SQL and parameters of a query without running it
    #[command(arg_required_else_help = true)]
    Render {
        /// Dialect to render for (mysql, sqlite, pgsql, sqlsrv, firebird, sybase)
        #[arg(short, long, default_value = "sqlite")]
        dialect: String,

        /// Table to query
        #[arg(short, long)]
        table: String,

        /// Statement to render
        #[arg(short, long, value_enum, default_value_t = RenderKind::Select)]
        kind: RenderKind,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Select rows from a table
    #[command(arg_required_else_help = true)]
    #[clap(name = "query", visible_alias = "q")]
    Query {
        /// Table to query
        #[arg(short, long)]
        table: String,

        /// Primary key column of the table, used by --get
        #[arg(long, default_value = "id")]
        primary_key: String,

        /// Fetch the single row with this primary key value
        #[arg(short, long, value_name = "PK")]
        get: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Execute a raw SQL statement
    #[command(arg_required_else_help = true)]
    Exec {
        /// SQL with `?` placeholders
        sql: String,

        /// Values bound to the placeholders, in order
        params: Vec<String>,
    },

    /// List tables of the connection
    Tables,

    /// List the columns of a table
    #[command(arg_required_else_help = true)]
    Columns {
        /// Table to inspect
        table: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RenderKind {
    Select,
    Delete,
    Count,
}

/// Filters shared by `render` and `query`.
///
/// Conditions are applied grouped by operator, in the order the flags are
/// listed here.
#[derive(clap::Args, Debug, Default)]
pub struct FilterArgs {
    /// Equality filter
    #[arg(long, value_name = "COL=VAL")]
    pub eq: Vec<String>,

    /// Inequality filter
    #[arg(long, value_name = "COL=VAL")]
    pub neq: Vec<String>,

    /// Less-than filter
    #[arg(long, value_name = "COL=VAL")]
    pub lt: Vec<String>,

    /// Less-than-or-equal filter
    #[arg(long, value_name = "COL=VAL")]
    pub lte: Vec<String>,

    /// Greater-than filter
    #[arg(long, value_name = "COL=VAL")]
    pub gt: Vec<String>,

    /// Greater-than-or-equal filter
    #[arg(long, value_name = "COL=VAL")]
    pub gte: Vec<String>,

    /// LIKE filter; `=` escapes `%` and `_`
    #[arg(long, value_name = "COL=PATTERN")]
    pub like: Vec<String>,

    /// NOT LIKE filter
    #[arg(long, value_name = "COL=PATTERN")]
    pub not_like: Vec<String>,

    /// IN filter with comma separated values
    #[arg(long = "in", value_name = "COL=A,B")]
    pub in_: Vec<String>,

    /// NOT IN filter with comma separated values
    #[arg(long, value_name = "COL=A,B")]
    pub not_in: Vec<String>,

    /// IS NULL filter
    #[arg(long, value_name = "COL")]
    pub is_null: Vec<String>,

    /// IS NOT NULL filter
    #[arg(long, value_name = "COL")]
    pub not_null: Vec<String>,

    /// Sort by column, ascending unless `:desc` is given; repeat to add keys
    #[arg(long, value_name = "COL[:ASC|DESC]")]
    pub order: Vec<String>,

    /// Maximum number of rows
    #[arg(long)]
    pub limit: Option<u64>,

    /// Number of rows to skip
    #[arg(long)]
    pub offset: Option<u64>,
}
