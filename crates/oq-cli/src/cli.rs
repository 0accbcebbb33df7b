//! Command-line arguments

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "oq")]
#[command(version, about = "Compile search criteria and query options into query strings", long_about = None)]
#[command(after_help = "Environment: OQ_UNKNOWN_OPERATORS (reject|ignore), OQ_COLUMN_OVERRIDES (field=COLUMN,...)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Compile criteria and options into a query string
    Compile(CompileArgs),
    /// Compile a sort specification into a sort fragment
    Sort {
        /// Sort specification as JSON, e.g. '[["CODE","NAME"],"desc"]'
        spec: String,
    },
}

#[derive(Args, Clone, Debug, Default)]
pub struct CompileArgs {
    /// Search criteria as a JSON object
    #[arg(long, short = 'c')]
    pub criteria: Option<String>,

    /// Query options as a JSON object
    #[arg(long, short = 'o')]
    pub options: Option<String>,

    /// Resource path to prefix, e.g. /products
    #[arg(long, short = 'p')]
    pub path: Option<String>,

    /// Column override as field=COLUMN (repeatable)
    #[arg(long = "column", value_name = "FIELD=COLUMN")]
    pub columns: Vec<String>,

    /// Drop unknown operators and malformed values instead of failing
    #[arg(long)]
    pub lenient: bool,
}
