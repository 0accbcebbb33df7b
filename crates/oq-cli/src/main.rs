//! `oq` - query string compiler
//!
//! Reads configuration from the environment (and `.env`), compiles the
//! given criteria/options, and prints the result to stdout.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oq_core::CompilerConfig;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = CompilerConfig::from_env()?;

    let result = match &cli.command {
        Commands::Compile(args) => commands::compile(args, config),
        Commands::Sort { spec } => commands::sort(spec),
    };

    match result {
        Ok(output) => {
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "compilation failed");
            eprintln!("error[{}]: {}", e.error_code(), e);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Initialize tracing/logging on stderr so stdout carries only output
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();
}
