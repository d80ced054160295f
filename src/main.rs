//! porstore CLI
//!
//! Command-line interface for the proof-of-reserve audit store.

use anyhow::Result;
use clap::Parser;

mod cli;
mod core;
mod crypto;
mod proofs;
mod storage;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize logging; stdout stays reserved for query results
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let cli = Cli::parse();

    // Execute the command
    match cli.command {
        Commands::Load { ledger } => cli::commands::load::execute(ledger),
        Commands::Query { ledger, id, json } => cli::commands::query::execute(ledger, id, json),
        Commands::Root { ledger, json } => cli::commands::root::execute(ledger, json),
    }
}
