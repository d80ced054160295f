//! Command-line interface for the audit store

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// porstore - Proof-of-reserve audit store
#[derive(Parser)]
#[command(
    name = "porstore",
    version,
    about = "Audit store with merkle inclusion proofs over account ledgers",
    long_about = "porstore preprocesses a plain-text account ledger into fingerprinted index and merkle cache files, then serves record lookups whose results carry a verifiable merkle inclusion proof."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build or refresh the cache files for a ledger
    Load {
        /// Path to the ledger file
        ledger: PathBuf,
    },

    /// Look up a record by id and print its inclusion proof
    Query {
        /// Path to the ledger file
        ledger: PathBuf,

        /// Record id to look up
        id: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the merkle root over all records
    Root {
        /// Path to the ledger file
        ledger: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
