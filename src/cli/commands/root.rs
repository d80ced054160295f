use crate::proofs::proof::serialize_digest;
use crate::storage::Store;
use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use std::path::PathBuf;

/// Execute the root command
pub fn execute(ledger: PathBuf, json_output: bool) -> Result<()> {
    let store = Store::load(&ledger)?;

    match store.root()? {
        Some(root) => {
            if json_output {
                println!("{}", serde_json::to_string_pretty(&json!({
                    "merkle_root": serialize_digest(root.as_bytes()),
                    "record_count": store.record_count(),
                }))?);
            } else {
                println!("{}", root.to_hex());
            }
        }
        None => {
            if json_output {
                println!("{}", serde_json::to_string_pretty(&json!({
                    "merkle_root": null,
                    "record_count": 0,
                }))?);
            } else {
                println!("{}", "Store is empty, no merkle root".yellow());
            }
        }
    }

    Ok(())
}
