use crate::proofs::proof::serialize_digest;
use crate::storage::{RecordProof, Store};
use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use std::path::PathBuf;

/// Execute the query command
pub fn execute(ledger: PathBuf, id: u64, json_output: bool) -> Result<()> {
    let store = Store::load(&ledger)?;

    match store.user_info(id)? {
        Some(record) => {
            if json_output {
                println!("{}", serde_json::to_string_pretty(&record_json(&record))?);
            } else {
                // payload and proof joined by a single space, nothing else
                println!("{} {}", record.payload, record.proof);
            }
        }
        None => {
            if json_output {
                println!("null");
            } else {
                println!("{}", format!("No record with id {id}").yellow());
            }
        }
    }

    Ok(())
}

/// JSON view of a record and its proof
///
/// The path lists only the siblings above the leaf; the leaf itself is
/// reported as `leaf_hash`.
fn record_json(record: &RecordProof) -> serde_json::Value {
    let path: Vec<_> = record
        .path
        .iter()
        .skip(1)
        .map(|(side, digest)| {
            json!({
                "side": side.as_str(),
                "hash": serialize_digest(digest.as_bytes()),
            })
        })
        .collect();

    json!({
        "id": record.id,
        "payload": record.payload,
        "proof": {
            "merkle_root": serialize_digest(record.root.as_bytes()),
            "leaf_hash": serialize_digest(record.leaf.as_bytes()),
            "path": path,
        },
        "text": format!("{} {}", record.payload, record.proof),
    })
}
