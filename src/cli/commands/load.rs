use crate::storage::Store;
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

/// Execute the load command
pub fn execute(ledger: PathBuf) -> Result<()> {
    let store = Store::load(&ledger)?;

    println!("{}", "Store loaded".green().bold());
    println!("  • Ledger: {}", ledger.display());
    println!("  • Records: {}", store.record_count());
    match store.root()? {
        Some(root) => println!("  • Merkle root: {}", root.to_hex().cyan()),
        None => println!("  • Merkle root: {}", "none (empty store)".dimmed()),
    }

    Ok(())
}
