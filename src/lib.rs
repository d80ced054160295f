//! porstore - Proof-of-reserve audit store
//!
//! porstore turns a plain-text account ledger into a queryable audit store:
//! a binary index file gives O(log n) lookup by record id, and a merkle
//! commitment file lets every lookup answer carry an inclusion proof that
//! folds back to the published root.
//!
//! # Core Features
//!
//! - **Tagged hashing**: domain-separated SHA-256 keeps leaf and branch hashes
//!   from ever colliding across roles
//! - **Fingerprinted caches**: both cache files carry a SHA-256 fingerprint and
//!   are rebuilt from the ledger whenever a check fails
//! - **Memory-mapped queries**: a lookup is a binary search over the mapped
//!   index plus one sibling walk up the mapped tree
//! - **Verified proofs**: proof text is only produced after the sibling path
//!   folds back to the stored root
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use porstore::Store;
//! use std::path::Path;
//!
//! let store = Store::load(Path::new("./accounts.txt"))?;
//! if let Some(record) = store.user_info(42)? {
//!     println!("{}", record.proof);
//! }
//! # Ok::<(), porstore::PorError>(())
//! ```

pub mod cli;
pub mod core;
pub mod crypto;
pub mod proofs;
pub mod storage;

// Re-export commonly used types
pub use crate::core::{
    error::{PorError, Result},
    types::Digest,
};

pub use crate::crypto::{sha256, tagged_hash, StreamHasher, TaggedHasher};

pub use crate::proofs::{merkle_root, serialize_digest, MerkleProof, Side};

pub use crate::storage::{RecordProof, Store};

/// Current version of porstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
