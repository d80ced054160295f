//! Merkle tree construction and inclusion proofs

pub mod merkle;
pub mod proof;

// Re-export commonly used items
pub use merkle::merkle_root;
pub use proof::{serialize_digest, MerkleProof, Side};
