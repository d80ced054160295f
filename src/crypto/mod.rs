//! Cryptographic primitives for the audit store
//!
//! This module provides:
//! - The SHA-256 engine, one-shot and incremental
//! - Domain-separated tagged hashing built on it

pub mod sha256;
pub mod tagged;

pub use sha256::{sha256, StreamHasher};
pub use tagged::{branch_hash, tagged_hash, TaggedHasher};
