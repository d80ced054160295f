//! Domain-separated hashing
//!
//! A tagged digest is `sha256(sha256(tag) ‖ sha256(tag) ‖ message)`. The two
//! copies of the 32-byte tag digest fill exactly one compression block, so
//! the per-tag engine state is derived once at construction and cached;
//! resetting restores it without touching the tag again.

use crate::core::types::Digest;
use crate::crypto::sha256::{sha256, StreamHasher};

/// Priming bytes fed before the message, two tag digests
const PRIMING_LEN: u64 = 2 * Digest::SIZE as u64;

/// Incremental hasher bound to one domain tag
#[derive(Debug, Clone)]
pub struct TaggedHasher {
    engine: StreamHasher,
    primed: StreamHasher,
}

impl TaggedHasher {
    /// Create a hasher for `tag`, primed with the doubled tag digest
    pub fn new(tag: &[u8]) -> Self {
        let tag_hash = sha256(tag);
        let mut engine = StreamHasher::new();
        engine.append(tag_hash.as_bytes());
        engine.append(tag_hash.as_bytes());
        let primed = engine.clone();
        Self { engine, primed }
    }

    /// Feed message bytes
    ///
    /// Returns the total count of message bytes consumed since construction
    /// or the last reset, excluding the priming prefix.
    pub fn append(&mut self, data: &[u8]) -> u64 {
        self.engine.append(data) - PRIMING_LEN
    }

    /// Finalize the tagged digest of the message fed so far
    pub fn hash(&self) -> Digest {
        self.engine.hash()
    }

    /// Restore the cached primed state so an unrelated message can be hashed
    /// under the same tag
    pub fn reset(&mut self) {
        self.engine.clone_from(&self.primed);
    }
}

/// One-shot tagged hash of `message` under `tag`
pub fn tagged_hash(tag: &[u8], message: &[u8]) -> Digest {
    let mut hasher = TaggedHasher::new(tag);
    hasher.append(message);
    hasher.hash()
}

/// Tagged hash of a concatenated digest pair (the branch rule of the tree)
pub fn branch_hash(tag: &[u8], left: &Digest, right: &Digest) -> Digest {
    let mut hasher = TaggedHasher::new(tag);
    hasher.append(left.as_bytes());
    hasher.append(right.as_bytes());
    hasher.hash()
}
