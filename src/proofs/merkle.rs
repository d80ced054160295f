//! Merkle root construction over raw leaf payloads

use crate::core::types::Digest;
use crate::crypto::tagged::TaggedHasher;

/// Compute the Merkle root of `leaves`, or `None` for an empty sequence
///
/// Every payload is hashed under `leaf_tag`, in the order given. Levels with
/// an odd node count are padded by duplicating their last node before
/// consecutive pairs are hashed under `branch_tag`. A single leaf is its own
/// root; the branch tag is never applied to it.
pub fn merkle_root<T: AsRef<[u8]>>(
    leaf_tag: &[u8],
    branch_tag: &[u8],
    leaves: &[T],
) -> Option<Digest> {
    if leaves.is_empty() {
        return None;
    }

    let mut leaf_hasher = TaggedHasher::new(leaf_tag);
    let mut level: Vec<Digest> = Vec::with_capacity(leaves.len());
    for leaf in leaves {
        leaf_hasher.reset();
        leaf_hasher.append(leaf.as_ref());
        level.push(leaf_hasher.hash());
    }

    let mut branch_hasher = TaggedHasher::new(branch_tag);
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(level[level.len() - 1]);
        }

        let mut next = Vec::with_capacity(level.len() / 2);
        for pair in level.chunks_exact(2) {
            branch_hasher.reset();
            branch_hasher.append(pair[0].as_bytes());
            branch_hasher.append(pair[1].as_bytes());
            next.push(branch_hasher.hash());
        }
        level = next;
    }

    Some(level[0])
}
