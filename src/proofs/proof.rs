//! Inclusion proof accumulation, rendering, and verification

use crate::core::types::Digest;
use crate::crypto::tagged::TaggedHasher;

/// Which side a recorded digest occupies within its pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Lower-case label used in rendered proofs
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Sibling path from a leaf up to the root
///
/// The first entry holds the leaf digest itself together with the side it
/// occupies in the bottom pairing; every later entry holds a sibling digest
/// and the side that sibling sits on.
#[derive(Debug, Clone, Default)]
pub struct MerkleProof {
    path: Vec<(Side, Digest)>,
}

impl MerkleProof {
    /// Create an empty proof accumulator
    pub fn new() -> Self {
        Self { path: Vec::new() }
    }

    /// Record the next step of the path, leaf first
    pub fn push(&mut self, side: Side, digest: Digest) {
        self.path.push((side, digest));
    }

    /// Number of recorded steps
    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Recorded steps, leaf entry first
    pub fn steps(&self) -> &[(Side, Digest)] {
        &self.path
    }

    /// Fold the path against `expected_root` and render the proof text
    ///
    /// Starting from the leaf digest, each sibling is combined under
    /// `branch_tag` on the side its entry records. The rendered shape is
    /// `(<leaf> (<side>,<sibling>) ... <root>)` with every digest as
    /// `0x`-prefixed lower-case hex. Returns the empty string when the path
    /// is empty or the folded root differs from `expected_root`, so a
    /// non-empty return is a verified proof.
    pub fn generate_proof(&self, branch_tag: &[u8], expected_root: &Digest) -> String {
        let Some(((_, leaf), siblings)) = self.path.split_first() else {
            return String::new();
        };

        let mut rendered = String::from("(");
        rendered.push_str(&serialize_digest(leaf.as_bytes()));

        let mut hasher = TaggedHasher::new(branch_tag);
        let mut running = *leaf;
        for (side, sibling) in siblings {
            hasher.reset();
            rendered.push_str(" (");
            match side {
                Side::Left => {
                    hasher.append(sibling.as_bytes());
                    hasher.append(running.as_bytes());
                    rendered.push_str("left,");
                }
                Side::Right => {
                    hasher.append(running.as_bytes());
                    hasher.append(sibling.as_bytes());
                    rendered.push_str("right,");
                }
            }
            rendered.push_str(&serialize_digest(sibling.as_bytes()));
            rendered.push(')');

            running = hasher.hash();
        }

        rendered.push(' ');
        rendered.push_str(&serialize_digest(running.as_bytes()));
        rendered.push(')');

        if running != *expected_root {
            return String::new();
        }

        rendered
    }
}

/// Render digest bytes for proof text
///
/// `0x` followed by lower-case hex; an empty byte sequence renders as the
/// empty string, not `0x`.
pub fn serialize_digest(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }
    format!("0x{}", hex::encode(bytes))
}
