//! Mapped store over the cache files of a ledger
//!
//! Loading checks both cache fingerprints and rebuilds the caches when
//! either is missing or invalid, then memory-maps the pair. Queries walk
//! the mapped bytes directly: a binary search over the index table, a
//! payload read, and a sibling walk up the merkle file.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use memmap2::{Mmap, MmapOptions};
use tracing::debug;

use crate::core::error::{PorError, Result};
use crate::core::types::Digest;
use crate::crypto::sha256::StreamHasher;
use crate::proofs::proof::{MerkleProof, Side};
use crate::storage::format::{
    self, IndexEntry, BRANCH_TAG, COUNT_OFFSET, FINGERPRINT_LEN, HEADER_LEN, INDEX_MAGIC,
    MERKLE_MAGIC, NODE_LEN,
};
use crate::storage::preprocess;
use crate::storage::view::ByteView;

/// A queried record together with its verified inclusion proof
#[derive(Debug, Clone)]
pub struct RecordProof {
    /// Record id the query matched
    pub id: u64,
    /// Raw payload text as it appears in the ledger
    pub payload: String,
    /// Tagged hash of the payload
    pub leaf: Digest,
    /// Merkle root the proof folds to
    pub root: Digest,
    /// Sibling path, leaf entry first
    pub path: Vec<(Side, Digest)>,
    /// Rendered proof text, never empty
    pub proof: String,
}

/// Read-only handle over the mapped index and merkle files
pub struct Store {
    index: Mmap,
    merkle: Mmap,
    record_count: u64,
}

impl Store {
    /// Load the store for a ledger, rebuilding stale or missing caches
    ///
    /// A cache pair that passes both fingerprint checks is reused as is,
    /// even if the ledger has changed since it was built. Index lookups
    /// assume the ledger listed its records in ascending id order.
    pub fn load(ledger_path: &Path) -> Result<Self> {
        if !is_regular_file(ledger_path) {
            return Err(PorError::invalid_input(
                ledger_path.to_path_buf(),
                "missing or not a regular file",
            ));
        }

        let index_path = format::index_path(ledger_path);
        let merkle_path = format::merkle_path(ledger_path);

        let caches_valid = is_regular_file(&index_path)
            && verify_fingerprint(&index_path, &INDEX_MAGIC)?
            && is_regular_file(&merkle_path)
            && verify_fingerprint(&merkle_path, &MERKLE_MAGIC)?;
        if caches_valid {
            debug!("reusing caches for {}", ledger_path.display());
        } else {
            if index_path.exists() {
                fs::remove_file(&index_path)?;
            }
            if merkle_path.exists() {
                fs::remove_file(&merkle_path)?;
            }
            preprocess::build(ledger_path, &index_path, &merkle_path)?;
        }

        let index = map_file(&index_path)?;
        let merkle = map_file(&merkle_path)?;

        let view = ByteView::new(&index);
        let record_count = view.u64_at(COUNT_OFFSET)?;
        let table_end = record_count
            .checked_mul(IndexEntry::SIZE)
            .and_then(|table| table.checked_add(HEADER_LEN))
            .ok_or_else(|| PorError::format("index record count is implausibly large"))?;
        if table_end > view.len() {
            return Err(PorError::format("index table runs past end of file"));
        }

        Ok(Self {
            index,
            merkle,
            record_count,
        })
    }

    /// Number of records in the store
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Merkle root over all records, or None for an empty store
    pub fn root(&self) -> Result<Option<Digest>> {
        let view = self.merkle_view();
        let mut count = view.u64_at(COUNT_OFFSET)?;
        if count == 0 {
            return Ok(None);
        }

        let mut offset = HEADER_LEN;
        while count > 1 {
            count = padded_count(count)?;
            offset = node_offset(offset, count)?;
            count >>= 1;
        }
        view.digest_at(offset).map(Some)
    }

    /// Look up a record by id and build its inclusion proof
    ///
    /// Returns None when no record carries the id. A matched record whose
    /// proof cannot be assembled means the cache pair is inconsistent and
    /// surfaces as a format error.
    pub fn user_info(&self, id: u64) -> Result<Option<RecordProof>> {
        let Some((row, entry)) = self.find_entry(id)? else {
            return Ok(None);
        };

        let payload = self.index_view().cstr_at(entry.offset)?.to_owned();

        let Some((path, root)) = self.sibling_path(row)? else {
            return Err(PorError::format("index row has no merkle leaf"));
        };
        let leaf = match path.steps().first() {
            Some(&(_, digest)) => digest,
            None => return Err(PorError::format("merkle path is empty")),
        };
        let proof = path.generate_proof(BRANCH_TAG, &root);
        if proof.is_empty() {
            return Err(PorError::format(
                "merkle path does not fold to the stored root",
            ));
        }

        Ok(Some(RecordProof {
            id,
            payload,
            leaf,
            root,
            path: path.steps().to_vec(),
            proof,
        }))
    }

    /// Binary search the index table for `id`
    ///
    /// Rows sit in ledger order, so the search is only correct for ledgers
    /// with ascending ids.
    fn find_entry(&self, id: u64) -> Result<Option<(u64, IndexEntry)>> {
        let view = self.index_view();
        let mut lo = 0u64;
        let mut hi = self.record_count;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let entry = IndexEntry::read_at(&view, mid)?;
            if entry.id < id {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        if lo == self.record_count {
            return Ok(None);
        }
        let entry = IndexEntry::read_at(&view, lo)?;
        if entry.id != id {
            return Ok(None);
        }
        Ok(Some((lo, entry)))
    }

    /// Collect the sibling path for the leaf in row `order`, bottom up
    ///
    /// Returns the path and the stored root, or None when the row has no
    /// leaf in the merkle file.
    fn sibling_path(&self, order: u64) -> Result<Option<(MerkleProof, Digest)>> {
        let view = self.merkle_view();
        let mut count = view.u64_at(COUNT_OFFSET)?;
        if order >= count {
            return Ok(None);
        }

        let mut path = MerkleProof::new();
        let mut order = order;
        let mut offset = HEADER_LEN;

        let leaf_side = if order % 2 == 0 { Side::Left } else { Side::Right };
        path.push(leaf_side, view.digest_at(node_offset(offset, order)?)?);

        while count > 1 {
            count = padded_count(count)?;

            if order % 2 == 0 {
                path.push(
                    Side::Right,
                    view.digest_at(node_offset(offset, order + 1)?)?,
                );
            } else {
                path.push(
                    Side::Left,
                    view.digest_at(node_offset(offset, order - 1)?)?,
                );
            }

            offset = node_offset(offset, count)?;
            count >>= 1;
            order >>= 1;
        }

        let root = view.digest_at(offset)?;
        Ok(Some((path, root)))
    }

    fn index_view(&self) -> ByteView<'_> {
        ByteView::new(&self.index)
    }

    fn merkle_view(&self) -> ByteView<'_> {
        ByteView::new(&self.merkle)
    }
}

/// Check a cache file against the fingerprint in its header
///
/// The fingerprint is the SHA-256 of every byte after the 32-byte slot.
/// Returns Ok(false) for files that are too short, carry the wrong magic,
/// or do not hash to their recorded fingerprint; only I/O failures are
/// errors.
pub fn verify_fingerprint(path: &Path, magic: &[u8; 8]) -> Result<bool> {
    if fs::metadata(path)?.len() < HEADER_LEN {
        return Ok(false);
    }

    let mut file = File::open(path)?;
    let mut recorded = [0u8; FINGERPRINT_LEN];
    file.read_exact(&mut recorded)?;

    let mut file_magic = [0u8; 8];
    file.read_exact(&mut file_magic)?;
    if &file_magic != magic {
        return Ok(false);
    }

    let mut hasher = StreamHasher::new();
    hasher.append(&file_magic);

    let mut buffer = [0u8; 512];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.append(&buffer[..read]);
    }

    Ok(hasher.hash().as_bytes() == &recorded)
}

fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path)
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

fn map_file(path: &Path) -> Result<Mmap> {
    let file = File::open(path)?;
    let map = unsafe { MmapOptions::new().map(&file)? };

    // lock pages into RAM as they fault in, best effort
    #[cfg(target_os = "linux")]
    let _ = unsafe {
        libc::mlock2(
            map.as_ptr() as *const libc::c_void,
            map.len(),
            libc::MLOCK_ONFAULT as libc::c_uint,
        )
    };

    Ok(map)
}

/// Byte offset of node `index` within a level starting at `base`
fn node_offset(base: u64, index: u64) -> Result<u64> {
    index
        .checked_mul(NODE_LEN)
        .and_then(|rel| base.checked_add(rel))
        .ok_or_else(|| PorError::format("merkle node offset overflows"))
}

/// Level width rounded up to a full pairing
fn padded_count(count: u64) -> Result<u64> {
    count
        .checked_add(count & 1)
        .ok_or_else(|| PorError::format("merkle level count overflows"))
}
