//! Cache construction
//!
//! Builds the index and merkle cache files for a ledger in two streaming
//! passes: the first pass writes the index table and the leaf level of the
//! tree, the second copies the payload text. Branch levels are then built
//! in place by reading the previous level back from the merkle file, so
//! memory use stays flat no matter how large the ledger is.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::info;

use crate::core::error::{PorError, Result};
use crate::core::types::Digest;
use crate::crypto::sha256::StreamHasher;
use crate::crypto::tagged::TaggedHasher;
use crate::storage::format::{
    IndexEntry, BRANCH_TAG, FINGERPRINT_LEN, HEADER_LEN, INDEX_MAGIC, LEAF_TAG, MERKLE_MAGIC,
    NODE_LEN,
};
use crate::storage::ledger::LedgerReader;

/// Build both cache files for `ledger_path`
///
/// On failure neither cache file is left behind, so a later load never sees
/// a half-written cache.
pub fn build(ledger_path: &Path, index_path: &Path, merkle_path: &Path) -> Result<()> {
    match write_cache_files(ledger_path, index_path, merkle_path) {
        Ok(()) => Ok(()),
        Err(err) => {
            let _ = fs::remove_file(index_path);
            let _ = fs::remove_file(merkle_path);
            Err(err)
        }
    }
}

fn write_cache_files(ledger_path: &Path, index_path: &Path, merkle_path: &Path) -> Result<()> {
    let mut ledger = LedgerReader::open(ledger_path)?;
    let record_count = ledger.record_count();
    info!(
        records = record_count,
        "building caches for {}",
        ledger_path.display()
    );

    // payloads start right after the header and the index table
    let mut payload_offset = record_count
        .checked_mul(IndexEntry::SIZE)
        .and_then(|table| table.checked_add(HEADER_LEN))
        .ok_or_else(|| {
            PorError::invalid_input(ledger_path.to_path_buf(), "record count is implausibly large")
        })?;

    let mut index_hasher = StreamHasher::new();
    let mut index_file = BufWriter::new(File::create(index_path)?);

    let mut merkle_hasher = StreamHasher::new();
    let merkle_writer = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(merkle_path)?;
    let mut merkle_file = BufWriter::new(merkle_writer);

    // leave the fingerprint slots empty for now
    index_file.write_all(&[0u8; FINGERPRINT_LEN])?;
    merkle_file.write_all(&[0u8; FINGERPRINT_LEN])?;

    index_file.write_all(&INDEX_MAGIC)?;
    index_hasher.append(&INDEX_MAGIC);
    merkle_file.write_all(&MERKLE_MAGIC)?;
    merkle_hasher.append(&MERKLE_MAGIC);

    let count_bytes = record_count.to_le_bytes();
    index_file.write_all(&count_bytes)?;
    index_hasher.append(&count_bytes);
    merkle_file.write_all(&count_bytes)?;
    merkle_hasher.append(&count_bytes);

    // first pass: index entries in ledger order, one leaf hash per record
    let mut leaf_hasher = TaggedHasher::new(LEAF_TAG);
    let mut last_leaf = None;
    for _ in 0..record_count {
        let record = ledger.next_record()?;

        let entry = IndexEntry::new(record.id, payload_offset).to_bytes();
        index_file.write_all(&entry)?;
        index_hasher.append(&entry);
        payload_offset += record.text.len() as u64 + 1;

        leaf_hasher.reset();
        leaf_hasher.append(record.text.as_bytes());
        let leaf = leaf_hasher.hash();
        merkle_file.write_all(leaf.as_bytes())?;
        merkle_hasher.append(leaf.as_bytes());
        last_leaf = Some(leaf);
    }

    // an odd leaf level pairs its last node with a stored duplicate
    let mut node_count = record_count;
    if node_count > 1 && node_count % 2 == 1 {
        if let Some(leaf) = last_leaf {
            merkle_file.write_all(leaf.as_bytes())?;
            merkle_hasher.append(leaf.as_bytes());
            node_count += 1;
        }
    }

    // second pass: copy payload text, NUL terminated, in ledger order
    ledger.rewind()?;
    for _ in 0..record_count {
        let record = ledger.next_record()?;
        index_file.write_all(record.text.as_bytes())?;
        index_hasher.append(record.text.as_bytes());
        index_file.write_all(b"\0")?;
        index_hasher.append(b"\0");
    }

    // patch the index fingerprint into its slot
    let mut index_file = index_file.into_inner().map_err(|err| err.into_error())?;
    index_file.seek(SeekFrom::Start(0))?;
    index_file.write_all(index_hasher.hash().as_bytes())?;

    let merkle_file = merkle_file.into_inner().map_err(|err| err.into_error())?;
    build_branch_levels(merkle_file, node_count, merkle_hasher)?;

    Ok(())
}

/// Fold the stored leaf level up to the root, appending one level at a time
///
/// Each level is read back from the file just written, so only one node
/// pair is ever held in memory. The fingerprint hasher follows every
/// appended byte and is patched into the header slot at the end.
fn build_branch_levels(
    mut file: File,
    leaf_count: u64,
    mut fingerprint: StreamHasher,
) -> Result<()> {
    let mut branch_hasher = TaggedHasher::new(BRANCH_TAG);
    let mut pair = [0u8; 2 * Digest::SIZE];
    let mut branch = Digest::zero();

    let mut count = leaf_count;
    let mut read_offset = HEADER_LEN;
    let mut write_offset = read_offset + count * NODE_LEN;
    while count > 1 {
        for i in 0..count / 2 {
            file.seek(SeekFrom::Start(read_offset + 2 * i * NODE_LEN))?;
            file.read_exact(&mut pair)?;
            branch_hasher.reset();
            branch_hasher.append(&pair);
            branch = branch_hasher.hash();

            file.seek(SeekFrom::Start(write_offset + i * NODE_LEN))?;
            file.write_all(branch.as_bytes())?;
            fingerprint.append(branch.as_bytes());
        }

        count /= 2;
        if count > 1 && count % 2 == 1 {
            file.seek(SeekFrom::Start(write_offset + count * NODE_LEN))?;
            file.write_all(branch.as_bytes())?;
            fingerprint.append(branch.as_bytes());
            count += 1;
        }

        read_offset = write_offset;
        write_offset = read_offset + count * NODE_LEN;
    }

    file.seek(SeekFrom::Start(0))?;
    file.write_all(fingerprint.hash().as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::sha256::sha256;
    use crate::crypto::tagged::{branch_hash, tagged_hash};
    use crate::proofs::merkle::merkle_root;
    use crate::storage::format;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn build_ledger(dir: &TempDir, contents: &str) -> (PathBuf, PathBuf, PathBuf) {
        let ledger = dir.path().join("users.txt");
        fs::write(&ledger, contents).unwrap();
        let index = format::index_path(&ledger);
        let merkle = format::merkle_path(&ledger);
        build(&ledger, &index, &merkle).unwrap();
        (ledger, index, merkle)
    }

    fn assert_fingerprint(path: &Path) {
        let bytes = fs::read(path).unwrap();
        let computed = sha256(&bytes[FINGERPRINT_LEN..]);
        assert_eq!(&bytes[..FINGERPRINT_LEN], computed.as_bytes());
    }

    #[test]
    fn test_empty_ledger_writes_bare_headers() {
        let dir = TempDir::new().unwrap();
        let (_, index, merkle) = build_ledger(&dir, "0\n");

        let index_bytes = fs::read(&index).unwrap();
        let merkle_bytes = fs::read(&merkle).unwrap();
        assert_eq!(index_bytes.len(), 48);
        assert_eq!(merkle_bytes.len(), 48);
        assert_eq!(&index_bytes[32..40], &INDEX_MAGIC);
        assert_eq!(&merkle_bytes[32..40], &MERKLE_MAGIC);
        assert_eq!(&index_bytes[40..48], &0u64.to_le_bytes());
        assert_fingerprint(&index);
        assert_fingerprint(&merkle);
    }

    #[test]
    fn test_merkle_file_sizes() {
        let dir = TempDir::new().unwrap();
        let cases = [
            ("1\n(1,1111)\n", 80),
            ("2\n(1,1111)\n(2,2222)\n", 144),
            ("3\n(1,1111)\n(2,2222)\n(3,3333)\n", 272),
        ];
        for (contents, expected) in cases {
            let (_, _, merkle) = build_ledger(&dir, contents);
            let len = fs::metadata(&merkle).unwrap().len();
            assert_eq!(len, expected, "merkle size for {contents:?}");
        }
    }

    #[test]
    fn test_index_entries_and_payloads() {
        let dir = TempDir::new().unwrap();
        let (_, index, _) = build_ledger(&dir, "2\n(1,1111)\n(2,2222)\n");

        let bytes = fs::read(&index).unwrap();
        assert_eq!(&bytes[40..48], &2u64.to_le_bytes());

        // two 16-byte rows, then the payloads they point at
        assert_eq!(&bytes[48..56], &1u64.to_le_bytes());
        assert_eq!(&bytes[56..64], &80u64.to_le_bytes());
        assert_eq!(&bytes[64..72], &2u64.to_le_bytes());
        assert_eq!(&bytes[72..80], &89u64.to_le_bytes());
        assert_eq!(&bytes[80..89], b"(1,1111)\0");
        assert_eq!(&bytes[89..98], b"(2,2222)\0");
        assert_eq!(bytes.len(), 98);
        assert_fingerprint(&index);
    }

    #[test]
    fn test_leaf_bytes_match_tagged_hash() {
        let dir = TempDir::new().unwrap();
        let (_, _, merkle) = build_ledger(&dir, "1\n(1,1111)\n");

        let bytes = fs::read(&merkle).unwrap();
        let leaf = tagged_hash(LEAF_TAG, b"(1,1111)");
        assert_eq!(&bytes[48..80], leaf.as_bytes());
        assert_fingerprint(&merkle);
    }

    #[test]
    fn test_odd_leaf_level_duplicates_last_leaf() {
        let dir = TempDir::new().unwrap();
        let (_, _, merkle) = build_ledger(&dir, "3\n(1,1111)\n(2,2222)\n(3,3333)\n");

        let bytes = fs::read(&merkle).unwrap();
        assert_eq!(&bytes[48 + 64..48 + 96], &bytes[48 + 96..48 + 128]);

        // the two branches and the root follow the padded leaf level
        let leaf3 = tagged_hash(LEAF_TAG, b"(3,3333)");
        let expected_right = branch_hash(BRANCH_TAG, &leaf3, &leaf3);
        assert_eq!(&bytes[48 + 160..48 + 192], expected_right.as_bytes());
        assert_fingerprint(&merkle);
    }

    #[test]
    fn test_root_matches_reference_fold() {
        let dir = TempDir::new().unwrap();
        let contents = "5\n(1,10)\n(2,20)\n(3,30)\n(4,40)\n(5,50)\n";
        let (_, _, merkle) = build_ledger(&dir, contents);

        let leaves: Vec<&[u8]> = vec![b"(1,10)", b"(2,20)", b"(3,30)", b"(4,40)", b"(5,50)"];
        let expected = merkle_root(LEAF_TAG, BRANCH_TAG, &leaves).unwrap();

        let bytes = fs::read(&merkle).unwrap();
        let root_at = bytes.len() - 32;
        assert_eq!(&bytes[root_at..], expected.as_bytes());
        assert_fingerprint(&merkle);
    }

    #[test]
    fn test_rebuild_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let contents = "3\n(1,1111)\n(2,2222)\n(3,3333)\n";
        let (ledger, index, merkle) = build_ledger(&dir, contents);

        let index_first = fs::read(&index).unwrap();
        let merkle_first = fs::read(&merkle).unwrap();
        build(&ledger, &index, &merkle).unwrap();
        assert_eq!(fs::read(&index).unwrap(), index_first);
        assert_eq!(fs::read(&merkle).unwrap(), merkle_first);
    }

    #[test]
    fn test_failed_build_leaves_no_cache_files() {
        let dir = TempDir::new().unwrap();
        let ledger = dir.path().join("short.txt");
        fs::write(&ledger, "5\n(1,1111)\n").unwrap();

        let index = format::index_path(&ledger);
        let merkle = format::merkle_path(&ledger);
        assert!(build(&ledger, &index, &merkle).is_err());
        assert!(!index.exists());
        assert!(!merkle.exists());
    }
}
