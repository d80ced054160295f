//! On-disk layout of the index and merkle cache files
//!
//! Both caches share the same envelope: a 32-byte fingerprint slot, an
//! 8-byte magic, an 8-byte little-endian record count, then the payload.
//! The fingerprint is the SHA-256 of every byte that follows the slot.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};

use crate::core::error::{PorError, Result};
use crate::storage::view::ByteView;

/// Magic bytes identifying an index cache file
pub const INDEX_MAGIC: [u8; 8] = [0x38, 0x08, 0x0d, 0xf4, 0x4a, 0x0c, 0x38, 0x73];

/// Magic bytes identifying a merkle cache file
pub const MERKLE_MAGIC: [u8; 8] = [0x68, 0xba, 0x80, 0xa5, 0x91, 0xd5, 0xf6, 0x43];

/// Domain separation tag for leaf hashes
pub const LEAF_TAG: &[u8] = b"ProofOfReserve_Leaf";

/// Domain separation tag for interior node hashes
pub const BRANCH_TAG: &[u8] = b"ProofOfReserve_Branch";

/// Size of the fingerprint slot at the start of each cache file
pub const FINGERPRINT_LEN: usize = 32;

/// Offset of the magic bytes
pub const MAGIC_OFFSET: u64 = 32;

/// Offset of the little-endian record count
pub const COUNT_OFFSET: u64 = 40;

/// Total header size: fingerprint + magic + count
pub const HEADER_LEN: u64 = 48;

/// Size of one merkle tree node
pub const NODE_LEN: u64 = 32;

/// One row of the index table: a record id and the absolute file offset of
/// its payload bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub id: u64,
    pub offset: u64,
}

impl IndexEntry {
    pub const SIZE: u64 = 16;

    pub fn new(id: u64, offset: u64) -> Self {
        Self { id, offset }
    }

    /// Little-endian wire form, id first
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut buf = [0u8; 16];
        LittleEndian::write_u64(&mut buf[..8], self.id);
        LittleEndian::write_u64(&mut buf[8..], self.offset);
        buf
    }

    /// Read row `row` of the table that starts right after the header
    ///
    /// The row number comes from a file-supplied count, so the offset
    /// arithmetic is checked rather than trusted.
    pub fn read_at(view: &ByteView<'_>, row: u64) -> Result<Self> {
        let base = row
            .checked_mul(Self::SIZE)
            .and_then(|rel| rel.checked_add(HEADER_LEN))
            .ok_or_else(|| PorError::format("index row offset overflows"))?;
        Ok(Self {
            id: view.u64_at(base)?,
            offset: view.u64_at(base + 8)?,
        })
    }
}

/// Path of the index cache that shadows `ledger_path`
pub fn index_path(ledger_path: &Path) -> PathBuf {
    cache_path(ledger_path, ".index")
}

/// Path of the merkle cache that shadows `ledger_path`
pub fn merkle_path(ledger_path: &Path) -> PathBuf {
    cache_path(ledger_path, ".merkle")
}

fn cache_path(ledger_path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(ledger_path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
