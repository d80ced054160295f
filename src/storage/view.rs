//! Bounds-checked reads over a mapped cache file
//!
//! Cache files drive their own interpretation (counts and offsets are read
//! from the file itself), so every access goes through this view and a
//! malformed file surfaces as a format error instead of an out-of-range
//! slice.

use byteorder::{ByteOrder, LittleEndian};

use crate::core::error::{PorError, Result};
use crate::core::types::Digest;

/// Read-only window over the raw bytes of a cache file
#[derive(Debug, Clone, Copy)]
pub struct ByteView<'a> {
    bytes: &'a [u8],
}

impl<'a> ByteView<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrow `len` bytes starting at `offset`
    pub fn bytes_at(&self, offset: u64, len: usize) -> Result<&'a [u8]> {
        let start = usize::try_from(offset)
            .map_err(|_| PorError::format(format!("offset {offset} overflows address space")))?;
        let end = start
            .checked_add(len)
            .ok_or_else(|| PorError::format(format!("read of {len} bytes at {offset} overflows")))?;
        self.bytes.get(start..end).ok_or_else(|| {
            PorError::format(format!(
                "read of {len} bytes at offset {offset} runs past end of file ({} bytes)",
                self.bytes.len()
            ))
        })
    }

    /// Read a little-endian u64 at `offset`
    pub fn u64_at(&self, offset: u64) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.bytes_at(offset, 8)?))
    }

    /// Read a 32-byte digest at `offset`
    pub fn digest_at(&self, offset: u64) -> Result<Digest> {
        let bytes = self.bytes_at(offset, Digest::SIZE)?;
        let mut digest = [0u8; Digest::SIZE];
        digest.copy_from_slice(bytes);
        Ok(Digest::from_bytes(digest))
    }

    /// Read a NUL-terminated UTF-8 string starting at `offset`
    pub fn cstr_at(&self, offset: u64) -> Result<&'a str> {
        let start = usize::try_from(offset)
            .map_err(|_| PorError::format(format!("offset {offset} overflows address space")))?;
        let tail = self
            .bytes
            .get(start..)
            .ok_or_else(|| PorError::format(format!("string offset {offset} past end of file")))?;
        let nul = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| PorError::format("payload string is missing its terminator"))?;
        std::str::from_utf8(&tail[..nul])
            .map_err(|_| PorError::format("payload string is not valid UTF-8"))
    }
}
