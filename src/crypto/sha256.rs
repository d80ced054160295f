//! SHA-256 engine behind every digest in the crate
//!
//! Written directly from FIPS 180-4: message-schedule expansion, the 64-round
//! compression function, and the 1-bit/zeros/length padding rule. One-shot
//! hashing streams full blocks without copying them through the internal
//! buffer; [`StreamHasher`] accepts data in arbitrary chunks and defers
//! padding to [`StreamHasher::hash`].

use crate::core::types::Digest;

/// Bytes per compression block
const BLOCK_LEN: usize = 64;

/// Initial hash state, the fractional parts of the square roots of the first
/// eight primes (FIPS 180-4 5.3.3)
const H: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a,
    0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// Round constants, the fractional parts of the cube roots of the first 64
/// primes (FIPS 180-4 4.2.2)
const K: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5,
    0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3,
    0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc,
    0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7,
    0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13,
    0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3,
    0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5,
    0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208,
    0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

/// Compute the SHA-256 digest of `data` in one pass
pub fn sha256(data: &[u8]) -> Digest {
    let mut state = H;

    let mut blocks = data.chunks_exact(BLOCK_LEN);
    for block in blocks.by_ref() {
        compress(&mut state, block);
    }

    let (padded, padded_len) = pad_tail(blocks.remainder(), data.len() as u64);
    for block in padded[..padded_len].chunks_exact(BLOCK_LEN) {
        compress(&mut state, block);
    }

    digest_from_state(&state)
}

/// Incremental SHA-256 over data delivered in arbitrary chunks
///
/// Each completed 512-bit block is compressed as soon as it fills; padding
/// and finalization happen only in [`hash`](Self::hash), so appending may
/// continue afterwards and [`reset`](Self::reset) returns the engine to its
/// fixed initial state for an unrelated message.
#[derive(Debug, Clone)]
pub struct StreamHasher {
    state: [u32; 8],
    buffer: [u8; BLOCK_LEN],
    buffered: usize,
    consumed: u64,
}

impl StreamHasher {
    /// Create a hasher in the fixed initial state
    pub fn new() -> Self {
        Self {
            state: H,
            buffer: [0u8; BLOCK_LEN],
            buffered: 0,
            consumed: 0,
        }
    }

    /// Feed `data`, compressing each completed block immediately
    ///
    /// Returns the total number of bytes consumed since construction or the
    /// last reset.
    pub fn append(&mut self, data: &[u8]) -> u64 {
        self.consumed += data.len() as u64;

        let mut rest = data;
        if self.buffered > 0 {
            let take = (BLOCK_LEN - self.buffered).min(rest.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&rest[..take]);
            self.buffered += take;
            rest = &rest[take..];
            if self.buffered == BLOCK_LEN {
                compress(&mut self.state, &self.buffer);
                self.buffered = 0;
            }
        }

        let mut blocks = rest.chunks_exact(BLOCK_LEN);
        for block in blocks.by_ref() {
            compress(&mut self.state, block);
        }

        let remainder = blocks.remainder();
        if !remainder.is_empty() {
            self.buffer[..remainder.len()].copy_from_slice(remainder);
            self.buffered = remainder.len();
        }

        self.consumed
    }

    /// Finalize the message fed so far and return its digest
    ///
    /// The engine itself is left untouched, so more data may be appended or
    /// the same digest recomputed.
    pub fn hash(&self) -> Digest {
        let mut state = self.state;
        let (padded, padded_len) = pad_tail(&self.buffer[..self.buffered], self.consumed);
        for block in padded[..padded_len].chunks_exact(BLOCK_LEN) {
            compress(&mut state, block);
        }
        digest_from_state(&state)
    }

    /// Discard all consumed data and return to the fixed initial state
    pub fn reset(&mut self) {
        self.state = H;
        self.buffered = 0;
        self.consumed = 0;
    }

    /// Total bytes consumed since construction or the last reset
    pub fn consumed(&self) -> u64 {
        self.consumed
    }
}

impl Default for StreamHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Pad a final partial block: a single 1-bit, zeros to 448 mod 512 bits,
/// then the message length in bits as a 64-bit big-endian integer
///
/// `tail` must be shorter than one block. Returns the padded buffer and its
/// length, one block when the tail leaves room for the trailer and two
/// otherwise.
fn pad_tail(tail: &[u8], message_len: u64) -> ([u8; 2 * BLOCK_LEN], usize) {
    debug_assert!(tail.len() < BLOCK_LEN);

    let mut padded = [0u8; 2 * BLOCK_LEN];
    padded[..tail.len()].copy_from_slice(tail);
    padded[tail.len()] = 0x80;

    let padded_len = if tail.len() < BLOCK_LEN - 8 {
        BLOCK_LEN
    } else {
        2 * BLOCK_LEN
    };

    let bit_len = message_len.wrapping_mul(8);
    padded[padded_len - 8..padded_len].copy_from_slice(&bit_len.to_be_bytes());

    (padded, padded_len)
}

/// Run the 64-round compression function over one 512-bit block
fn compress(state: &mut [u32; 8], block: &[u8]) {
    debug_assert_eq!(block.len(), BLOCK_LEN);

    // message schedule: 16 big-endian words expanded to 64
    let mut w = [0u32; 64];
    for (word, bytes) in w.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    for i in 16..64 {
        let s0 = w[i - 15].rotate_right(7) ^ w[i - 15].rotate_right(18) ^ (w[i - 15] >> 3);
        let s1 = w[i - 2].rotate_right(17) ^ w[i - 2].rotate_right(19) ^ (w[i - 2] >> 10);
        w[i] = w[i - 16]
            .wrapping_add(s0)
            .wrapping_add(w[i - 7])
            .wrapping_add(s1);
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;
    for i in 0..64 {
        let s1 = e.rotate_right(6) ^ e.rotate_right(11) ^ e.rotate_right(25);
        let ch = (e & f) ^ (!e & g);
        let temp1 = h
            .wrapping_add(s1)
            .wrapping_add(ch)
            .wrapping_add(K[i])
            .wrapping_add(w[i]);
        let s0 = a.rotate_right(2) ^ a.rotate_right(13) ^ a.rotate_right(22);
        let maj = (a & b) ^ (a & c) ^ (b & c);
        let temp2 = s0.wrapping_add(maj);

        h = g;
        g = f;
        f = e;
        e = d.wrapping_add(temp1);
        d = c;
        c = b;
        b = a;
        a = temp1.wrapping_add(temp2);
    }

    state[0] = state[0].wrapping_add(a);
    state[1] = state[1].wrapping_add(b);
    state[2] = state[2].wrapping_add(c);
    state[3] = state[3].wrapping_add(d);
    state[4] = state[4].wrapping_add(e);
    state[5] = state[5].wrapping_add(f);
    state[6] = state[6].wrapping_add(g);
    state[7] = state[7].wrapping_add(h);
}

/// Serialize the working state as a big-endian digest
fn digest_from_state(state: &[u32; 8]) -> Digest {
    let mut out = [0u8; 32];
    for (bytes, word) in out.chunks_exact_mut(4).zip(state) {
        bytes.copy_from_slice(&word.to_be_bytes());
    }
    Digest::from_bytes(out)
}
