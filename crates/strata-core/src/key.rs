//! Hash keys and the byte hash that produces them.
//!
//! The probing index stores keys as raw `u32` values and reserves two of
//! them as slot states: `0` marks a slot that was never used and `1` marks a
//! slot whose key was removed. A [`HashKey`] can never hold either value,
//! so a key that type-checks is always insertable.

use std::fmt;

/// A 32-bit key that is never equal to a reserved slot sentinel.
///
/// Construct one from a raw value with [`HashKey::new`] (rejecting the
/// sentinels) or by hashing bytes with [`HashKey::hash_of`] (folding the
/// sentinels onto live values).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HashKey(u32);

impl HashKey {
    /// Raw slot value for a slot that has never held a key.
    pub const EMPTY_RAW: u32 = 0;

    /// Raw slot value for a slot whose key was removed.
    pub const TOMBSTONE_RAW: u32 = 1;

    /// Wrap a raw value, returning `None` for either sentinel.
    pub const fn new(raw: u32) -> Option<Self> {
        if raw > Self::TOMBSTONE_RAW {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// Hash `bytes` with [`hash_bytes`] and turn the result into a key.
    ///
    /// The two sentinel outputs are shifted up by two. This merges each of
    /// them with one other hash value, which only matters as an extra
    /// collision and never as a correctness problem.
    pub fn hash_of(bytes: &[u8]) -> Self {
        Self::fold(hash_bytes(bytes))
    }

    /// Hash the little-endian bytes of a `u32`.
    pub fn hash_u32(value: u32) -> Self {
        Self::hash_of(&value.to_le_bytes())
    }

    /// Hash the little-endian bytes of a `u64`.
    pub fn hash_u64(value: u64) -> Self {
        Self::hash_of(&value.to_le_bytes())
    }

    /// The raw key value. Never `0` or `1`.
    pub const fn get(self) -> u32 {
        self.0
    }

    const fn fold(raw: u32) -> Self {
        if raw <= Self::TOMBSTONE_RAW {
            Self(raw + 2)
        } else {
            Self(raw)
        }
    }
}

impl fmt::Display for HashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

const SEED: u32 = 0x1b87_3593;

fn scramble(k: u32) -> u32 {
    k.wrapping_mul(0xcc9e_2d51)
        .rotate_left(15)
        .wrapping_mul(0x1b87_3593)
}

/// MurmurHash3 (x86, 32-bit) of `key`.
///
/// Blocks are read little-endian so results are identical on every
/// platform.
pub fn hash_bytes(key: &[u8]) -> u32 {
    let mut h = SEED;
    let mut blocks = key.chunks_exact(4);
    for block in &mut blocks {
        let k = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        h ^= scramble(k);
        h = h.rotate_left(13);
        h = h.wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let mut k = 0u32;
    for &byte in blocks.remainder().iter().rev() {
        k <<= 8;
        k |= u32::from(byte);
    }
    h ^= scramble(k);

    h ^= key.len() as u32;
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}
