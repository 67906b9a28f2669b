//! Test utilities for Strata development.
//!
//! Provides reproducible key streams ([`KeyStream`], [`colliding_keys`])
//! and a counting [`TrackingMemory`] wrapper for checking page accounting
//! and injecting virtual-memory failures.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::TrackingMemory;

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strata_core::HashKey;

/// Seed used by the end-to-end scenarios when a test has no reason to pick
/// its own.
pub const DEFAULT_SEED: u64 = 0x5eed_cafe;

/// Seeded, reproducible stream of pseudo-random keys.
///
/// Two streams built from the same seed yield the same sequence.
pub struct KeyStream {
    rng: ChaCha8Rng,
}

impl KeyStream {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Next raw 32-bit value. May be a sentinel.
    pub fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    /// Next key, hashed so it never collides with a sentinel.
    pub fn next_key(&mut self) -> HashKey {
        HashKey::hash_u32(self.rng.next_u32())
    }

    /// `n` distinct keys, in generation order.
    pub fn distinct_keys(&mut self, n: usize) -> Vec<HashKey> {
        let mut keys: Vec<HashKey> = Vec::with_capacity(n);
        while keys.len() < n {
            let key = self.next_key();
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

impl Iterator for KeyStream {
    type Item = HashKey;

    fn next(&mut self) -> Option<HashKey> {
        Some(self.next_key())
    }
}

/// `n` distinct keys whose home slot in a table of `capacity` slots is
/// `home`, so each probes through the slots of the ones before it.
///
/// `capacity` must be a power of two.
pub fn colliding_keys(capacity: u32, home: u32, n: usize) -> Vec<HashKey> {
    assert!(capacity.is_power_of_two(), "capacity must be a power of two");
    let mask = capacity - 1;
    (1..=u32::MAX / capacity)
        .map(|k| k * capacity + (home & mask))
        .filter_map(HashKey::new)
        .take(n)
        .collect()
}
