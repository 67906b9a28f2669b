//! Workload generators for the Strata benchmarks.
//!
//! - [`bump_requests`]: mixed-size, size-aligned bump allocation requests
//! - [`index_keys`]: hashed keys for index and map workloads
//!
//! Every generator is seeded, so a benchmark replays the same workload on
//! every run.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::alloc::Layout;

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strata_core::HashKey;

/// Largest request [`bump_requests`] produces, in bytes.
pub const MAX_REQUEST: usize = 1023;

/// Up to `n` allocation requests drawn from `seed`.
///
/// Each draw takes `r & 1023` as the size and the next power of two at or
/// above the size as the alignment. Zero-size draws are skipped, so the
/// result can be slightly shorter than `n`.
pub fn bump_requests(seed: u64, n: usize) -> Vec<Layout> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .filter_map(|_| {
            let size = (rng.next_u32() as usize) & MAX_REQUEST;
            if size == 0 {
                return None;
            }
            Layout::from_size_align(size, size.next_power_of_two()).ok()
        })
        .collect()
}

/// `n` hashed keys drawn from `seed`.
pub fn index_keys(seed: u64, n: usize) -> Vec<HashKey> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| HashKey::hash_u32(rng.next_u32())).collect()
}
