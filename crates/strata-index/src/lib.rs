//! Fixed-capacity hashing structures for Strata.
//!
//! - [`ProbingIndex`]: open-addressing set of [`HashKey`](strata_core::HashKey)s
//!   with linear probing and tombstone deletion. Capacity is fixed at
//!   construction; there is no rehashing.
//! - [`KeyMap`]: a `ProbingIndex` plus a value array indexed by slot.
//! - [`Stack`]: a doubling growable stack.
//!
//! Keep the load factor at or below one half for short probe runs. A table
//! whose every slot holds a live key rejects new keys with
//! [`IndexError::Full`]. Long-lived tables that see many removals also
//! accumulate tombstones, which lengthen misses until [`ProbingIndex::clear`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod map;
pub mod set;
pub mod stack;

pub use error::IndexError;
pub use map::KeyMap;
pub use set::{Probe, ProbingIndex};
pub use stack::Stack;
