//! Strata: low-level memory primitives for allocation-heavy, single-threaded
//! workloads.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Strata sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use strata::prelude::*;
//!
//! // Scratch memory, freed in bulk.
//! let scratch = PagedBump::new().unwrap();
//! let nums = scratch.alloc_slice_copy(&[1u32, 2, 3]).unwrap();
//! nums[0] = 10;
//!
//! // Pooled values behind generational handles.
//! let mut nodes = Arena::new().unwrap();
//! let a = nodes.insert("start").unwrap();
//! nodes.remove(a);
//! let b = nodes.insert("next").unwrap();
//! assert_eq!(a.index(), b.index());
//! assert_eq!(nodes.get(a), None);
//!
//! // Fixed-capacity map keyed by hashed bytes.
//! let mut seen = KeyMap::with_capacity(1024).unwrap();
//! seen.insert(HashKey::hash_of(b"start"), b).unwrap();
//! assert_eq!(seen.get(HashKey::hash_of(b"start")), Some(&b));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `strata-core` | `HashKey`, murmur3, `VirtualMemory`, `Region` |
//! | [`arena`] | `strata-arena` | `PagedBump`, `SlotTracker`, `Arena`, `OsMemory` |
//! | [`index`] | `strata-index` | `ProbingIndex`, `KeyMap`, `Stack` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Keys, hashing and the virtual-memory contract (`strata-core`).
pub use strata_core as types;

/// Bump and generational allocators (`strata-arena`).
///
/// [`arena::PagedBump`] for transient bytes, [`arena::Arena`] for pooled
/// values addressed by [`arena::Handle`].
pub use strata_arena as arena;

/// Fixed-capacity index, map and stack (`strata-index`).
pub use strata_index as index;

/// Common imports for typical Strata usage.
///
/// ```rust
/// use strata::prelude::*;
/// ```
pub mod prelude {
    // Core
    pub use strata_core::{HashKey, MemoryError, VirtualMemory};

    // Allocators
    pub use strata_arena::{
        Arena, ArenaConfig, ArenaError, BumpConfig, Handle, OsMemory, PagedBump, SlotCursor,
        SlotTracker,
    };

    // Index
    pub use strata_index::{IndexError, KeyMap, Probe, ProbingIndex, Stack};
}
