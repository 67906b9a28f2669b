//! Page-backed allocators for Strata.
//!
//! Two independent allocators share one virtual-memory source
//! ([`OsMemory`] by default, any [`VirtualMemory`](strata_core::VirtualMemory)
//! in tests):
//!
//! ```text
//! PagedBump              transient bytes, freed in bulk
//! └── Region × N         pages of page_size × pages_per_block, newest last
//!
//! Arena<T>               pooled values behind generational handles
//! ├── SlotTracker
//! │   ├── free bitmap    one Region, 1 bit per slot (set = free)
//! │   └── generations    one Region, u32 per slot
//! └── Vec<Option<T>>     payload, parallel to the slot space
//! ```
//!
//! # Handles
//!
//! A [`Handle`] is `(generation, index)`. It stays valid until the slot is
//! removed; after that the slot's generation has moved on and the handle is
//! rejected by every lookup, even once the index is reused.
//!
//! # Unsafe code
//!
//! `unsafe` is confined to `raw.rs` (mmap/munmap and typed views over
//! mapped regions) and `bump.rs` (pointer bumping). Every block carries a
//! `// SAFETY:` comment.
//!
//! None of the types here are thread-safe.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod bump;
pub mod config;
pub mod error;
pub mod handle;
pub mod iter;
mod raw;
pub mod tracker;

pub use arena::Arena;
pub use bump::PagedBump;
pub use config::{ArenaConfig, BumpConfig};
pub use error::ArenaError;
pub use handle::Handle;
pub use iter::{Occupied, SlotCursor};
pub use raw::OsMemory;
pub use tracker::SlotTracker;
