//! Core types and traits for the Strata memory primitives.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! abstractions shared by the allocator and index crates: the
//! [`VirtualMemory`] source contract with its owned [`Region`] token, the
//! [`HashKey`] type with its reserved sentinel values, and [`MemoryError`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod error;
pub mod key;
pub mod memory;

pub use error::MemoryError;
pub use key::{hash_bytes, HashKey};
pub use memory::{Region, VirtualMemory};
