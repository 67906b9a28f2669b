//! The virtual-memory source contract.
//!
//! Both the paged bump allocator and the slot tracker reserve their backing
//! memory from a [`VirtualMemory`] source. The OS-backed implementation lives
//! in `strata-arena`; tests wrap it to count and fail calls.

use std::fmt;
use std::ptr::NonNull;

use crate::error::MemoryError;

/// An owned region of mapped memory.
///
/// A `Region` is a move-only token: holding one means owning the mapping
/// it describes, and [`VirtualMemory::release`] consumes it, so a region
/// cannot be released twice. The zero-length [`Region::empty`] value owns
/// nothing and is the "no mapping" state.
pub struct Region {
    ptr: NonNull<u8>,
    len: usize,
}

impl Region {
    /// A zero-length region that owns no memory.
    pub const fn empty() -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
        }
    }

    /// Take ownership of a mapping.
    ///
    /// # Safety
    ///
    /// `ptr` must point to `len` bytes of readable, writable, zero-filled
    /// memory aligned to at least the source's page size. The memory must
    /// not be owned by anything else, and it must be releasable by the
    /// [`VirtualMemory`] source this region is eventually passed to.
    #[allow(unsafe_code)]
    pub const unsafe fn from_raw_parts(ptr: NonNull<u8>, len: usize) -> Self {
        Self { ptr, len }
    }

    /// Give up ownership, returning the start pointer and length.
    pub fn into_raw_parts(self) -> (NonNull<u8>, usize) {
        (self.ptr, self.len)
    }

    /// Replace `self` with [`Region::empty`] and return the previous value.
    pub fn take(&mut self) -> Self {
        std::mem::replace(self, Self::empty())
    }

    /// Start of the region.
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Start of the region as a non-null pointer.
    pub fn as_non_null(&self) -> NonNull<u8> {
        self.ptr
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this region owns no memory.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Start address, for alignment arithmetic.
    pub fn addr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Region({:#x}, {} bytes)", self.addr(), self.len)
    }
}

/// A source of page-aligned, zero-filled memory.
///
/// Implementations must hand out regions that satisfy the contract of
/// [`Region::from_raw_parts`]. Acquisition and release are the only
/// operations in the workspace that can fail for reasons outside the
/// program; failures are returned, never retried.
pub trait VirtualMemory {
    /// Granularity of mappings in bytes. Always a power of two.
    fn page_size(&self) -> usize;

    /// Map `size` bytes of zero-filled memory.
    ///
    /// `size` should be a multiple of [`page_size`](Self::page_size).
    fn acquire(&self, size: usize) -> Result<Region, MemoryError>;

    /// Unmap a region previously returned by [`acquire`](Self::acquire).
    ///
    /// Releasing an empty region is a no-op.
    fn release(&self, region: Region) -> Result<(), MemoryError>;
}

impl<M: VirtualMemory + ?Sized> VirtualMemory for &M {
    fn page_size(&self) -> usize {
        (**self).page_size()
    }

    fn acquire(&self, size: usize) -> Result<Region, MemoryError> {
        (**self).acquire(size)
    }

    fn release(&self, region: Region) -> Result<(), MemoryError> {
        (**self).release(region)
    }
}
