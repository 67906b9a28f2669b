//! Low-level primitives for arena memory operations.
//!
//! [`OsMemory`] maps anonymous memory with `mmap(2)`. [`Mapping`] lays a
//! typed slice over one region for the slot tracker's bookkeeping tables.
//! Every `unsafe` block in this module carries a `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::marker::PhantomData;
use std::mem::{align_of, size_of};
use std::ptr::{self, NonNull};
use std::sync::OnceLock;

use log::debug;
use strata_core::{MemoryError, Region, VirtualMemory};

/// Virtual memory from the operating system.
///
/// Regions are private anonymous mappings, readable and writable,
/// zero-filled by the kernel and aligned to the OS page size.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsMemory;

impl OsMemory {
    /// Create a handle to the OS memory source.
    pub const fn new() -> Self {
        Self
    }
}

static PAGE_SIZE: OnceLock<usize> = OnceLock::new();

fn os_page_size() -> usize {
    *PAGE_SIZE.get_or_init(|| {
        // SAFETY: sysconf has no preconditions.
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size > 0 {
            size as usize
        } else {
            4096
        }
    })
}

fn last_errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

impl VirtualMemory for OsMemory {
    fn page_size(&self) -> usize {
        os_page_size()
    }

    fn acquire(&self, size: usize) -> Result<Region, MemoryError> {
        if size == 0 {
            return Err(MemoryError::InvalidSize { size });
        }
        // SAFETY: a private anonymous mapping with no address hint and no
        // file descriptor touches no existing memory.
        let addr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if addr == libc::MAP_FAILED {
            return Err(MemoryError::MapFailed {
                size,
                errno: last_errno(),
            });
        }
        let ptr =
            NonNull::new(addr.cast::<u8>()).ok_or(MemoryError::MapFailed { size, errno: 0 })?;
        debug!("mapped {size} bytes at {addr:p}");
        // SAFETY: mmap just returned a fresh, zero-filled, page-aligned
        // mapping of `size` bytes that nothing else refers to.
        Ok(unsafe { Region::from_raw_parts(ptr, size) })
    }

    fn release(&self, region: Region) -> Result<(), MemoryError> {
        if region.is_empty() {
            return Ok(());
        }
        let (ptr, len) = region.into_raw_parts();
        // SAFETY: the region token owned this mapping exclusively and is
        // consumed here, so the mapping is unmapped exactly once.
        let rc = unsafe { libc::munmap(ptr.as_ptr().cast(), len) };
        if rc != 0 {
            return Err(MemoryError::UnmapFailed {
                size: len,
                errno: last_errno(),
            });
        }
        debug!("unmapped {len} bytes at {:p}", ptr.as_ptr());
        Ok(())
    }
}

/// Element types whose all-zero bit pattern is a valid value.
pub(crate) trait Zeroable: Copy {}

impl Zeroable for u32 {}
impl Zeroable for u64 {}

/// A fixed-length typed slice over one owned region.
///
/// The region is released through [`Mapping::release`]; dropping a
/// `Mapping` without releasing it leaks the mapping.
pub(crate) struct Mapping<T: Zeroable> {
    region: Region,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: Zeroable> Mapping<T> {
    /// Map zero-filled storage for `len` elements, rounded up to whole pages.
    pub(crate) fn acquire<M: VirtualMemory>(memory: &M, len: usize) -> Result<Self, MemoryError> {
        let bytes = len
            .checked_mul(size_of::<T>())
            .filter(|&b| b > 0)
            .ok_or(MemoryError::InvalidSize { size: len })?;
        let page = memory.page_size();
        let bytes = bytes
            .div_ceil(page)
            .checked_mul(page)
            .ok_or(MemoryError::InvalidSize { size: bytes })?;
        let region = memory.acquire(bytes)?;
        if region.addr() % align_of::<T>() != 0 {
            let addr = region.addr();
            memory.release(region)?;
            return Err(MemoryError::Misaligned {
                addr,
                align: align_of::<T>(),
            });
        }
        if region.len() < bytes {
            let size = region.len();
            memory.release(region)?;
            return Err(MemoryError::InvalidSize { size });
        }
        Ok(Self {
            region,
            len,
            _marker: PhantomData,
        })
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        if self.len == 0 {
            return &[];
        }
        // SAFETY: the region holds at least `len * size_of::<T>()` bytes,
        // is aligned for `T` (checked in `acquire`), was zero-filled, and
        // zero is a valid `T`. `&self` rules out concurrent mutation.
        unsafe { std::slice::from_raw_parts(self.region.as_ptr().cast::<T>(), self.len) }
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        if self.len == 0 {
            return &mut [];
        }
        // SAFETY: as in `as_slice`; `&mut self` guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.region.as_ptr().cast::<T>(), self.len) }
    }

    /// Hand the region back to `memory`, leaving this mapping empty.
    pub(crate) fn release<M: VirtualMemory>(&mut self, memory: &M) -> Result<(), MemoryError> {
        self.len = 0;
        let region = self.region.take();
        if region.is_empty() {
            return Ok(());
        }
        memory.release(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_power_of_two() {
        assert!(OsMemory.page_size().is_power_of_two());
    }

    #[test]
    fn acquired_region_is_zeroed_and_writable() {
        let mem = OsMemory::new();
        let size = mem.page_size() * 2;
        let region = mem.acquire(size).unwrap();
        assert_eq!(region.len(), size);
        assert_eq!(region.addr() % mem.page_size(), 0);
        let mut mapping: Mapping<u64> = Mapping {
            len: size / 8,
            region,
            _marker: PhantomData,
        };
        assert!(mapping.as_slice().iter().all(|&w| w == 0));
        mapping.as_mut_slice()[3] = 0xdead_beef;
        assert_eq!(mapping.as_slice()[3], 0xdead_beef);
        mapping.release(&mem).unwrap();
        assert!(mapping.as_slice().is_empty());
    }

    #[test]
    fn zero_size_acquire_is_rejected() {
        assert_eq!(
            OsMemory.acquire(0).unwrap_err(),
            MemoryError::InvalidSize { size: 0 }
        );
    }

    #[test]
    fn mapping_rounds_up_to_whole_pages() {
        let mem = OsMemory;
        let mut mapping = Mapping::<u32>::acquire(&mem, 3).unwrap();
        assert_eq!(mapping.as_slice(), &[0, 0, 0]);
        assert_eq!(mapping.region.len(), mem.page_size());
        mapping.release(&mem).unwrap();
    }

    #[test]
    fn releasing_twice_is_harmless() {
        let mem = OsMemory;
        let mut mapping = Mapping::<u64>::acquire(&mem, 1).unwrap();
        mapping.release(&mem).unwrap();
        mapping.release(&mem).unwrap();
    }

    #[test]
    fn empty_release_is_noop() {
        assert!(OsMemory.release(Region::empty()).is_ok());
    }
}
