//! Paged bump allocation for transient, unstructured memory.
//!
//! A [`PagedBump`] maps fixed-size pages on demand and carves allocations
//! downward from the end of the newest page. Allocation never frees; memory
//! comes back in bulk through [`PagedBump::clear`] (keep one page) or
//! [`PagedBump::dispose`] / drop (release everything).
//!
//! ```text
//!  page N-1 (full)            page N (current)
//! ┌───────────────────┐      ┌──────────────┬──────┬──────┬────┐
//! │ c │   b   │   a   │      │     free     │  f   │  e   │ d  │
//! └───────────────────┘      └──────────────┴──────┴──────┴────┘
//!                             ▲             ▲                  ▲
//!                           start         cursor              end
//! ```
//!
//! The list of pages lives in the allocator, newest last, so no link
//! pointer is stored inside the pages and the whole page is usable.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::cell::{Cell, RefCell};
use std::ptr::NonNull;

use log::{debug, warn};
use strata_core::{Region, VirtualMemory};

use crate::config::BumpConfig;
use crate::error::ArenaError;
use crate::raw::OsMemory;

/// Bump allocator over a list of fixed-size virtual-memory pages.
///
/// Allocation takes `&self`, so references handed out by [`alloc`] and
/// friends can be held side by side; they stay valid until the allocator is
/// cleared or dropped, both of which need `&mut self` or ownership.
/// Destructors of values placed here never run.
///
/// The allocator is single-threaded (`!Sync`).
///
/// [`alloc`]: PagedBump::alloc
pub struct PagedBump<M: VirtualMemory = OsMemory> {
    memory: M,
    /// Size of every page in bytes.
    page_bytes: usize,
    /// Mapped pages, oldest first. The last entry is the page being bumped.
    pages: RefCell<Vec<Region>>,
    /// Start of the current page, or `None` before the first page.
    base: Cell<Option<NonNull<u8>>>,
    /// Offset of the lowest byte handed out in the current page.
    cursor: Cell<usize>,
}

impl PagedBump<OsMemory> {
    /// Create an allocator over OS memory with the default page size.
    ///
    /// No memory is mapped until the first allocation.
    pub fn new() -> Result<Self, ArenaError> {
        Self::with_config(BumpConfig::default(), OsMemory)
    }
}

impl<M: VirtualMemory> PagedBump<M> {
    /// Create an allocator with an explicit config and memory source.
    pub fn with_config(config: BumpConfig, memory: M) -> Result<Self, ArenaError> {
        let page_bytes = config.block_bytes(memory.page_size())?;
        Ok(Self {
            memory,
            page_bytes,
            pages: RefCell::new(Vec::new()),
            base: Cell::new(None),
            cursor: Cell::new(0),
        })
    }

    /// Reserve memory for `layout`, returning a pointer to uninitialised bytes.
    ///
    /// Returns `Ok(None)` for a zero-size layout. The bytes are zero on a
    /// page's first use but may hold stale data after [`clear`](Self::clear).
    ///
    /// Fails with [`ArenaError::AllocationTooLarge`] if `layout` can never
    /// fit in one page and with [`ArenaError::Memory`] if a new page could
    /// not be mapped.
    pub fn alloc_layout(&self, layout: Layout) -> Result<Option<NonNull<u8>>, ArenaError> {
        let size = layout.size();
        if size == 0 {
            return Ok(None);
        }
        let align = layout.align();

        if let Some(ptr) = self.bump(size, align) {
            return Ok(Some(ptr));
        }

        if size > self.page_bytes || align > self.page_bytes {
            return Err(self.too_large(layout));
        }
        self.push_page()?;
        // A fresh page is aligned to at least the OS page size, so anything
        // up to `page_bytes` with alignment up to that fits. Larger
        // alignments depend on where the kernel placed the page.
        self.bump(size, align)
            .map(Some)
            .ok_or_else(|| self.too_large(layout))
    }

    /// Move `value` into the allocator and return a reference to it.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc<T>(&self, value: T) -> Result<&mut T, ArenaError> {
        let ptr = match self.alloc_layout(Layout::new::<T>())? {
            Some(ptr) => ptr.cast::<T>(),
            None => NonNull::dangling(),
        };
        // SAFETY: `ptr` is aligned for `T` and covers `size_of::<T>()` bytes
        // that no other reference points to (or is dangling for a ZST). The
        // bytes stay mapped until `&mut self` or ownership is taken.
        unsafe {
            ptr.as_ptr().write(value);
            Ok(&mut *ptr.as_ptr())
        }
    }

    /// Copy `src` into the allocator.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_copy<T: Copy>(&self, src: &[T]) -> Result<&mut [T], ArenaError> {
        let dst = self.alloc_array::<T>(src.len())?;
        // SAFETY: `dst` is a fresh, aligned block of `src.len()` elements
        // that cannot overlap `src`, which is borrowed from elsewhere.
        unsafe {
            std::ptr::copy_nonoverlapping(src.as_ptr(), dst.as_ptr(), src.len());
            Ok(std::slice::from_raw_parts_mut(dst.as_ptr(), src.len()))
        }
    }

    /// Allocate `len` copies of `value`.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_fill<T: Copy>(&self, len: usize, value: T) -> Result<&mut [T], ArenaError> {
        let dst = self.alloc_array::<T>(len)?;
        // SAFETY: `dst` is a fresh, aligned block of `len` elements; every
        // element is written before the slice is formed.
        unsafe {
            for i in 0..len {
                dst.as_ptr().add(i).write(value);
            }
            Ok(std::slice::from_raw_parts_mut(dst.as_ptr(), len))
        }
    }

    /// Release every page except the current one and make it empty again.
    ///
    /// References previously handed out are invalidated, which the
    /// `&mut self` receiver enforces. Releases continue past a failure;
    /// the first error is returned.
    pub fn clear(&mut self) -> Result<(), ArenaError> {
        let pages = self.pages.get_mut();
        let Some(keep) = pages.pop() else {
            return Ok(());
        };
        let mut result = Ok(());
        for region in pages.drain(..) {
            if let Err(err) = self.memory.release(region) {
                result = result.and(Err(err.into()));
            }
        }
        debug!("bump clear: kept 1 page of {} bytes", keep.len());
        pages.push(keep);
        self.cursor.set(self.page_bytes);
        result
    }

    /// Release every page, surfacing the first release failure.
    pub fn dispose(mut self) -> Result<(), ArenaError> {
        self.release_all()
    }

    /// Number of pages currently mapped.
    pub fn page_count(&self) -> usize {
        self.pages.borrow().len()
    }

    /// Size of one page in bytes.
    pub fn page_bytes(&self) -> usize {
        self.page_bytes
    }

    /// Largest single allocation (with alignment up to the OS page size).
    pub fn capacity(&self) -> usize {
        self.page_bytes
    }

    /// Bytes consumed in the current page, including alignment padding.
    pub fn used_bytes(&self) -> usize {
        match self.base.get() {
            Some(_) => self.page_bytes - self.cursor.get(),
            None => 0,
        }
    }

    /// The memory source backing this allocator.
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Try to carve `size` bytes out of the current page.
    fn bump(&self, size: usize, align: usize) -> Option<NonNull<u8>> {
        let base = self.base.get()?;
        let start = base.as_ptr() as usize;
        let top = start.checked_add(self.cursor.get())?.checked_sub(size)?;
        let aligned = top & !(align - 1);
        if aligned < start {
            return None;
        }
        let offset = aligned - start;
        self.cursor.set(offset);
        // SAFETY: `offset + size <= cursor <= page_bytes`, so the result
        // stays inside the current page.
        Some(unsafe { NonNull::new_unchecked(base.as_ptr().add(offset)) })
    }

    fn alloc_array<T>(&self, len: usize) -> Result<NonNull<T>, ArenaError> {
        let layout = Layout::array::<T>(len).map_err(|_| ArenaError::AllocationTooLarge {
            size: usize::MAX,
            align: std::mem::align_of::<T>(),
            capacity: self.page_bytes,
        })?;
        Ok(match self.alloc_layout(layout)? {
            Some(ptr) => ptr.cast::<T>(),
            None => NonNull::dangling(),
        })
    }

    fn push_page(&self) -> Result<(), ArenaError> {
        let region = self.memory.acquire(self.page_bytes)?;
        self.base.set(Some(region.as_non_null()));
        self.cursor.set(self.page_bytes);
        let mut pages = self.pages.borrow_mut();
        pages.push(region);
        debug!("bump page {} mapped ({} bytes)", pages.len(), self.page_bytes);
        Ok(())
    }

    fn release_all(&mut self) -> Result<(), ArenaError> {
        let mut result = Ok(());
        for region in self.pages.get_mut().drain(..).rev() {
            if let Err(err) = self.memory.release(region) {
                result = result.and(Err(err.into()));
            }
        }
        self.base.set(None);
        self.cursor.set(0);
        result
    }

    fn too_large(&self, layout: Layout) -> ArenaError {
        ArenaError::AllocationTooLarge {
            size: layout.size(),
            align: layout.align(),
            capacity: self.page_bytes,
        }
    }
}

impl<M: VirtualMemory> Drop for PagedBump<M> {
    fn drop(&mut self) {
        if let Err(err) = self.release_all() {
            warn!("bump allocator leaked pages on drop: {err}");
        }
    }
}
