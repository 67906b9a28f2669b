//! Virtual-memory test double.
//!
//! [`TrackingMemory`] wraps a real memory source, counts every acquire and
//! release that reaches it, and can be told to start failing after a fixed
//! number of successful acquisitions.

use std::cell::Cell;
use std::rc::Rc;

use strata_core::{MemoryError, Region, VirtualMemory};

/// `ENOMEM`, reported by injected failures.
pub const INJECTED_ERRNO: i32 = 12;

#[derive(Default)]
struct Counters {
    acquires: Cell<usize>,
    releases: Cell<usize>,
    live_bytes: Cell<usize>,
    fail_after: Cell<Option<usize>>,
}

/// Counting wrapper around another [`VirtualMemory`].
///
/// Clones share their counters, so a test can keep one clone for
/// inspection while the allocator under test owns the other.
#[derive(Clone)]
pub struct TrackingMemory<M> {
    inner: M,
    counters: Rc<Counters>,
}

impl<M: VirtualMemory> TrackingMemory<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            counters: Rc::default(),
        }
    }

    /// Allow `n` more successful acquisitions, then fail every one after.
    pub fn fail_after(&self, n: usize) {
        self.counters
            .fail_after
            .set(Some(self.counters.acquires.get() + n));
    }

    /// Successful acquisitions so far.
    pub fn acquire_count(&self) -> usize {
        self.counters.acquires.get()
    }

    /// Successful releases of non-empty regions so far.
    pub fn release_count(&self) -> usize {
        self.counters.releases.get()
    }

    /// Regions acquired and not yet released.
    pub fn live_regions(&self) -> usize {
        self.acquire_count() - self.release_count()
    }

    /// Bytes acquired and not yet released.
    pub fn live_bytes(&self) -> usize {
        self.counters.live_bytes.get()
    }
}

impl<M: VirtualMemory> VirtualMemory for TrackingMemory<M> {
    fn page_size(&self) -> usize {
        self.inner.page_size()
    }

    fn acquire(&self, size: usize) -> Result<Region, MemoryError> {
        let c = &self.counters;
        if c.fail_after.get().is_some_and(|limit| c.acquires.get() >= limit) {
            return Err(MemoryError::MapFailed {
                size,
                errno: INJECTED_ERRNO,
            });
        }
        let region = self.inner.acquire(size)?;
        c.acquires.set(c.acquires.get() + 1);
        c.live_bytes.set(c.live_bytes.get() + region.len());
        Ok(region)
    }

    fn release(&self, region: Region) -> Result<(), MemoryError> {
        if region.is_empty() {
            return Ok(());
        }
        let len = region.len();
        self.inner.release(region)?;
        let c = &self.counters;
        c.releases.set(c.releases.get() + 1);
        c.live_bytes.set(c.live_bytes.get() - len);
        Ok(())
    }
}
