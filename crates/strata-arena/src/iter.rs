//! Walks over occupied slots.
//!
//! [`Occupied`] borrows a tracker, so the slot set cannot change under it.
//! [`SlotCursor`] holds only a position and re-reads the bitmap on every
//! step, which lets callers remove slots while walking.

use std::iter::FusedIterator;

use strata_core::VirtualMemory;

use crate::tracker::SlotTracker;

const WORD_BITS: usize = u64::BITS as usize;

/// First occupied index in `from..end`, reading `free` (set bit = free).
fn next_occupied(free: &[u64], from: usize, end: usize) -> Option<usize> {
    if from >= end {
        return None;
    }
    let mut w = from / WORD_BITS;
    let mut word = !free[w] & (u64::MAX << (from % WORD_BITS));
    loop {
        if word != 0 {
            let index = w * WORD_BITS + word.trailing_zeros() as usize;
            return (index < end).then_some(index);
        }
        w += 1;
        if w * WORD_BITS >= end {
            return None;
        }
        word = !free[w];
    }
}

/// Ascending iterator over occupied slot indices.
///
/// Returned by [`SlotTracker::iter`].
#[derive(Clone, Debug)]
pub struct Occupied<'a> {
    free: &'a [u64],
    next: usize,
    end: usize,
}

impl<'a> Occupied<'a> {
    pub(crate) fn new(free: &'a [u64], end: usize) -> Self {
        Self { free, next: 0, end }
    }
}

impl Iterator for Occupied<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let Some(index) = next_occupied(self.free, self.next, self.end) else {
            self.next = self.end;
            return None;
        };
        self.next = index + 1;
        Some(index as u32)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.end.saturating_sub(self.next)))
    }
}

impl FusedIterator for Occupied<'_> {}

/// Forward-only position in a tracker's slot space.
///
/// Unlike [`Occupied`] it does not borrow the tracker between steps. Each
/// [`advance`](Self::advance) sees the bitmap as it is at that moment:
/// slots freed ahead of the cursor are skipped, and slots claimed behind
/// it are not revisited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotCursor {
    next: u32,
}

impl SlotCursor {
    /// A cursor positioned before slot 0.
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Move to the next occupied slot and return its index.
    pub fn advance<M: VirtualMemory>(&mut self, tracker: &SlotTracker<M>) -> Option<u32> {
        let end = tracker.element_num() as usize;
        let index = next_occupied(tracker.bitmap(), self.next as usize, end)?;
        self.next = index as u32 + 1;
        Some(index as u32)
    }

    /// Index the next [`advance`](Self::advance) starts scanning from.
    pub fn position(&self) -> u32 {
        self.next
    }
}
