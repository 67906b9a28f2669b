//! Generational slot bookkeeping without payload storage.
//!
//! [`SlotTracker`] decides which slot index a new element goes into and
//! whether a [`Handle`] still names a live slot. Callers keep their values
//! in a parallel array of their own (or use [`Arena`](crate::Arena), which
//! does exactly that).
//!
//! Both tables are mapped once at construction, sized for
//! [`ArenaConfig::max_elements`]:
//!
//! - the free bitmap, one bit per slot, set when the slot is free;
//! - the generation table, one `u32` per slot, bumped on every free.
//!
//! Slots at or beyond `element_num` are never marked free: the tracker grows
//! by appending exactly one slot at a time.

use std::fmt;

use log::{debug, warn};
use strata_core::VirtualMemory;

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::handle::Handle;
use crate::iter::Occupied;
use crate::raw::{Mapping, OsMemory};

const WORD_BITS: usize = u64::BITS as usize;

/// Handle allocator over a fixed-maximum slot space.
pub struct SlotTracker<M: VirtualMemory = OsMemory> {
    memory: M,
    free: Mapping<u64>,
    generations: Mapping<u32>,
    element_num: u32,
    free_count: u32,
    max_elements: u32,
}

impl SlotTracker<OsMemory> {
    /// Create a tracker over OS memory with the default slot limit.
    pub fn new() -> Result<Self, ArenaError> {
        Self::with_config(ArenaConfig::default(), OsMemory)
    }
}

impl<M: VirtualMemory> SlotTracker<M> {
    /// Create a tracker, mapping its bitmap and generation table up front.
    pub fn with_config(config: ArenaConfig, memory: M) -> Result<Self, ArenaError> {
        config.validate()?;
        let mut free = Mapping::<u64>::acquire(&memory, config.bitmap_words())?;
        let generations = match Mapping::<u32>::acquire(&memory, config.max_elements as usize) {
            Ok(generations) => generations,
            Err(err) => {
                if let Err(release) = free.release(&memory) {
                    warn!("slot bitmap leaked after failed setup: {release}");
                }
                return Err(err.into());
            }
        };
        debug!("slot tracker ready for {} slots", config.max_elements);
        Ok(Self {
            memory,
            free,
            generations,
            element_num: 0,
            free_count: 0,
            max_elements: config.max_elements,
        })
    }

    /// Claim the lowest-numbered free slot, or append a new one.
    ///
    /// A reused slot keeps the generation it was given when it was freed; a
    /// fresh slot starts at generation 0.
    pub fn insert(&mut self) -> Result<Handle, ArenaError> {
        if self.free_count > 0 {
            if let Some(index) = self.claim_free() {
                self.free_count -= 1;
                return Ok(self.handle_unchecked(index));
            }
        }
        if self.element_num == self.max_elements {
            return Err(ArenaError::CapacityExceeded {
                requested: self.element_num as usize + 1,
                capacity: self.max_elements as usize,
            });
        }
        let index = self.element_num;
        self.element_num += 1;
        Ok(self.handle_unchecked(index))
    }

    /// Free the slot `handle` names. Returns `false` if the handle is stale
    /// or out of range, in which case nothing changes.
    pub fn remove(&mut self, handle: Handle) -> bool {
        if !self.contains(handle) {
            return false;
        }
        let index = handle.index() as usize;
        self.free.as_mut_slice()[index / WORD_BITS] |= 1 << (index % WORD_BITS);
        let generation = &mut self.generations.as_mut_slice()[index];
        *generation = generation.wrapping_add(1);
        self.free_count += 1;
        true
    }

    /// Whether `handle` names a live slot.
    pub fn contains(&self, handle: Handle) -> bool {
        let index = handle.index();
        self.is_occupied(index) && self.generations.as_slice()[index as usize] == handle.generation()
    }

    /// Handle for the live slot at `index`, if there is one.
    pub fn handle_at(&self, index: u32) -> Option<Handle> {
        self.is_occupied(index).then(|| self.handle_unchecked(index))
    }

    /// Number of live slots.
    pub fn len(&self) -> usize {
        (self.element_num - self.free_count) as usize
    }

    /// Whether no slot is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// High-water mark: slots ever handed out, live or free.
    pub fn element_num(&self) -> u32 {
        self.element_num
    }

    /// Configured slot limit.
    pub fn max_elements(&self) -> u32 {
        self.max_elements
    }

    /// Fraction of `element_num` slots that are live; 0.0 before any insert.
    pub fn utilization(&self) -> f64 {
        if self.element_num == 0 {
            return 0.0;
        }
        self.len() as f64 / f64::from(self.element_num)
    }

    /// Live slot indices in ascending order.
    pub fn iter(&self) -> Occupied<'_> {
        Occupied::new(self.bitmap(), self.element_num as usize)
    }

    /// Release both mappings, surfacing the first failure.
    pub fn dispose(mut self) -> Result<(), ArenaError> {
        self.release_all()
    }

    /// The bitmap words covering `0..element_num`.
    pub(crate) fn bitmap(&self) -> &[u64] {
        let words = (self.element_num as usize).div_ceil(WORD_BITS);
        &self.free.as_slice()[..words]
    }

    fn is_occupied(&self, index: u32) -> bool {
        if index >= self.element_num {
            return false;
        }
        let index = index as usize;
        (self.free.as_slice()[index / WORD_BITS] & (1 << (index % WORD_BITS))) == 0
    }

    fn handle_unchecked(&self, index: u32) -> Handle {
        Handle::new(self.generations.as_slice()[index as usize], index)
    }

    /// Clear the lowest set bit in the bitmap and return its index.
    fn claim_free(&mut self) -> Option<u32> {
        let words = (self.element_num as usize).div_ceil(WORD_BITS);
        let bitmap = &mut self.free.as_mut_slice()[..words];
        for (w, word) in bitmap.iter_mut().enumerate() {
            if *word != 0 {
                let bit = word.trailing_zeros() as usize;
                *word &= !(1 << bit);
                return Some((w * WORD_BITS + bit) as u32);
            }
        }
        None
    }

    fn release_all(&mut self) -> Result<(), ArenaError> {
        let bitmap = self.free.release(&self.memory);
        let generations = self.generations.release(&self.memory);
        self.element_num = 0;
        self.free_count = 0;
        bitmap?;
        generations?;
        Ok(())
    }
}

impl<M: VirtualMemory> Drop for SlotTracker<M> {
    fn drop(&mut self) {
        if let Err(err) = self.release_all() {
            warn!("slot tracker leaked mappings on drop: {err}");
        }
    }
}

impl<M: VirtualMemory> fmt::Debug for SlotTracker<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotTracker")
            .field("len", &self.len())
            .field("element_num", &self.element_num)
            .field("max_elements", &self.max_elements)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(max: u32) -> SlotTracker {
        SlotTracker::with_config(ArenaConfig::new(max), OsMemory).unwrap()
    }

    #[test]
    fn fresh_slots_start_at_generation_zero() {
        let mut t = tracker(8);
        let a = t.insert().unwrap();
        let b = t.insert().unwrap();
        assert_eq!((a.index(), a.generation()), (0, 0));
        assert_eq!((b.index(), b.generation()), (1, 0));
        assert_eq!(t.len(), 2);
        assert_eq!(t.element_num(), 2);
    }

    #[test]
    fn removal_invalidates_and_reuse_bumps_generation() {
        let mut t = tracker(8);
        let a = t.insert().unwrap();
        t.insert().unwrap();
        assert!(t.remove(a));
        assert!(!t.contains(a));
        assert!(!t.remove(a));

        let again = t.insert().unwrap();
        assert_eq!(again.index(), a.index());
        assert!(again.generation() > a.generation());
        assert!(t.contains(again));
        assert!(!t.contains(a));
        assert_eq!(t.element_num(), 2);
    }

    #[test]
    fn out_of_range_handle_is_invalid() {
        let mut t = tracker(8);
        t.insert().unwrap();
        assert!(!t.contains(Handle::new(0, 1)));
        assert!(!t.contains(Handle::new(0, 7000)));
        assert!(!t.remove(Handle::new(0, 5)));
        assert!(t.handle_at(3).is_none());
    }

    #[test]
    fn capacity_is_a_hard_limit() {
        let mut t = tracker(3);
        for _ in 0..3 {
            t.insert().unwrap();
        }
        assert_eq!(
            t.insert().unwrap_err(),
            ArenaError::CapacityExceeded {
                requested: 4,
                capacity: 3
            }
        );
    }

    #[test]
    fn full_tracker_accepts_after_remove() {
        let mut t = tracker(2);
        let a = t.insert().unwrap();
        t.insert().unwrap();
        assert!(t.insert().is_err());
        t.remove(a);
        assert_eq!(t.insert().unwrap().index(), 0);
    }

    #[test]
    fn zero_max_elements_is_rejected() {
        let err = SlotTracker::with_config(ArenaConfig::new(0), OsMemory).unwrap_err();
        assert!(matches!(err, ArenaError::InvalidConfig { .. }));
    }

    #[test]
    fn utilization_tracks_live_fraction() {
        let mut t = tracker(16);
        assert_eq!(t.utilization(), 0.0);
        let handles: Vec<_> = (0..4).map(|_| t.insert().unwrap()).collect();
        assert_eq!(t.utilization(), 1.0);
        t.remove(handles[1]);
        assert_eq!(t.utilization(), 0.75);
    }

    #[test]
    fn lowest_free_slot_crosses_word_boundaries() {
        let mut t = tracker(256);
        let handles: Vec<_> = (0..200).map(|_| t.insert().unwrap()).collect();
        t.remove(handles[150]);
        t.remove(handles[70]);
        t.remove(handles[130]);
        assert_eq!(t.insert().unwrap().index(), 70);
        assert_eq!(t.insert().unwrap().index(), 130);
        assert_eq!(t.insert().unwrap().index(), 150);
        assert_eq!(t.insert().unwrap().index(), 200);
    }

    #[test]
    fn iteration_yields_inserted_indices_in_order() {
        let mut t = tracker(300);
        for _ in 0..130 {
            t.insert().unwrap();
        }
        let seen: Vec<u32> = t.iter().collect();
        assert_eq!(seen, (0..130).collect::<Vec<_>>());
    }

    #[test]
    fn remove_evens_then_refill_scenario() {
        let mut t = tracker(1024);
        let handles: Vec<_> = (0..256).map(|_| t.insert().unwrap()).collect();
        for h in handles.iter().step_by(2) {
            assert!(t.remove(*h));
        }
        let refilled: Vec<u32> = (0..64).map(|_| t.insert().unwrap().index()).collect();
        assert_eq!(refilled, (0..64).map(|i| i * 2).collect::<Vec<_>>());
        assert_eq!(t.iter().count(), 192);
        assert_eq!(t.len(), 192);
        assert_eq!(t.element_num(), 256);
    }

    #[test]
    fn dispose_surfaces_no_error_on_os_memory() {
        let mut t = tracker(64);
        t.insert().unwrap();
        assert!(t.dispose().is_ok());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Clone, Debug)]
        enum Op {
            Insert,
            Remove(usize),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![Just(Op::Insert), any::<usize>().prop_map(Op::Remove)]
        }

        proptest! {
            #[test]
            fn handles_are_valid_until_removed_and_never_after(
                ops in proptest::collection::vec(op(), 1..300),
            ) {
                let mut t = tracker(128);
                let mut live: Vec<Handle> = Vec::new();
                let mut dead: Vec<Handle> = Vec::new();
                for op in ops {
                    match op {
                        Op::Insert => match t.insert() {
                            Ok(h) => {
                                prop_assert!(t.contains(h));
                                live.push(h);
                            }
                            Err(_) => prop_assert_eq!(t.len(), 128),
                        },
                        Op::Remove(pick) if !live.is_empty() => {
                            let h = live.swap_remove(pick % live.len());
                            prop_assert!(t.remove(h));
                            dead.push(h);
                        }
                        Op::Remove(_) => {}
                    }
                    for h in &live {
                        prop_assert!(t.contains(*h));
                    }
                    for h in &dead {
                        prop_assert!(!t.contains(*h));
                    }
                    prop_assert_eq!(t.len(), live.len());
                }
            }
        }
    }
}
