//! Generational arena: a [`SlotTracker`] plus typed payload storage.

use std::fmt;
use std::iter::Enumerate;
use std::ops::{Index, IndexMut};
use std::slice;

use strata_core::VirtualMemory;

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::handle::Handle;
use crate::iter::{Occupied, SlotCursor};
use crate::raw::OsMemory;
use crate::tracker::SlotTracker;

/// Pool of `T` values addressed by generational [`Handle`]s.
///
/// Values live in a `Vec<Option<T>>` parallel to the tracker's slot space.
/// A slot's value is present exactly while the slot is live.
///
/// # Examples
///
/// ```
/// use strata_arena::Arena;
///
/// let mut arena = Arena::new().unwrap();
/// let a = arena.insert("a").unwrap();
/// assert_eq!(arena.get(a), Some(&"a"));
/// assert_eq!(arena.remove(a), Some("a"));
/// assert_eq!(arena.get(a), None);
/// ```
pub struct Arena<T, M: VirtualMemory = OsMemory> {
    tracker: SlotTracker<M>,
    values: Vec<Option<T>>,
}

impl<T> Arena<T, OsMemory> {
    /// Create an arena over OS memory with the default slot limit.
    pub fn new() -> Result<Self, ArenaError> {
        Self::with_config(ArenaConfig::default(), OsMemory)
    }
}

impl<T, M: VirtualMemory> Arena<T, M> {
    /// Create an arena with an explicit config and memory source.
    pub fn with_config(config: ArenaConfig, memory: M) -> Result<Self, ArenaError> {
        Ok(Self {
            tracker: SlotTracker::with_config(config, memory)?,
            values: Vec::new(),
        })
    }

    /// Store `value` in the lowest free slot.
    ///
    /// On [`ArenaError::CapacityExceeded`] the value is dropped.
    pub fn insert(&mut self, value: T) -> Result<Handle, ArenaError> {
        let handle = self.tracker.insert()?;
        let index = handle.index() as usize;
        if index == self.values.len() {
            self.values.push(Some(value));
        } else {
            self.values[index] = Some(value);
        }
        Ok(handle)
    }

    /// Take the value out of the slot `handle` names.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        if !self.tracker.remove(handle) {
            return None;
        }
        self.values[handle.index() as usize].take()
    }

    /// Whether `handle` names a live value.
    pub fn contains(&self, handle: Handle) -> bool {
        self.tracker.contains(handle)
    }

    /// Borrow the value `handle` names, if it is still live.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        if !self.tracker.contains(handle) {
            return None;
        }
        self.values[handle.index() as usize].as_ref()
    }

    /// Mutably borrow the value `handle` names, if it is still live.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        if !self.tracker.contains(handle) {
            return None;
        }
        self.values[handle.index() as usize].as_mut()
    }

    /// Handle for the live value at `index`.
    pub fn handle_at(&self, index: u32) -> Option<Handle> {
        self.tracker.handle_at(index)
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    /// Whether the arena holds no live values.
    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }

    /// Fraction of ever-used slots that are live.
    pub fn utilization(&self) -> f64 {
        self.tracker.utilization()
    }

    /// The slot bookkeeping behind this arena.
    pub fn tracker(&self) -> &SlotTracker<M> {
        &self.tracker
    }

    /// A detached cursor for walking while removing.
    ///
    /// ```
    /// use strata_arena::Arena;
    ///
    /// let mut arena = Arena::new().unwrap();
    /// for n in 0..10 {
    ///     arena.insert(n).unwrap();
    /// }
    /// let mut cursor = arena.cursor();
    /// while let Some(index) = cursor.advance(arena.tracker()) {
    ///     let handle = arena.handle_at(index).unwrap();
    ///     if arena[handle] % 2 == 1 {
    ///         arena.remove(handle);
    ///     }
    /// }
    /// assert_eq!(arena.len(), 5);
    /// ```
    pub fn cursor(&self) -> SlotCursor {
        SlotCursor::new()
    }

    /// Live `(handle, value)` pairs in ascending slot order.
    pub fn iter(&self) -> Iter<'_, T, M> {
        Iter {
            slots: self.tracker.iter(),
            tracker: &self.tracker,
            values: &self.values,
        }
    }

    /// Live `(handle, value)` pairs with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, T, M> {
        IterMut {
            tracker: &self.tracker,
            values: self.values.iter_mut().enumerate(),
        }
    }

    /// Drop every value and release the tracker's mappings.
    pub fn dispose(self) -> Result<(), ArenaError> {
        let Self { tracker, values } = self;
        drop(values);
        tracker.dispose()
    }
}

impl<T, M: VirtualMemory> Index<Handle> for Arena<T, M> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `handle` is stale or out of range.
    fn index(&self, handle: Handle) -> &T {
        match self.get(handle) {
            Some(value) => value,
            None => panic!("invalid arena handle: {handle}"),
        }
    }
}

impl<T, M: VirtualMemory> IndexMut<Handle> for Arena<T, M> {
    fn index_mut(&mut self, handle: Handle) -> &mut T {
        match self.get_mut(handle) {
            Some(value) => value,
            None => panic!("invalid arena handle: {handle}"),
        }
    }
}

impl<T: fmt::Debug, M: VirtualMemory> fmt::Debug for Arena<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, T, M: VirtualMemory> IntoIterator for &'a Arena<T, M> {
    type Item = (Handle, &'a T);
    type IntoIter = Iter<'a, T, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`Arena::iter`].
pub struct Iter<'a, T, M: VirtualMemory = OsMemory> {
    slots: Occupied<'a>,
    tracker: &'a SlotTracker<M>,
    values: &'a [Option<T>],
}

impl<'a, T, M: VirtualMemory> Iterator for Iter<'a, T, M> {
    type Item = (Handle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        for index in self.slots.by_ref() {
            let handle = self.tracker.handle_at(index)?;
            if let Some(value) = self.values[index as usize].as_ref() {
                return Some((handle, value));
            }
        }
        None
    }
}

/// Iterator returned by [`Arena::iter_mut`].
pub struct IterMut<'a, T, M: VirtualMemory = OsMemory> {
    tracker: &'a SlotTracker<M>,
    values: Enumerate<slice::IterMut<'a, Option<T>>>,
}

impl<'a, T, M: VirtualMemory> Iterator for IterMut<'a, T, M> {
    type Item = (Handle, &'a mut T);

    fn next(&mut self) -> Option<Self::Item> {
        for (index, value) in self.values.by_ref() {
            let Some(value) = value.as_mut() else {
                continue;
            };
            if let Some(handle) = self.tracker.handle_at(index as u32) {
                return Some((handle, value));
            }
        }
        None
    }
}
