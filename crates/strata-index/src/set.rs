//! Fixed-capacity open-addressing key index.
//!
//! Keys live in a power-of-two array of raw `u32` slots. Each slot is
//! `EMPTY` (never used), `TOMBSTONE` (key removed) or a live key. A key's
//! home slot is `key & mask`; collisions walk forward one slot at a time,
//! wrapping at the end.
//!
//! Removal writes `TOMBSTONE`, never `EMPTY`: a lookup stops at the first
//! `EMPTY` slot, so clearing a slot in the middle of a probe run would hide
//! every key stored past it.
//!
//! Every probe visits at most `capacity` slots, so a table with no `EMPTY`
//! slot left still terminates.

use std::iter::FusedIterator;

use log::debug;
use strata_core::HashKey;

use crate::error::IndexError;

const EMPTY: u32 = HashKey::EMPTY_RAW;
const TOMBSTONE: u32 = HashKey::TOMBSTONE_RAW;

/// Largest supported table, in slots.
pub const MAX_CAPACITY: u32 = 1 << 31;

/// Outcome of [`ProbingIndex::lookup`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Probe {
    /// The key lives in this slot.
    Found(u32),
    /// The key is absent. The slot is the `EMPTY` slot that ended the
    /// probe, or the key's home slot if every slot was visited.
    Missing(u32),
}

impl Probe {
    /// The slot, for [`Found`](Probe::Found) only.
    pub fn found(self) -> Option<u32> {
        match self {
            Self::Found(slot) => Some(slot),
            Self::Missing(_) => None,
        }
    }

    /// Whether the key was found.
    pub fn is_found(self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Where an insert should put a key.
enum Vacancy {
    Occupied(u32),
    Vacant { slot: u32, tombstone: bool },
    Full,
}

/// Open-addressing set of [`HashKey`]s with a fixed slot count.
///
/// Slot positions are stable while a key is present, so a parallel array
/// indexed by slot can hold per-key data; [`KeyMap`](crate::KeyMap) does
/// exactly that.
#[derive(Clone, Debug)]
pub struct ProbingIndex {
    slots: Box<[u32]>,
    mask: u32,
    len: u32,
    tombstones: u32,
}

impl ProbingIndex {
    /// Create an index with room for at least `min_capacity` keys.
    ///
    /// The capacity is rounded up to a power of two (and at least 1).
    pub fn with_capacity(min_capacity: u32) -> Result<Self, IndexError> {
        let capacity = min_capacity
            .max(1)
            .checked_next_power_of_two()
            .ok_or(IndexError::CapacityOverflow {
                requested: min_capacity,
            })?;
        Ok(Self {
            slots: vec![EMPTY; capacity as usize].into_boxed_slice(),
            mask: capacity - 1,
            len: 0,
            tombstones: 0,
        })
    }

    /// Find `key`'s slot.
    pub fn lookup(&self, key: HashKey) -> Probe {
        let key = key.get();
        let home = key & self.mask;
        for slot in self.probe(home) {
            match self.slots[slot as usize] {
                EMPTY => return Probe::Missing(slot),
                raw if raw == key => return Probe::Found(slot),
                _ => {}
            }
        }
        Probe::Missing(home)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: HashKey) -> bool {
        self.lookup(key).is_found()
    }

    /// Insert `key` and return its slot.
    ///
    /// A key that is already present keeps its slot. Otherwise the key
    /// takes the first `TOMBSTONE` on its probe path, or the `EMPTY` slot
    /// that ends it. Fails with [`IndexError::Full`] when every slot holds a
    /// live key.
    pub fn insert(&mut self, key: HashKey) -> Result<u32, IndexError> {
        match self.find_vacancy(key.get()) {
            Vacancy::Occupied(slot) => Ok(slot),
            Vacancy::Vacant { slot, tombstone } => {
                self.slots[slot as usize] = key.get();
                self.len += 1;
                if tombstone {
                    self.tombstones -= 1;
                }
                Ok(slot)
            }
            Vacancy::Full => {
                debug!("index insert of {key} rejected: {} slots full", self.capacity());
                Err(IndexError::Full {
                    capacity: self.capacity(),
                })
            }
        }
    }

    /// Remove `key`, returning the slot it occupied.
    pub fn remove(&mut self, key: HashKey) -> Option<u32> {
        let slot = self.lookup(key).found()?;
        self.slots[slot as usize] = TOMBSTONE;
        self.len -= 1;
        self.tombstones += 1;
        Some(slot)
    }

    /// Forget every key and tombstone.
    pub fn clear(&mut self) {
        self.slots.fill(EMPTY);
        self.len = 0;
        self.tombstones = 0;
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether no key is live.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots.
    pub fn capacity(&self) -> u32 {
        self.mask + 1
    }

    /// Number of slots holding a tombstone.
    pub fn tombstones(&self) -> usize {
        self.tombstones as usize
    }

    /// Live keys as a fraction of capacity.
    pub fn load_factor(&self) -> f64 {
        f64::from(self.len) / f64::from(self.capacity())
    }

    /// Live `(slot, key)` pairs in slot order.
    pub fn iter(&self) -> Keys<'_> {
        Keys {
            slots: self.slots.iter().enumerate(),
        }
    }

    /// Slots to visit from `home`: every slot once, wrapping.
    fn probe(&self, home: u32) -> impl Iterator<Item = u32> + '_ {
        (0..=self.mask).map(move |step| home.wrapping_add(step) & self.mask)
    }

    fn find_vacancy(&self, key: u32) -> Vacancy {
        let mut first_tombstone = None;
        for slot in self.probe(key & self.mask) {
            match self.slots[slot as usize] {
                EMPTY => {
                    return match first_tombstone {
                        Some(slot) => Vacancy::Vacant {
                            slot,
                            tombstone: true,
                        },
                        None => Vacancy::Vacant {
                            slot,
                            tombstone: false,
                        },
                    };
                }
                TOMBSTONE => {
                    first_tombstone.get_or_insert(slot);
                }
                raw if raw == key => return Vacancy::Occupied(slot),
                _ => {}
            }
        }
        match first_tombstone {
            Some(slot) => Vacancy::Vacant {
                slot,
                tombstone: true,
            },
            None => Vacancy::Full,
        }
    }
}

impl<'a> IntoIterator for &'a ProbingIndex {
    type Item = (u32, HashKey);
    type IntoIter = Keys<'a>;

    fn into_iter(self) -> Keys<'a> {
        self.iter()
    }
}

/// Iterator over live `(slot, key)` pairs, returned by
/// [`ProbingIndex::iter`].
#[derive(Clone, Debug)]
pub struct Keys<'a> {
    slots: std::iter::Enumerate<std::slice::Iter<'a, u32>>,
}

impl Iterator for Keys<'_> {
    type Item = (u32, HashKey);

    fn next(&mut self) -> Option<Self::Item> {
        self.slots
            .by_ref()
            .find_map(|(slot, &raw)| HashKey::new(raw).map(|key| (slot as u32, key)))
    }
}

impl FusedIterator for Keys<'_> {}
