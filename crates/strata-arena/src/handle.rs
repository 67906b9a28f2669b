//! Generational slot handles.
//!
//! A [`Handle`] names a slot by index and remembers the slot's generation at
//! the time it was handed out. Freeing a slot bumps its generation, so every
//! handle issued before the free stops validating, even after the index is
//! reused.

use std::fmt;

/// Stable, validity-checked reference to a slot in a
/// [`SlotTracker`](crate::SlotTracker) or [`Arena`](crate::Arena).
///
/// Generations are `u32` and wrap. A stale handle can alias a live one only
/// after the same slot has been freed 2^32 times while the stale handle is
/// still held.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[must_use]
pub struct Handle {
    generation: u32,
    index: u32,
}

impl Handle {
    pub(crate) fn new(generation: u32, index: u32) -> Self {
        Self { generation, index }
    }

    /// Generation of the slot when this handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Slot index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Pack into a single `u64` (generation in the high half).
    pub fn to_bits(self) -> u64 {
        (u64::from(self.generation) << 32) | u64::from(self.index)
    }

    /// Inverse of [`to_bits`](Self::to_bits).
    ///
    /// Any value decodes; whether the handle is valid is up to the arena.
    pub fn from_bits(bits: u64) -> Self {
        Self {
            generation: (bits >> 32) as u32,
            index: bits as u32,
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle(gen={}, idx={})", self.generation, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_put_generation_high() {
        let h = Handle::new(3, 7);
        assert_eq!(h.to_bits(), (3u64 << 32) | 7);
        assert_eq!(Handle::from_bits(h.to_bits()), h);
    }

    #[test]
    fn handles_differing_only_in_generation_are_distinct() {
        assert_ne!(Handle::new(0, 4), Handle::new(1, 4));
    }

    #[test]
    fn display_names_both_parts() {
        assert_eq!(Handle::new(2, 9).to_string(), "Handle(gen=2, idx=9)");
    }
}
