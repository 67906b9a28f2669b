//! Fixed-capacity map from [`HashKey`] to values.

use std::fmt;

use strata_core::HashKey;

use crate::error::IndexError;
use crate::set::{Keys, ProbingIndex};

/// A [`ProbingIndex`] paired with a value array of the same capacity.
///
/// The value for a key lives at the key's slot. Removing a key moves the
/// value out, so slot `i` holds `Some` exactly while the index has a live
/// key in slot `i`.
///
/// # Examples
///
/// ```
/// use strata_core::HashKey;
/// use strata_index::KeyMap;
///
/// let mut map = KeyMap::with_capacity(64).unwrap();
/// let k = HashKey::hash_of(b"north");
/// assert_eq!(map.insert(k, 1).unwrap(), None);
/// assert_eq!(map.insert(k, 2).unwrap(), Some(1));
/// assert_eq!(map.get(k), Some(&2));
/// assert_eq!(map.remove(k), Some(2));
/// ```
#[derive(Clone)]
pub struct KeyMap<V> {
    index: ProbingIndex,
    values: Box<[Option<V>]>,
}

impl<V> KeyMap<V> {
    /// Create a map with room for at least `min_capacity` keys.
    pub fn with_capacity(min_capacity: u32) -> Result<Self, IndexError> {
        let index = ProbingIndex::with_capacity(min_capacity)?;
        let values = (0..index.capacity()).map(|_| None).collect();
        Ok(Self { index, values })
    }

    /// Store `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: HashKey, value: V) -> Result<Option<V>, IndexError> {
        let slot = self.index.insert(key)?;
        Ok(self.values[slot as usize].replace(value))
    }

    /// Borrow the value stored under `key`.
    pub fn get(&self, key: HashKey) -> Option<&V> {
        let slot = self.index.lookup(key).found()?;
        self.values[slot as usize].as_ref()
    }

    /// Mutably borrow the value stored under `key`.
    pub fn get_mut(&mut self, key: HashKey) -> Option<&mut V> {
        let slot = self.index.lookup(key).found()?;
        self.values[slot as usize].as_mut()
    }

    /// Remove `key` and return its value.
    pub fn remove(&mut self, key: HashKey) -> Option<V> {
        let slot = self.index.remove(key)?;
        self.values[slot as usize].take()
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: HashKey) -> bool {
        self.index.contains(key)
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of slots.
    pub fn capacity(&self) -> u32 {
        self.index.capacity()
    }

    /// The underlying key index.
    pub fn index(&self) -> &ProbingIndex {
        &self.index
    }

    /// `(key, value)` pairs in slot order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            keys: self.index.iter(),
            values: &self.values,
        }
    }

    /// Drop every value and forget every key.
    pub fn clear(&mut self) {
        self.index.clear();
        self.values.iter_mut().for_each(|v| *v = None);
    }
}

impl<V: fmt::Debug> fmt::Debug for KeyMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, V> IntoIterator for &'a KeyMap<V> {
    type Item = (HashKey, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

/// Iterator returned by [`KeyMap::iter`].
pub struct Iter<'a, V> {
    keys: Keys<'a>,
    values: &'a [Option<V>],
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (HashKey, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let values = self.values;
        self.keys
            .by_ref()
            .find_map(|(slot, key)| values[slot as usize].as_ref().map(|v| (key, v)))
    }
}
