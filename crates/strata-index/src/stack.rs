//! Growable LIFO stack with explicit doubling growth.

use std::fmt;

/// Capacity reserved on the first push into an empty stack.
pub const MIN_GROWTH: usize = 16;

/// A stack that grows by doubling, starting at [`MIN_GROWTH`] slots.
///
/// Push is amortised O(1). The stack never shrinks on its own; `clear`
/// keeps the allocation.
#[derive(Clone, PartialEq, Eq)]
pub struct Stack<T> {
    items: Vec<T>,
}

impl<T> Stack<T> {
    /// An empty stack. Allocates nothing until the first push.
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// An empty stack with room for at least `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Push `value` on top.
    pub fn push(&mut self, value: T) {
        if self.items.len() == self.items.capacity() {
            let target = (self.items.capacity() * 2).max(MIN_GROWTH);
            self.items.reserve_exact(target - self.items.len());
        }
        self.items.push(value);
    }

    /// Pop the top item.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// The top item.
    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    /// The top item, mutably.
    pub fn peek_mut(&mut self) -> Option<&mut T> {
        self.items.last_mut()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items the stack can hold before it reallocates.
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Drop every item, keeping the allocation.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Items from bottom to top.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Iterate from bottom to top.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}

impl<T> Extend<T> for Stack<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> FromIterator<T> for Stack<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut stack = Self::new();
        stack.extend(iter);
        stack
    }
}

impl<'a, T> IntoIterator for &'a Stack<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
