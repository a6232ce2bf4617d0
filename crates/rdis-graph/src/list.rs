//! Doubly-linked ordered sequence.
//!
//! Links live in a slot arena rather than in boxed nodes, so a [`Cursor`] is a
//! plain copyable handle. Removing at a cursor is O(1) and hands back the
//! cursor of the following element, which is what makes delete-while-walking
//! safe.

use std::fmt;

use crate::Merge;

/// Position of one element in a [`List`].
///
/// A cursor goes stale once its element is removed; stale cursors are
/// rejected rather than aliasing whatever later reuses the slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cursor {
    slot: usize,
    generation: u32,
}

#[derive(Clone)]
struct Slot<T> {
    value: Option<T>,
    generation: u32,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Ordered sequence with O(1) append and O(1) removal at a cursor.
#[derive(Clone)]
pub struct List<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    first: Option<usize>,
    last: Option<usize>,
    len: usize,
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> List<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            first: None,
            last: None,
            len: 0,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append `value` at the end and return its cursor.
    pub fn append(&mut self, value: T) -> Cursor {
        let slot = Slot {
            value: Some(value),
            generation: 0,
            prev: self.last,
            next: None,
        };
        let index = if let Some(index) = self.free.pop() {
            let generation = self.slots[index].generation;
            self.slots[index] = Slot { generation, ..slot };
            index
        } else {
            self.slots.push(slot);
            self.slots.len() - 1
        };

        match self.last {
            Some(last) => self.slots[last].next = Some(index),
            None => self.first = Some(index),
        }
        self.last = Some(index);
        self.len += 1;

        Cursor {
            slot: index,
            generation: self.slots[index].generation,
        }
    }

    /// First element, if any.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.first.and_then(|slot| self.slots[slot].value.as_ref())
    }

    #[must_use]
    pub fn first_cursor(&self) -> Option<Cursor> {
        self.first.map(|slot| self.cursor_at(slot))
    }

    /// Cursor of the element after `at`, or `None` at the end or for a stale cursor.
    #[must_use]
    pub fn next(&self, at: Cursor) -> Option<Cursor> {
        let slot = self.live(at)?;
        self.slots[slot].next.map(|next| self.cursor_at(next))
    }

    #[must_use]
    pub fn get(&self, at: Cursor) -> Option<&T> {
        let slot = self.live(at)?;
        self.slots[slot].value.as_ref()
    }

    pub fn get_mut(&mut self, at: Cursor) -> Option<&mut T> {
        let slot = self.live(at)?;
        self.slots[slot].value.as_mut()
    }

    /// Remove the element at `at` and return the cursor of the element after it.
    ///
    /// Returns `None` both at the end of the list and for a stale cursor.
    pub fn remove(&mut self, at: Cursor) -> Option<Cursor> {
        self.take(at).and_then(|(_, next)| next)
    }

    /// Remove the element at `at`, returning it along with the cursor after it.
    pub fn take(&mut self, at: Cursor) -> Option<(T, Option<Cursor>)> {
        let slot = self.live(at)?;
        let (prev, next) = (self.slots[slot].prev, self.slots[slot].next);

        match prev {
            Some(prev) => self.slots[prev].next = next,
            None => self.first = next,
        }
        match next {
            Some(next) => self.slots[next].prev = prev,
            None => self.last = prev,
        }

        let entry = &mut self.slots[slot];
        let value = entry.value.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        entry.prev = None;
        entry.next = None;
        self.free.push(slot);
        self.len -= 1;

        Some((value, next.map(|next| self.cursor_at(next))))
    }

    /// Remove the first element matching `pred`, returning it.
    pub fn remove_first(&mut self, mut pred: impl FnMut(&T) -> bool) -> Option<T> {
        let mut at = self.first_cursor();
        while let Some(cursor) = at {
            if self.get(cursor).is_some_and(&mut pred) {
                return self.take(cursor).map(|(value, _)| value);
            }
            at = self.next(cursor);
        }
        None
    }

    /// Keep only the elements for which `keep` returns true, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        let mut at = self.first_cursor();
        while let Some(cursor) = at {
            at = if self.get(cursor).is_some_and(&mut keep) {
                self.next(cursor)
            } else {
                self.remove(cursor)
            };
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    #[must_use]
    pub const fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            at: self.first,
            remaining: self.len,
        }
    }

    fn cursor_at(&self, slot: usize) -> Cursor {
        Cursor {
            slot,
            generation: self.slots[slot].generation,
        }
    }

    fn live(&self, at: Cursor) -> Option<usize> {
        let slot = self.slots.get(at.slot)?;
        (slot.generation == at.generation && slot.value.is_some()).then_some(at.slot)
    }
}

impl<T: Clone> List<T> {
    /// Append a copy of every element of `other`, in order.
    pub fn append_list(&mut self, other: &Self) {
        for value in other {
            self.append(value.clone());
        }
    }
}

impl<T: PartialEq> List<T> {
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.iter().any(|item| item == value)
    }
}

impl<T: Clone> Merge for List<T> {
    fn merge(&mut self, other: &Self) {
        self.append_list(other);
    }
}

impl<T: PartialEq> PartialEq for List<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for List<T> {}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T> Extend<T> for List<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.append(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Front-to-back iterator over a [`List`].
pub struct Iter<'a, T> {
    list: &'a List<T>,
    at: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = &self.list.slots[self.at?];
        self.at = slot.next;
        self.remaining = self.remaining.saturating_sub(1);
        slot.value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let list: List<u32> = [3, 1, 2].into_iter().collect();
        assert_eq!(list.len(), 3);
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![3, 1, 2]);
        assert_eq!(list.first(), Some(&3));
    }

    #[test]
    fn test_remove_returns_next_cursor() {
        let mut list: List<u32> = (0..5).collect();
        let mut at = list.first_cursor();
        while let Some(cursor) = at {
            at = if list.get(cursor).is_some_and(|v| v % 2 == 0) {
                list.remove(cursor)
            } else {
                list.next(cursor)
            };
        }
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_remove_last_returns_none() {
        let mut list = List::new();
        list.append(1);
        let tail = list.append(2);
        assert_eq!(list.remove(tail), None);
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_stale_cursor_rejected() {
        let mut list = List::new();
        let a = list.append("a");
        list.remove(a);
        let b = list.append("b");
        assert_eq!(list.get(a), None);
        assert_eq!(list.get(b), Some(&"b"));
        assert_eq!(list.remove(a), None);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut list: List<String> = std::iter::once("x".to_string()).collect();
        let copy = list.clone();
        if let Some(cursor) = list.first_cursor() {
            list.get_mut(cursor).unwrap().push('y');
        }
        assert_eq!(copy.first().map(String::as_str), Some("x"));
        assert_eq!(list.first().map(String::as_str), Some("xy"));
    }

    #[test]
    fn test_merge_appends_copy() {
        let mut lhs: List<u8> = [1, 2].into_iter().collect();
        let rhs: List<u8> = std::iter::once(3).collect();
        lhs.merge(&rhs);
        assert_eq!(lhs.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(rhs.len(), 1);
    }

    #[test]
    fn test_retain_and_remove_first() {
        let mut list: List<u32> = (1..=6).collect();
        list.retain(|v| *v != 3);
        assert_eq!(list.remove_first(|v| *v > 4), Some(5));
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 2, 4, 6]);
        assert!(!list.contains(&3));
    }
}
