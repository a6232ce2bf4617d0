//! FIFO work queue.
//!
//! The worklists in this workspace peek at the front item, decide what to do
//! with it, and only then pop it.

use std::collections::VecDeque;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Queue<T> {
    items: VecDeque<T>,
}

impl<T> Queue<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Front item without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Take every queued item, leaving the queue empty.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.items.drain(..)
    }
}

impl<T> FromIterator<T> for Queue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> Extend<T> for Queue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue: Queue<u64> = [1, 2].into_iter().collect();
        queue.push(3);
        assert_eq!(queue.peek(), Some(&1));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut queue = Queue::new();
        queue.push("a");
        assert_eq!(queue.peek(), Some(&"a"));
        assert_eq!(queue.peek(), Some(&"a"));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut queue: Queue<u8> = (0..4).collect();
        let drained: Vec<u8> = queue.drain().collect();
        assert_eq!(drained, vec![0, 1, 2, 3]);
        assert!(queue.is_empty());
    }
}
