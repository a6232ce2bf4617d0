//! Ordered set backed by an AA tree.
//!
//! Balance is carried by per-node levels (a rank-balanced tree), so insert,
//! remove and fetch stay O(log n) however the keys arrive. Ascending address
//! sequences, which is what a disassembler mostly produces, do not degrade it.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

type Link<T> = Option<Box<Node<T>>>;

#[derive(Clone)]
struct Node<T> {
    level: u32,
    value: T,
    left: Link<T>,
    right: Link<T>,
}

impl<T> Node<T> {
    const fn leaf(value: T) -> Self {
        Self {
            level: 1,
            value,
            left: None,
            right: None,
        }
    }
}

/// Balanced binary search tree ordered by `T: Ord`.
#[derive(Clone)]
pub struct Tree<T> {
    root: Link<T>,
    len: usize,
}

/// An ordered set is just a tree.
pub type Set<T> = Tree<T>;

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { root: None, len: 0 }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// In-order (ascending) iterator.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            stack: Vec::new(),
            remaining: self.len,
        };
        iter.descend(self.root.as_deref());
        iter
    }

    /// Call `f` on every element in ascending order.
    pub fn map(&self, mut f: impl FnMut(&T)) {
        for value in self {
            f(value);
        }
    }

    /// Smallest element.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(&node.value)
    }

    /// Largest element.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some(&node.value)
    }

    /// Lookup driven by a comparison of the needle against each element.
    ///
    /// `order(element)` answers how the needle orders relative to `element`.
    #[must_use]
    pub(crate) fn fetch_by(&self, order: impl Fn(&T) -> Ordering) -> Option<&T> {
        let mut link = &self.root;
        while let Some(node) = link {
            match order(&node.value) {
                Ordering::Less => link = &node.left,
                Ordering::Greater => link = &node.right,
                Ordering::Equal => return Some(&node.value),
            }
        }
        None
    }

    /// Mutable lookup. The caller must not change how the element orders.
    pub(crate) fn fetch_mut_by(&mut self, order: impl Fn(&T) -> Ordering) -> Option<&mut T> {
        fetch_mut_at(&mut self.root, &order)
    }

    /// Greatest element that orders at or below the needle.
    #[must_use]
    pub(crate) fn fetch_max_by(&self, order: impl Fn(&T) -> Ordering) -> Option<&T> {
        let mut best = None;
        let mut link = &self.root;
        while let Some(node) = link {
            match order(&node.value) {
                Ordering::Less => link = &node.left,
                Ordering::Equal => return Some(&node.value),
                Ordering::Greater => {
                    best = Some(&node.value);
                    link = &node.right;
                }
            }
        }
        best
    }

    pub(crate) fn remove_by(&mut self, order: impl Fn(&T) -> Ordering) -> Option<T> {
        let removed = remove_at(&mut self.root, &order);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Visit every element mutably in ascending order. The caller must not
    /// change how any element orders.
    pub(crate) fn walk_mut(&mut self, mut f: impl FnMut(&mut T)) {
        fn walk<T>(link: &mut Link<T>, f: &mut impl FnMut(&mut T)) {
            if let Some(node) = link {
                walk(&mut node.left, f);
                f(&mut node.value);
                walk(&mut node.right, f);
            }
        }
        walk(&mut self.root, &mut f);
    }

    /// Insert, replacing and returning an equal element if one exists.
    pub(crate) fn replace_by(&mut self, value: T, cmp: impl Fn(&T, &T) -> Ordering) -> Option<T> {
        let displaced = insert_at(&mut self.root, value, &cmp);
        if displaced.is_none() {
            self.len += 1;
        }
        displaced
    }
}

impl<T: Ord> Tree<T> {
    /// Insert `value`. Returns false, leaving the tree unchanged, if an equal
    /// element is already present.
    pub fn insert(&mut self, value: T) -> bool {
        if self.fetch_by(|element| value.cmp(element)).is_some() {
            return false;
        }
        self.replace(value);
        true
    }

    /// Insert `value`, returning the equal element it displaced.
    pub fn replace(&mut self, value: T) -> Option<T> {
        self.replace_by(value, T::cmp)
    }

    /// Exact-match lookup.
    #[must_use]
    pub fn fetch<Q>(&self, key: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.fetch_by(|element| key.cmp(element.borrow()))
    }

    /// Greatest element less than or equal to `key` (floor lookup).
    #[must_use]
    pub fn fetch_max<Q>(&self, key: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.fetch_max_by(|element| key.cmp(element.borrow()))
    }

    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.fetch(key).is_some()
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_by(|element| key.cmp(element.borrow()))
    }
}

fn level<T>(node: Option<&Node<T>>) -> u32 {
    node.map_or(0, |node| node.level)
}

/// Rotate right when the left child sits on the same level.
fn skew<T>(link: &mut Link<T>) {
    let Some(mut node) = link.take() else {
        return;
    };
    *link = match node.left.take() {
        Some(mut left) if left.level == node.level => {
            node.left = left.right.take();
            left.right = Some(node);
            Some(left)
        }
        left => {
            node.left = left;
            Some(node)
        }
    };
}

/// Rotate left and promote when two right links sit on the same level.
fn split<T>(link: &mut Link<T>) {
    let Some(mut node) = link.take() else {
        return;
    };
    let level = node.level;
    *link = match node.right.take() {
        Some(mut right) if right.right.as_ref().is_some_and(|rr| rr.level == level) => {
            node.right = right.left.take();
            right.left = Some(node);
            right.level += 1;
            Some(right)
        }
        right => {
            node.right = right;
            Some(node)
        }
    };
}

fn fetch_mut_at<'a, T>(link: &'a mut Link<T>, order: &impl Fn(&T) -> Ordering) -> Option<&'a mut T> {
    let node = link.as_deref_mut()?;
    match order(&node.value) {
        Ordering::Less => fetch_mut_at(&mut node.left, order),
        Ordering::Greater => fetch_mut_at(&mut node.right, order),
        Ordering::Equal => Some(&mut node.value),
    }
}

fn insert_at<T>(link: &mut Link<T>, value: T, cmp: &impl Fn(&T, &T) -> Ordering) -> Option<T> {
    let Some(mut node) = link.take() else {
        *link = Some(Box::new(Node::leaf(value)));
        return None;
    };
    let displaced = match cmp(&value, &node.value) {
        Ordering::Less => insert_at(&mut node.left, value, cmp),
        Ordering::Greater => insert_at(&mut node.right, value, cmp),
        Ordering::Equal => Some(std::mem::replace(&mut node.value, value)),
    };
    *link = Some(node);
    skew(link);
    split(link);
    displaced
}

fn remove_at<T>(link: &mut Link<T>, order: &impl Fn(&T) -> Ordering) -> Option<T> {
    let node = link.as_mut()?;
    let removed = match order(&node.value) {
        Ordering::Less => remove_at(&mut node.left, order),
        Ordering::Greater => remove_at(&mut node.right, order),
        Ordering::Equal => {
            if node.left.is_none() && node.right.is_none() {
                return link.take().map(|node| node.value);
            }
            let replacement = if node.left.is_none() {
                remove_min(&mut node.right)
            } else {
                remove_max(&mut node.left)
            };
            replacement.map(|value| std::mem::replace(&mut node.value, value))
        }
    };
    if removed.is_some() {
        rebalance(link);
    }
    removed
}

fn remove_min<T>(link: &mut Link<T>) -> Option<T> {
    if link.as_ref()?.left.is_none() {
        let node = link.take()?;
        let Node { value, right, .. } = *node;
        *link = right;
        return Some(value);
    }
    let removed = link.as_mut().and_then(|node| remove_min(&mut node.left));
    rebalance(link);
    removed
}

fn remove_max<T>(link: &mut Link<T>) -> Option<T> {
    if link.as_ref()?.right.is_none() {
        let node = link.take()?;
        let Node { value, left, .. } = *node;
        *link = left;
        return Some(value);
    }
    let removed = link.as_mut().and_then(|node| remove_max(&mut node.right));
    rebalance(link);
    removed
}

/// Restore the level invariants on the way back up from a removal.
fn rebalance<T>(link: &mut Link<T>) {
    let Some(node) = link.as_mut() else {
        return;
    };

    let expected = level(node.left.as_deref()).min(level(node.right.as_deref())) + 1;
    if expected < node.level {
        node.level = expected;
        if let Some(right) = node.right.as_mut() {
            right.level = right.level.min(expected);
        }
    }

    skew(link);
    if let Some(node) = link.as_mut() {
        skew(&mut node.right);
        if let Some(right) = node.right.as_mut() {
            skew(&mut right.right);
        }
    }

    split(link);
    if let Some(node) = link.as_mut() {
        split(&mut node.right);
    }
}

/// Ascending iterator over a [`Tree`].
pub struct Iter<'a, T> {
    stack: Vec<&'a Node<T>>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    fn descend(&mut self, mut node: Option<&'a Node<T>>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = current.left.as_deref();
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.descend(node.right.as_deref());
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a Tree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Ord> FromIterator<T> for Tree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for Tree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: PartialEq> PartialEq for Tree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for Tree<T> {}

impl<T: fmt::Debug> fmt::Debug for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Check the AA invariants and return the subtree size.
    fn check<T: Ord>(node: Option<&Node<T>>) -> usize {
        let Some(node) = node else { return 0 };
        assert_eq!(level(node.left.as_deref()) + 1, node.level, "left child one level down");
        let right = level(node.right.as_deref());
        assert!(right == node.level || right + 1 == node.level);
        if let Some(r) = node.right.as_deref() {
            assert!(level(r.right.as_deref()) < node.level, "no double horizontal link");
        }
        if node.left.is_none() && node.right.is_none() {
            assert_eq!(node.level, 1, "leaves sit on level one");
        }
        1 + check(node.left.as_deref()) + check(node.right.as_deref())
    }

    #[test]
    fn test_insert_sorted_iteration() {
        let tree: Tree<u64> = [5, 3, 9, 1, 7].into_iter().collect();
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![1, 3, 5, 7, 9]);
        assert_eq!(check(tree.root.as_deref()), 5);
    }

    #[test]
    fn test_insert_rejects_duplicate() {
        let mut tree = Tree::new();
        assert!(tree.insert(4));
        assert!(!tree.insert(4));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_ascending_inserts_stay_balanced() {
        let tree: Tree<u64> = (0..1024).map(|i| i * 4).collect();
        assert_eq!(check(tree.root.as_deref()), 1024);
        // An AA tree of n nodes has level at most log2(n + 1).
        assert!(level(tree.root.as_deref()) <= 11);
    }

    #[test]
    fn test_fetch_absent_is_none() {
        let empty: Tree<u64> = Tree::new();
        assert_eq!(empty.fetch(&1), None);
        assert_eq!(empty.fetch_max(&1), None);

        let tree: Tree<u64> = [10, 20].into_iter().collect();
        assert_eq!(tree.fetch(&15), None);
        assert_eq!(tree.fetch(&20), Some(&20));
    }

    #[test]
    fn test_fetch_max_is_floor() {
        let tree: Tree<u64> = [0x1000, 0x2000, 0x3000].into_iter().collect();
        assert_eq!(tree.fetch_max(&0x0fff), None);
        assert_eq!(tree.fetch_max(&0x1000), Some(&0x1000));
        assert_eq!(tree.fetch_max(&0x2fff), Some(&0x2000));
        assert_eq!(tree.fetch_max(&u64::MAX), Some(&0x3000));
    }

    #[test]
    fn test_remove_keeps_invariants() {
        let mut tree: Tree<u64> = (0..200).collect();
        for i in (0..200).step_by(3) {
            assert_eq!(tree.remove(&i), Some(i));
            check(tree.root.as_deref());
        }
        assert_eq!(tree.remove(&0), None);
        assert_eq!(check(tree.root.as_deref()), tree.len());
        assert!(tree.iter().all(|v| v % 3 != 0));
        assert_eq!(tree.first(), Some(&1));
        assert_eq!(tree.last(), Some(&199));
    }

    #[test]
    fn test_remove_everything() {
        let mut tree: Tree<u64> = (0..64).rev().collect();
        for i in 0..64 {
            tree.remove(&i);
        }
        assert!(tree.is_empty());
        assert!(tree.root.is_none());
    }

    #[test]
    fn test_interleaved_updates_keep_invariants() {
        let mut tree = Tree::new();
        for i in 0..300u64 {
            tree.insert((i * 37) % 256);
            if i % 4 == 3 {
                tree.remove(&((i * 11) % 256));
            }
            assert_eq!(check(tree.root.as_deref()), tree.len());
        }
        let values: Vec<u64> = tree.iter().copied().collect();
        assert!(values.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(tree.iter().len(), tree.len());
    }

    #[test]
    fn test_map_visits_in_order() {
        let tree: Tree<i32> = [3, -1, 2].into_iter().collect();
        let mut seen = Vec::new();
        tree.map(|v| seen.push(*v));
        assert_eq!(seen, vec![-1, 2, 3]);
    }
}
