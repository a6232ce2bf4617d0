//! Ownership protocol for container elements.
//!
//! Destroy is `Drop`, Duplicate is `Clone` and Compare is `Ord`. The only
//! capability without a standard trait is [`Merge`], which the graph uses when
//! it coalesces two nodes into one.

/// A value that can absorb another value of the same kind.
pub trait Merge {
    /// Absorb `other` into `self`.
    ///
    /// `other` is left untouched; whatever remains of it is the caller's to drop.
    fn merge(&mut self, other: &Self);
}

impl Merge for () {
    fn merge(&mut self, _other: &Self) {}
}

impl<T: Clone> Merge for Vec<T> {
    fn merge(&mut self, other: &Self) {
        self.extend_from_slice(other);
    }
}
