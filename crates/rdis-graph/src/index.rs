//! Bare 64-bit key for ordered containers.

use std::borrow::Borrow;
use std::fmt;

/// A 64-bit address or node index stored as a container element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Index(pub u64);

impl Index {
    #[must_use]
    pub const fn new(index: u64) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for Index {
    fn from(index: u64) -> Self {
        Self(index)
    }
}

impl From<Index> for u64 {
    fn from(index: Index) -> Self {
        index.0
    }
}

impl Borrow<u64> for Index {
    fn borrow(&self) -> &u64 {
        &self.0
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Set;

    #[test]
    fn test_index_orders_like_u64() {
        assert!(Index(1) < Index(2));
        assert_eq!(Index::from(7).get(), 7);
        assert_eq!(Index(0x1000).to_string(), "0x1000");
    }

    #[test]
    fn test_index_fetch_by_raw_address() {
        let set: Set<Index> = [Index(3), Index(1), Index(2)].into_iter().collect();
        assert_eq!(set.fetch(&2u64), Some(&Index(2)));
        assert_eq!(set.fetch(&9u64), None);
    }
}
