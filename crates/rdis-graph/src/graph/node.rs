use crate::List;

use super::EdgeId;

/// A graph node: its index, its payload, and every edge touching it.
///
/// Edges where this node is the head and edges where it is the tail share
/// the one adjacency list. A self-loop appears in it once.
#[derive(Clone, Debug)]
pub struct Node<N> {
    pub(crate) index: u64,
    pub(crate) data: N,
    pub(crate) edges: List<EdgeId>,
}

impl<N> Node<N> {
    #[must_use]
    pub(crate) const fn new(index: u64, data: N) -> Self {
        Self {
            index,
            data,
            edges: List::new(),
        }
    }

    #[must_use]
    pub const fn index(&self) -> u64 {
        self.index
    }

    #[must_use]
    pub const fn data(&self) -> &N {
        &self.data
    }

    pub const fn data_mut(&mut self) -> &mut N {
        &mut self.data
    }

    /// Ids of the edges touching this node, in insertion order.
    #[must_use]
    pub const fn edges(&self) -> &List<EdgeId> {
        &self.edges
    }

    pub(crate) fn unlink(&mut self, id: EdgeId) {
        self.edges.remove_first(|edge| *edge == id);
    }
}
