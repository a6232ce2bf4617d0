//! Directed multigraph keyed by 64-bit node indices.
//!
//! Nodes live in an ordered [`Map`], edges in an arena owned by the graph.
//! Nodes and edges are only created through graph operations, so the unique
//! key, symmetric adjacency and auto-index invariants hold at every mutation
//! boundary.

mod algo;
mod edge;
mod node;


use std::fmt;

use tracing::trace;

use crate::{GraphError, Map, Result};

pub use edge::{Edge, EdgeId};
pub use node::Node;

use edge::EdgeArena;

/// Directed graph with payload `N` on nodes and `E` on edges.
///
/// At most one edge exists per ordered `(head, tail)` pair.
#[derive(Clone)]
pub struct Graph<N, E = ()> {
    nodes: Map<u64, Node<N>>,
    edges: EdgeArena<E>,
    next_index: u64,
}

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> Graph<N, E> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Map::new(),
            edges: EdgeArena::new(),
            next_index: 1,
        }
    }

    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index the next [`add_node_autoindex`](Self::add_node_autoindex) tries first.
    #[must_use]
    pub const fn next_index(&self) -> u64 {
        self.next_index
    }

    /// Add a node under `index`.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateNode`], leaving the graph unchanged, if `index`
    /// is already taken.
    pub fn add_node(&mut self, index: u64, data: N) -> Result<()> {
        if self.contains(index) {
            return Err(GraphError::DuplicateNode(index));
        }
        self.insert_node(index, data);
        Ok(())
    }

    /// Add a node under the next free index and return that index.
    pub fn add_node_autoindex(&mut self, data: N) -> u64 {
        while self.contains(self.next_index) {
            self.next_index = self.next_index.wrapping_add(1);
        }
        let index = self.next_index;
        self.insert_node(index, data);
        index
    }

    /// Remove a node together with every edge touching it, returning its payload.
    ///
    /// # Errors
    ///
    /// [`GraphError::MissingNode`] if there is no node under `index`.
    pub fn remove_node(&mut self, index: u64) -> Result<N> {
        let node = self
            .nodes
            .remove(&index)
            .ok_or(GraphError::MissingNode(index))?;

        for &id in node.edges() {
            let Some(edge) = self.edges.remove(id) else {
                continue;
            };
            let other = if edge.head == index { edge.tail } else { edge.head };
            if other != index
                && let Some(other) = self.nodes.fetch_mut(&other)
            {
                other.unlink(id);
            }
        }

        trace!(index = format_args!("{index:#x}"), "removed node");
        Ok(node.data)
    }

    #[must_use]
    pub fn contains(&self, index: u64) -> bool {
        self.nodes.contains_key(&index)
    }

    #[must_use]
    pub fn fetch_node(&self, index: u64) -> Option<&Node<N>> {
        self.nodes.fetch(&index)
    }

    pub fn fetch_node_mut(&mut self, index: u64) -> Option<&mut Node<N>> {
        self.nodes.fetch_mut(&index)
    }

    /// Node with the greatest index less than or equal to `index`.
    #[must_use]
    pub fn fetch_node_max(&self, index: u64) -> Option<&Node<N>> {
        self.nodes.fetch_max(&index).map(|(_, node)| node)
    }

    #[must_use]
    pub fn fetch_data(&self, index: u64) -> Option<&N> {
        self.fetch_node(index).map(Node::data)
    }

    pub fn fetch_data_mut(&mut self, index: u64) -> Option<&mut N> {
        self.fetch_node_mut(index).map(Node::data_mut)
    }

    /// Add the edge `head -> tail`.
    ///
    /// # Errors
    ///
    /// [`GraphError::MissingNode`] if either endpoint is absent and
    /// [`GraphError::DuplicateEdge`] if the ordered pair is already connected.
    /// On failure the graph is unchanged.
    pub fn add_edge(&mut self, head: u64, tail: u64, data: E) -> Result<EdgeId> {
        for index in [head, tail] {
            if !self.contains(index) {
                return Err(GraphError::MissingNode(index));
            }
        }
        if self.find_edge(head, tail).is_some() {
            return Err(GraphError::DuplicateEdge { head, tail });
        }

        let id = self.edges.insert(Edge::new(head, tail, data));
        self.link(head, id);
        if head != tail {
            self.link(tail, id);
        }
        Ok(id)
    }

    /// Remove the edge `head -> tail`, returning its payload.
    ///
    /// # Errors
    ///
    /// [`GraphError::MissingNode`] if either endpoint is absent and
    /// [`GraphError::MissingEdge`] if they are not connected.
    pub fn remove_edge(&mut self, head: u64, tail: u64) -> Result<E> {
        for index in [head, tail] {
            if !self.contains(index) {
                return Err(GraphError::MissingNode(index));
            }
        }
        let id = self
            .find_edge(head, tail)
            .ok_or(GraphError::MissingEdge { head, tail })?;
        self.detach(id)
            .map(Edge::into_data)
            .ok_or(GraphError::MissingEdge { head, tail })
    }

    /// The edge `head -> tail`, if present.
    #[must_use]
    pub fn fetch_edge(&self, head: u64, tail: u64) -> Option<&Edge<E>> {
        self.find_edge(head, tail).and_then(|id| self.edges.get(id))
    }

    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge<E>> {
        self.edges.get(id)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge<E>> {
        self.edges.get_mut(id)
    }

    /// Every edge touching `index`, in adjacency order. Empty for an absent node.
    pub fn edges_of(&self, index: u64) -> impl Iterator<Item = &Edge<E>> + '_ {
        self.nodes
            .fetch(&index)
            .into_iter()
            .flat_map(move |node| node.edges.iter().filter_map(move |&id| self.edges.get(id)))
    }

    /// Edges leaving `index`.
    ///
    /// A self-loop is stored once per adjacency list, so it is reported once
    /// here and once by [`predecessors`](Self::predecessors).
    pub fn successors(&self, index: u64) -> impl Iterator<Item = &Edge<E>> + '_ {
        self.edges_of(index).filter(move |edge| edge.head == index)
    }

    /// Edges entering `index`.
    pub fn predecessors(&self, index: u64) -> impl Iterator<Item = &Edge<E>> + '_ {
        self.edges_of(index).filter(move |edge| edge.tail == index)
    }

    /// Nodes in ascending index order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<N>> + '_ {
        self.nodes.values()
    }

    pub fn indices(&self) -> impl Iterator<Item = u64> + '_ {
        self.nodes.keys().copied()
    }

    /// Every edge once, grouped by head in ascending index order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge<E>> + '_ {
        self.indices().flat_map(move |index| self.successors(index))
    }

    /// Call `f` on every node in ascending index order.
    pub fn map(&mut self, mut f: impl FnMut(&mut Node<N>)) {
        self.nodes.map(|_, node| f(node));
    }

    fn insert_node(&mut self, index: u64, data: N) {
        self.nodes.insert(index, Node::new(index, data));
        if index == self.next_index {
            self.next_index = self.next_index.wrapping_add(1);
        }
        trace!(index = format_args!("{index:#x}"), "added node");
    }

    fn find_edge(&self, head: u64, tail: u64) -> Option<EdgeId> {
        let node = self.nodes.fetch(&head)?;
        node.edges.iter().copied().find(|&id| {
            self.edges
                .get(id)
                .is_some_and(|edge| edge.head == head && edge.tail == tail)
        })
    }

    fn link(&mut self, index: u64, id: EdgeId) {
        if let Some(node) = self.nodes.fetch_mut(&index) {
            node.edges.append(id);
        }
    }

    /// Unlink an edge from both endpoints and release it.
    fn detach(&mut self, id: EdgeId) -> Option<Edge<E>> {
        let edge = self.edges.remove(id)?;
        for index in [edge.head, edge.tail] {
            if let Some(node) = self.nodes.fetch_mut(&index) {
                node.unlink(id);
            }
        }
        Some(edge)
    }
}

impl<N, E> fmt::Display for Graph<N, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.nodes() {
            write!(f, "{:x} [", node.index)?;
            for edge in self.edges_of(node.index) {
                write!(f, " ({:x} -> {:x})", edge.head, edge.tail)?;
            }
            writeln!(f, " ]")?;
        }
        Ok(())
    }
}

impl<N: fmt::Debug, E: fmt::Debug> fmt::Debug for Graph<N, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.nodes.values().map(Node::data).collect::<Vec<_>>())
            .field("edges", &self.edges().collect::<Vec<_>>())
            .field("next_index", &self.next_index)
            .finish()
    }
}
