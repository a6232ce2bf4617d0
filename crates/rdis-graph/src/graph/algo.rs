//! Whole-graph algorithms: merge, reduce, family and breadth-first traversal.

use tracing::{debug, trace, warn};

use crate::{GraphError, Index, List, Merge, Queue, Result, Set};

use super::{EdgeId, Graph, Node};

impl<N: Clone, E: Clone> Graph<N, E> {
    /// Add every node and edge of `other` that this graph lacks.
    ///
    /// Nodes already present keep their payload, and edges already present
    /// are left alone, so merging the same graph twice is the same as merging
    /// it once.
    pub fn merge(&mut self, other: &Self) {
        let mut pending = Queue::new();
        for node in other.nodes() {
            pending.extend(other.successors(node.index));
            if !self.contains(node.index) {
                self.insert_node(node.index, node.data.clone());
            }
        }

        while let Some(edge) = pending.pop() {
            if let Err(err) = self.add_edge(edge.head, edge.tail, edge.data().clone()) {
                trace!(%err, "merge skipped edge");
            }
        }
    }

    /// Subgraph of the nodes reachable from `seed` following edges in
    /// either direction.
    ///
    /// # Errors
    ///
    /// [`GraphError::MissingNode`] if `seed` is absent and
    /// [`GraphError::DanglingEdge`] if an edge leads to a node that is not in
    /// the graph.
    pub fn family(&self, seed: u64) -> Result<Self> {
        if !self.contains(seed) {
            return Err(GraphError::MissingNode(seed));
        }

        let mut family = Self::new();
        let mut visited = Set::new();
        let mut queue = Queue::new();
        visited.insert(Index(seed));
        queue.push(Index(seed));

        while let Some(Index(index)) = queue.pop() {
            let node = self
                .fetch_node(index)
                .ok_or(GraphError::DanglingEdge { node: index })?;
            family.insert_node(index, node.data.clone());

            for edge in self.edges_of(index) {
                for next in [edge.head, edge.tail] {
                    if visited.insert(Index(next)) {
                        queue.push(Index(next));
                    }
                }
            }
        }

        let members: List<Index> = family.indices().map(Index).collect();
        for &Index(index) in &members {
            for edge in self.successors(index) {
                family.add_edge(edge.head, edge.tail, edge.data().clone())?;
            }
        }

        debug!(
            seed = format_args!("{seed:#x}"),
            nodes = family.node_count(),
            edges = family.edge_count(),
            "extracted family"
        );
        Ok(family)
    }
}

impl<N: Merge, E> Graph<N, E> {
    /// Coalesce chains into blocks.
    ///
    /// Whenever a node has exactly one successor and that successor has
    /// exactly one predecessor, the successor's payload is merged into the
    /// node, its outgoing edges are re-pointed to leave from the node, and it
    /// is removed. Returns how many nodes were absorbed.
    ///
    /// # Errors
    ///
    /// [`GraphError::DanglingEdge`] if an edge points at a node that is not
    /// in the graph.
    pub fn reduce(&mut self) -> Result<usize> {
        let worklist: List<Index> = self.indices().map(Index).collect();
        let mut absorbed = 0;

        for &Index(head) in &worklist {
            // A node keeps absorbing until its chain ends.
            while let Some(tail) = self.absorbable(head)? {
                self.absorb(head, tail)?;
                absorbed += 1;
            }
        }

        debug!(absorbed, nodes = self.node_count(), edges = self.edge_count(), "reduced graph");
        Ok(absorbed)
    }

    fn absorbable(&self, head: u64) -> Result<Option<u64>> {
        if !self.contains(head) {
            return Ok(None);
        }
        let mut successors = self.successors(head);
        let (Some(edge), None) = (successors.next(), successors.next()) else {
            return Ok(None);
        };
        let tail = edge.tail;
        if tail == head {
            return Ok(None);
        }
        if !self.contains(tail) {
            return Err(GraphError::DanglingEdge { node: tail });
        }
        if self.predecessors(tail).count() != 1 {
            return Ok(None);
        }
        Ok(Some(tail))
    }

    fn absorb(&mut self, head: u64, tail: u64) -> Result<()> {
        let link = self
            .find_edge(head, tail)
            .ok_or(GraphError::MissingEdge { head, tail })?;
        self.detach(link);

        let moved: Vec<EdgeId> = self
            .fetch_node(tail)
            .ok_or(GraphError::DanglingEdge { node: tail })?
            .edges
            .iter()
            .copied()
            .collect();

        // Every edge left on `tail` leaves it: its only predecessor was `head`.
        for id in moved {
            if let Some(edge) = self.edges.get_mut(id) {
                edge.head = head;
            }
            let node = self
                .nodes
                .fetch_mut(&head)
                .ok_or(GraphError::MissingNode(head))?;
            if !node.edges.contains(&id) {
                node.edges.append(id);
            }
        }

        let absorbed = self
            .nodes
            .remove(&tail)
            .ok_or(GraphError::DanglingEdge { node: tail })?;
        if let Some(node) = self.nodes.fetch_mut(&head) {
            node.data.merge(&absorbed.data);
        }

        trace!(
            head = format_args!("{head:#x}"),
            tail = format_args!("{tail:#x}"),
            "absorbed node"
        );
        Ok(())
    }
}

impl<N, E> Graph<N, E> {
    /// Visit every node reachable from `seed` along successor edges, once
    /// each, in breadth-first order.
    ///
    /// Edges pointing at nodes that are not (yet) in the graph are logged and
    /// skipped, since partially built graphs are traversed routinely.
    pub fn bfs(&self, seed: u64, mut visit: impl FnMut(&Node<N>)) {
        let mut visited = Set::new();
        let mut queue = Queue::new();
        visited.insert(Index(seed));
        queue.push(Index(seed));

        while let Some(Index(index)) = queue.pop() {
            let Some(node) = self.fetch_node(index) else {
                warn!(index = format_args!("{index:#x}"), "bfs reached a node not in graph");
                continue;
            };
            visit(node);

            for edge in self.successors(index) {
                if visited.insert(Index(edge.tail)) {
                    queue.push(Index(edge.tail));
                }
            }
        }
    }

    /// Indices of the nodes [`bfs`](Self::bfs) visits from `seed`.
    #[must_use]
    pub fn reachable(&self, seed: u64) -> Set<Index> {
        let mut reached = Set::new();
        self.bfs(seed, |node| {
            reached.insert(Index(node.index));
        });
        reached
    }
}

impl<N: Clone, E: Clone> Merge for Graph<N, E> {
    fn merge(&mut self, other: &Self) {
        Self::merge(self, other);
    }
}
