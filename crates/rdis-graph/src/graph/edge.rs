//! Edge storage.
//!
//! Every edge lives exactly once, in the graph's arena. Adjacency lists hold
//! [`EdgeId`]s, so an edge referenced from both of its endpoints is still
//! owned by one place and released once.

/// Stable handle to an edge in its graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeId {
    slot: usize,
    generation: u32,
}

/// A directed edge `head -> tail` carrying a payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge<E> {
    pub(crate) head: u64,
    pub(crate) tail: u64,
    data: E,
}

impl<E> Edge<E> {
    #[must_use]
    pub(crate) const fn new(head: u64, tail: u64, data: E) -> Self {
        Self { head, tail, data }
    }

    #[must_use]
    pub const fn head(&self) -> u64 {
        self.head
    }

    #[must_use]
    pub const fn tail(&self) -> u64 {
        self.tail
    }

    #[must_use]
    pub const fn data(&self) -> &E {
        &self.data
    }

    pub const fn data_mut(&mut self) -> &mut E {
        &mut self.data
    }

    #[must_use]
    pub const fn is_loop(&self) -> bool {
        self.head == self.tail
    }

    #[must_use]
    pub(crate) fn into_data(self) -> E {
        self.data
    }
}

#[derive(Clone, Debug)]
struct Slot<E> {
    edge: Option<Edge<E>>,
    generation: u32,
}

#[derive(Clone, Debug)]
pub struct EdgeArena<E> {
    slots: Vec<Slot<E>>,
    free: Vec<usize>,
    len: usize,
}

impl<E> EdgeArena<E> {
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    #[must_use]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn insert(&mut self, edge: Edge<E>) -> EdgeId {
        self.len += 1;
        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot];
            entry.edge = Some(edge);
            return EdgeId {
                slot,
                generation: entry.generation,
            };
        }
        self.slots.push(Slot {
            edge: Some(edge),
            generation: 0,
        });
        EdgeId {
            slot: self.slots.len() - 1,
            generation: 0,
        }
    }

    #[must_use]
    pub(crate) fn get(&self, id: EdgeId) -> Option<&Edge<E>> {
        self.slots
            .get(id.slot)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.edge.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: EdgeId) -> Option<&mut Edge<E>> {
        self.slots
            .get_mut(id.slot)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.edge.as_mut())
    }

    pub(crate) fn remove(&mut self, id: EdgeId) -> Option<Edge<E>> {
        let slot = self
            .slots
            .get_mut(id.slot)
            .filter(|slot| slot.generation == id.generation)?;
        let edge = slot.edge.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.slot);
        self.len -= 1;
        Some(edge)
    }
}
