//! Basic blocks: instruction graphs with coalescable payloads.

use rdis_graph::{Graph, List, Merge};
use tracing::trace;

use crate::{Instruction, InstructionGraph, Successor};

/// Straight-line run of instructions, in address order of execution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    instructions: List<Instruction>,
}

/// Graph whose nodes are basic blocks keyed by their first address.
pub type BlockGraph = Graph<Block, Successor>;

impl Block {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            instructions: List::new(),
        }
    }

    /// Address of the first instruction.
    #[must_use]
    pub fn address(&self) -> Option<u64> {
        self.instructions.first().map(Instruction::address)
    }

    #[must_use]
    pub const fn instructions(&self) -> &List<Instruction> {
        &self.instructions
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.instructions.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.append(instruction);
    }

    /// Total encoded size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.instructions.iter().map(Instruction::size).sum()
    }
}

impl From<Instruction> for Block {
    fn from(instruction: Instruction) -> Self {
        let mut block = Self::new();
        block.push(instruction);
        block
    }
}

impl Merge for Block {
    fn merge(&mut self, other: &Self) {
        self.instructions.append_list(&other.instructions);
    }
}

/// Copy an instruction graph into a graph of one-instruction blocks.
///
/// [`Graph::reduce`] on the result coalesces the blocks.
#[must_use]
pub fn block_graph(graph: &InstructionGraph) -> BlockGraph {
    let mut blocks = BlockGraph::new();
    for node in graph.nodes() {
        if let Err(err) = blocks.add_node(node.index(), Block::from(node.data().clone())) {
            trace!(%err, "block already present");
        }
    }
    for edge in graph.edges() {
        if let Err(err) = blocks.add_edge(edge.head(), edge.tail(), *edge.data()) {
            trace!(%err, "block edge not added");
        }
    }
    blocks
}
