//! Ordered containers and a directed multigraph for control flow recovery.
//!
//! Every container here is generic over the same ownership protocol:
//! elements are released by `Drop`, duplicated by `Clone`, ordered by `Ord`
//! and, where the graph needs to coalesce nodes, combined through [`Merge`].

mod graph;
mod index;
mod list;
mod map;
mod object;
mod queue;
mod tree;

pub use graph::*;
pub use index::Index;
pub use list::{Cursor, List};
pub use map::Map;
pub use object::Merge;
pub use queue::Queue;
pub use tree::{Set, Tree};

use thiserror::Error;

/// Structural errors reported by graph mutations.
///
/// None of these mutate the graph: the operation that returned the error left
/// it exactly as it was.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    #[error("node 0x{0:x} not in graph")]
    MissingNode(u64),
    #[error("node 0x{0:x} already in graph")]
    DuplicateNode(u64),
    #[error("edge 0x{head:x} -> 0x{tail:x} already in graph")]
    DuplicateEdge { head: u64, tail: u64 },
    #[error("no edge 0x{head:x} -> 0x{tail:x}")]
    MissingEdge { head: u64, tail: u64 },
    #[error("edge references node 0x{node:x} which is not in graph")]
    DanglingEdge { node: u64 },
}

pub type Result<T> = std::result::Result<T, GraphError>;
