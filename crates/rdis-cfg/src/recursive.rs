//! Recursive disassembly worklist.
//!
//! Addresses move from queued to either decoded (a graph node) or failed
//! (dropped for the rest of the run). Nothing is decoded twice and failures
//! are never retried.

use rdis_graph::{Index, Queue, Set};
use tracing::{debug, trace, trace_span, warn};

use crate::{Architecture, InstructionGraph, MemoryImage, Successor};

/// Decode everything reachable from `entries` and return it as one graph.
///
/// Every successor is followed, calls included, so callee code lands in the
/// same graph. Call successors do not become edges though: callees show up
/// as components disconnected from their callers.
#[must_use]
pub fn recursive_disassemble<A>(arch: &A, memory: &dyn MemoryImage, entries: &[u64]) -> InstructionGraph
where
    A: Architecture + ?Sized,
{
    let _span = trace_span!("recursive_disassemble", arch = arch.name(), entries = entries.len()).entered();

    let mut graph = InstructionGraph::new();
    let mut failed: Set<Index> = Set::new();
    let mut queue: Queue<Index> = entries.iter().copied().map(Index).collect();

    while let Some(&Index(address)) = queue.peek() {
        if graph.contains(address) || failed.contains(&address) {
            queue.pop();
            continue;
        }

        match arch.decode(memory, address) {
            Ok(instruction) => {
                trace!(
                    address = format_args!("{address:#x}"),
                    ins = instruction.description(),
                    "decoded"
                );
                queue.extend(instruction.successors().iter().map(|s| Index(s.address())));
                // Keyed by the requested address.
                if let Err(err) = graph.add_node(address, instruction) {
                    warn!(%err, "decoded instruction collides with an existing node");
                }
            }
            Err(err) => {
                if entries.contains(&address) {
                    warn!(%err, "entry could not be decoded");
                } else {
                    trace!(%err, "decode failed");
                }
                failed.insert(Index(address));
            }
        }
        queue.pop();
    }

    let edges: Vec<(u64, Successor)> = graph
        .nodes()
        .flat_map(|node| {
            node.data()
                .successors()
                .iter()
                .filter(|successor| !successor.is_call())
                .map(move |successor| (node.index(), *successor))
        })
        .collect();

    for (head, successor) in edges {
        // Successors that failed to decode have no node, and a branch whose
        // two sides land on one address yields a duplicate; both are expected.
        if let Err(err) = graph.add_edge(head, successor.address(), successor) {
            trace!(%err, "edge not added");
        }
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        failed = failed.len(),
        "disassembled"
    );
    debug!("\n{graph}");
    graph
}

