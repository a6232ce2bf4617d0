//! Function discovery: the outer worklist over call targets.

use std::cmp::Ordering;

use rayon::prelude::*;
use rdis_graph::{Index, Map, Queue};
use rustc_hash::FxHashSet;
use tracing::{debug, debug_span, trace};

use crate::{
    block_graph, recursive_disassemble, Architecture, BlockGraph, DiscoveryConfig, Error,
    Instruction, InstructionGraph, MemoryImage, Result,
};

/// A function: its entry address, an optional name, and the instruction
/// graph disassembled from the entry.
#[derive(Clone, Debug)]
pub struct Function {
    address: u64,
    name: Option<String>,
    graph: InstructionGraph,
    blocks: Option<BlockGraph>,
}

impl Function {
    #[must_use]
    pub const fn new(address: u64, graph: InstructionGraph) -> Self {
        Self {
            address,
            name: None,
            graph,
            blocks: None,
        }
    }

    #[must_use]
    pub const fn address(&self) -> u64 {
        self.address
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    #[must_use]
    pub const fn graph(&self) -> &InstructionGraph {
        &self.graph
    }

    pub const fn graph_mut(&mut self) -> &mut InstructionGraph {
        &mut self.graph
    }

    /// Reduced basic block graph, when discovery was asked to build one.
    #[must_use]
    pub const fn blocks(&self) -> Option<&BlockGraph> {
        self.blocks.as_ref()
    }

    /// Build the reduced block graph from the instruction graph.
    ///
    /// # Errors
    ///
    /// [`Error::Graph`] if the instruction graph has an edge to a missing node.
    pub fn build_blocks(&mut self) -> Result<&BlockGraph> {
        let mut blocks = block_graph(&self.graph);
        blocks.reduce()?;
        Ok(self.blocks.insert(blocks))
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for Function {}

impl PartialOrd for Function {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Function {
    fn cmp(&self, other: &Self) -> Ordering {
        self.address.cmp(&other.address)
    }
}

/// Distinct call destinations of every instruction in `graph`, ascending.
#[must_use]
pub fn call_destinations(graph: &InstructionGraph) -> Vec<u64> {
    let destinations: FxHashSet<u64> = graph
        .nodes()
        .flat_map(|node| node.data().successors().iter())
        .filter(|successor| successor.is_call())
        .map(|successor| successor.address())
        .collect();
    let mut destinations: Vec<u64> = destinations.into_iter().collect();
    destinations.sort_unstable();
    destinations
}

/// Every call instruction in `graph`, in address order.
#[must_use]
pub fn call_instructions(graph: &InstructionGraph) -> Vec<&Instruction> {
    graph
        .nodes()
        .map(|node| node.data())
        .filter(|instruction| instruction.is_call())
        .collect()
}

/// Discover functions starting from `entries`.
///
/// Each entry is disassembled into its own graph and every call destination
/// found there becomes a further entry, until no new entries appear. Entries
/// already discovered are skipped. With `config.parallel`, each wave of
/// pending entries is disassembled on the rayon pool; the result is the same
/// as the sequential run.
///
/// # Errors
///
/// [`Error::NoEntries`] for an empty `entries`, or [`Error::Graph`] if a
/// block graph cannot be reduced.
pub fn discover_functions<A, M>(
    arch: &A,
    memory: &M,
    entries: &[u64],
    config: &DiscoveryConfig,
) -> Result<Map<u64, Function>>
where
    A: Architecture + Sync,
    M: MemoryImage + Sync,
{
    if entries.is_empty() {
        return Err(Error::NoEntries);
    }
    let _span = debug_span!("discover_functions", arch = arch.name(), parallel = config.parallel).entered();

    let mut functions = Map::new();
    let mut pending: Queue<Index> = entries.iter().copied().map(Index).collect();

    if config.parallel {
        loop {
            let mut seen = FxHashSet::default();
            let wave: Vec<u64> = pending
                .drain()
                .map(Index::get)
                .filter(|address| !functions.contains_key(address) && seen.insert(*address))
                .collect();
            if wave.is_empty() {
                break;
            }
            trace!(size = wave.len(), "disassembling wave");

            let found = wave
                .par_iter()
                .map(|&address| analyze(arch, memory, address, config))
                .collect::<Result<Vec<_>>>()?;
            for function in found {
                pending.extend(call_destinations(function.graph()).into_iter().map(Index));
                functions.insert(function.address(), function);
            }
        }
    } else {
        while let Some(&Index(address)) = pending.peek() {
            if !functions.contains_key(&address) {
                let function = analyze(arch, memory, address, config)?;
                pending.extend(call_destinations(function.graph()).into_iter().map(Index));
                functions.insert(address, function);
            }
            pending.pop();
        }
    }

    debug!(functions = functions.len(), "discovered functions");
    Ok(functions)
}

fn analyze<A, M>(arch: &A, memory: &M, address: u64, config: &DiscoveryConfig) -> Result<Function>
where
    A: Architecture,
    M: MemoryImage,
{
    let graph = recursive_disassemble(arch, memory, &[address]);
    let mut function = Function::new(address, graph);
    if config.reduce {
        function.build_blocks()?;
    }
    trace!(
        address = format_args!("{address:#x}"),
        nodes = function.graph().node_count(),
        "analyzed function"
    );
    Ok(function)
}
