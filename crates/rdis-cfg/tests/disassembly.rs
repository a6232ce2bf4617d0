//! Worklist and function discovery tests over a scripted architecture.

use std::io;
use std::sync::{Arc, Mutex};

use rdis_cfg::{
    Architecture, Block, Buffer, DecodeError, DiscoveryConfig, Error, Instruction, MemoryImage,
    MemoryMap, SuccessorKind, SymbolTable, block_graph, call_destinations, call_instructions,
    discover_functions, name_functions, recursive_disassemble,
};
use rdis_graph::Map;

use tracing::Level;

use SuccessorKind::{Call, ConditionalFalse, ConditionalTrue, Jump, Normal};

/// Architecture that answers from a fixed table and records every decode.
struct Scripted {
    table: Map<u64, Instruction>,
    decoded: Mutex<Vec<u64>>,
}

impl Scripted {
    fn new(program: &[(u64, &[(u64, SuccessorKind)])]) -> Self {
        let table = program
            .iter()
            .map(|&(address, successors)| {
                let ins = successors.iter().fold(
                    Instruction::new(address, &[0; 4], format!("ins_{address:x}")),
                    |ins, &(target, kind)| ins.with_successor(target, kind),
                );
                (address, ins)
            })
            .collect();
        Self {
            table,
            decoded: Mutex::new(Vec::new()),
        }
    }

    fn decoded(&self) -> Vec<u64> {
        self.decoded.lock().unwrap().clone()
    }
}

impl Architecture for Scripted {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn decode(&self, _memory: &dyn MemoryImage, address: u64) -> Result<Instruction, DecodeError> {
        self.decoded.lock().unwrap().push(address);
        self.table
            .fetch(&address)
            .cloned()
            .ok_or(DecodeError::Unmapped(address))
    }
}

fn memory() -> MemoryMap {
    let mut memory = MemoryMap::new();
    memory.insert(0, Buffer::zeroed(0x10000).with_permissions(Buffer::READ | Buffer::EXECUTE));
    memory
}

fn branch_program() -> Scripted {
    Scripted::new(&[
        (0x1000, &[(0x1004, Normal)]),
        (0x1004, &[(0x2000, ConditionalTrue), (0x1008, ConditionalFalse)]),
        (0x1008, &[]),
        (0x2000, &[]),
    ])
}

fn call_program() -> Scripted {
    Scripted::new(&[
        (0x3000, &[(0x4000, Call), (0x3004, Normal)]),
        (0x3004, &[]),
        (0x4000, &[(0x4004, Normal)]),
        (0x4004, &[(0x5000, Call), (0x4008, Normal)]),
        (0x4008, &[]),
        (0x5000, &[]),
    ])
}

#[test]
fn test_branch_scenario() {
    let arch = branch_program();
    let graph = recursive_disassemble(&arch, &memory(), &[0x1000]);

    assert_eq!(graph.indices().collect::<Vec<_>>(), vec![0x1000, 0x1004, 0x1008, 0x2000]);
    assert_eq!(graph.edge_count(), 3);
    assert!(graph.edges().all(|edge| !edge.data().is_call()));
    assert_eq!(
        graph.fetch_edge(0x1004, 0x2000).map(|e| e.data().kind()),
        Some(ConditionalTrue)
    );

    let mut blocks = block_graph(&graph);
    assert_eq!(blocks.reduce(), Ok(1));
    assert_eq!(blocks.indices().collect::<Vec<_>>(), vec![0x1000, 0x1008, 0x2000]);
    assert_eq!(blocks.fetch_data(0x1000).map(Block::len), Some(2));
    assert_eq!(blocks.edge_count(), 2);
}

/// Log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn disassemble_logged(level: Level) -> String {
    let captured = Captured::default();
    let sink = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(move || sink.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        let _ = recursive_disassemble(&branch_program(), &memory(), &[0x1000]);
    });
    captured.text()
}

#[test]
fn test_graph_listing_logged_at_debug() {
    assert!(disassemble_logged(Level::DEBUG).contains("1000 [ (1000 -> 1004) ]"));
    assert!(!disassemble_logged(Level::INFO).contains("1000 ["));
}

#[test]
fn test_call_target_decoded_without_edge() {
    let arch = call_program();
    let graph = recursive_disassemble(&arch, &memory(), &[0x3000]);

    assert!(graph.contains(0x3000));
    assert!(graph.contains(0x4000));
    assert!(graph.fetch_edge(0x3000, 0x4000).is_none());
    assert!(graph.fetch_edge(0x3000, 0x3004).is_some());
    assert_eq!(graph.predecessors(0x4000).count(), 0);
    assert_eq!(call_destinations(&graph), vec![0x4000, 0x5000]);
    assert_eq!(
        call_instructions(&graph).iter().map(|i| i.address()).collect::<Vec<_>>(),
        vec![0x3000, 0x4004]
    );
}

#[test]
fn test_each_address_decoded_once() {
    // A loop, a branch into the loop and a branch into unmapped space.
    let arch = Scripted::new(&[
        (0x0, &[(0x4, Normal)]),
        (0x4, &[(0x0, ConditionalTrue), (0x8, ConditionalFalse)]),
        (0x8, &[(0x4, Jump), (0x900, Jump)]),
    ]);
    let graph = recursive_disassemble(&arch, &memory(), &[0x0, 0x4, 0x0]);

    let mut decoded = arch.decoded();
    decoded.sort_unstable();
    assert_eq!(decoded, vec![0x0, 0x4, 0x8, 0x900]);
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 4);
}

#[test]
fn test_duplicate_successor_yields_one_edge() {
    let arch = Scripted::new(&[
        (0x10, &[(0x14, ConditionalTrue), (0x14, ConditionalFalse)]),
        (0x14, &[]),
    ]);
    let graph = recursive_disassemble(&arch, &memory(), &[0x10]);
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(
        graph.fetch_edge(0x10, 0x14).map(|e| e.data().kind()),
        Some(ConditionalTrue)
    );
}

#[test]
fn test_failed_entry_gives_empty_graph() {
    let arch = Scripted::new(&[]);
    let graph = recursive_disassemble(&arch, &memory(), &[0xdead]);
    assert!(graph.is_empty());
    assert_eq!(arch.decoded(), vec![0xdead]);
}

#[test]
fn test_discover_functions_follows_calls() {
    let arch = call_program();
    let config = DiscoveryConfig::new().with_reduce(true);
    let mut functions = discover_functions(&arch, &memory(), &[0x3000], &config).unwrap();

    assert_eq!(functions.keys().copied().collect::<Vec<_>>(), vec![0x3000, 0x4000, 0x5000]);
    let callee = functions.fetch(&0x4000).unwrap();
    assert_eq!(callee.graph().node_count(), 4);
    let blocks = callee.blocks().unwrap();
    assert_eq!(blocks.fetch_data(0x4000).map(Block::len), Some(3));
    assert_eq!(blocks.node_count(), 2);

    let symbols: SymbolTable = [(0x3000, "_start"), (0x5000, "exit")].into_iter().collect();
    assert_eq!(name_functions(&mut functions, &symbols), 2);
    assert_eq!(functions.fetch(&0x5000).and_then(|f| f.name()), Some("exit"));
}

#[test]
fn test_parallel_discovery_matches_sequential() {
    let memory = memory();
    let entries = [0x3000, 0x1000, 0x3000];

    let mut arch = call_program();
    for (address, ins) in branch_program().table.iter() {
        arch.table.insert(*address, ins.clone());
    }

    let sequential = discover_functions(&arch, &memory, &entries, &DiscoveryConfig::new()).unwrap();
    let parallel = discover_functions(
        &arch,
        &memory,
        &entries,
        &DiscoveryConfig::new().with_parallel(true),
    )
    .unwrap();

    let summary = |functions: &Map<u64, rdis_cfg::Function>| {
        functions
            .iter()
            .map(|(&address, f)| (address, f.graph().node_count(), f.graph().edge_count()))
            .collect::<Vec<_>>()
    };
    assert_eq!(summary(&sequential), summary(&parallel));
    assert_eq!(sequential.len(), 4);
}

#[test]
fn test_discover_requires_entries() {
    let arch = call_program();
    let result = discover_functions(&arch, &memory(), &[], &DiscoveryConfig::default());
    assert_eq!(result.unwrap_err(), Error::NoEntries);
}

#[test]
fn test_closure_architecture() {
    // Decode straight out of memory: a zero byte halts, anything else falls through.
    let decode = |memory: &dyn MemoryImage, address: u64| -> Result<Instruction, DecodeError> {
        let byte = memory.read(address, 1).ok_or(DecodeError::Unmapped(address))?;
        let ins = Instruction::new(address, byte, "byte");
        Ok(if byte[0] == 0 { ins } else { ins.with_successor(address + 1, Normal) })
    };

    let mut memory = MemoryMap::new();
    memory.insert(0x100, Buffer::new(vec![1, 1, 1, 0, 1]));
    let graph = recursive_disassemble(&decode, &memory, &[0x100]);
    assert_eq!(graph.indices().collect::<Vec<_>>(), vec![0x100, 0x101, 0x102, 0x103]);
    assert_eq!(decode.name(), "fn");
}
