//! Property-based tests for the recursive disassembly worklist.
//!
//! - Every address is handed to the decoder at most once
//! - Call successors never become edges
//! - Every edge matches a successor its head instruction declared

use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Mutex;

use rdis_cfg::{
    Architecture, DecodeError, Instruction, MemoryImage, MemoryMap, SuccessorKind,
    recursive_disassemble,
};

struct Random {
    program: BTreeMap<u64, Vec<(u64, SuccessorKind)>>,
    calls: Mutex<Vec<u64>>,
}

impl Architecture for Random {
    fn name(&self) -> &'static str {
        "random"
    }

    fn decode(&self, _memory: &dyn MemoryImage, address: u64) -> Result<Instruction, DecodeError> {
        self.calls.lock().unwrap().push(address);
        let successors = self.program.get(&address).ok_or(DecodeError::Unmapped(address))?;
        Ok(successors.iter().fold(
            Instruction::new(address, &[0; 4], "ins"),
            |ins, &(target, kind)| ins.with_successor(target, kind),
        ))
    }
}

fn arb_kind() -> impl Strategy<Value = SuccessorKind> {
    prop_oneof![
        Just(SuccessorKind::Normal),
        Just(SuccessorKind::Jump),
        Just(SuccessorKind::ConditionalTrue),
        Just(SuccessorKind::ConditionalFalse),
        Just(SuccessorKind::Call),
    ]
}

/// Programs over `0..n` whose successors may point past the end.
fn arb_program() -> impl Strategy<Value = BTreeMap<u64, Vec<(u64, SuccessorKind)>>> {
    (1u64..40).prop_flat_map(|n| {
        prop::collection::btree_map(
            0..n,
            prop::collection::vec((0..n + 8, arb_kind()), 0..3),
            1..=usize::try_from(n).unwrap(),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn worklist_decodes_each_address_once(program in arb_program(), entry in 0u64..48) {
        let arch = Random { program, calls: Mutex::new(Vec::new()) };
        let graph = recursive_disassemble(&arch, &MemoryMap::new(), &[entry]);

        let mut calls = arch.calls.lock().unwrap().clone();
        let total = calls.len();
        calls.sort_unstable();
        calls.dedup();
        prop_assert_eq!(calls.len(), total);
        prop_assert!(graph.node_count() <= arch.program.len());
    }

    #[test]
    fn worklist_edges_follow_successors(program in arb_program(), entry in 0u64..48) {
        let arch = Random { program, calls: Mutex::new(Vec::new()) };
        let graph = recursive_disassemble(&arch, &MemoryMap::new(), &[entry]);

        for edge in graph.edges() {
            prop_assert!(!edge.data().is_call());
            prop_assert_eq!(edge.data().address(), edge.tail());
            let declared = &arch.program[&edge.head()];
            prop_assert!(declared.contains(&(edge.tail(), edge.data().kind())));
        }
        for node in graph.nodes() {
            for successor in node.data().successors() {
                if !successor.is_call() {
                    prop_assert!(graph.fetch_edge(node.index(), successor.address()).is_some()
                        || !graph.contains(successor.address()));
                }
            }
        }
    }
}
