//! Function naming.

use rdis_graph::Map;
use tracing::debug;

use crate::Function;

/// Source of names for addresses, typically a loader's symbol table.
pub trait Labeler {
    fn label(&self, address: u64) -> Option<String>;
}

impl<F> Labeler for F
where
    F: Fn(u64) -> Option<String>,
{
    fn label(&self, address: u64) -> Option<String> {
        self(address)
    }
}

/// Address to name table.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    symbols: Map<u64, String>,
}

impl SymbolTable {
    #[must_use]
    pub const fn new() -> Self {
        Self { symbols: Map::new() }
    }

    /// Name `address`, returning the name it had before.
    pub fn insert(&mut self, address: u64, name: impl Into<String>) -> Option<String> {
        self.symbols.insert(address, name.into())
    }

    #[must_use]
    pub fn fetch(&self, address: u64) -> Option<&str> {
        self.symbols.fetch(&address).map(String::as_str)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> + '_ {
        self.symbols.iter().map(|(&address, name)| (address, name.as_str()))
    }
}

impl Labeler for SymbolTable {
    fn label(&self, address: u64) -> Option<String> {
        self.fetch(address).map(str::to_string)
    }
}

impl<A: Into<String>> FromIterator<(u64, A)> for SymbolTable {
    fn from_iter<I: IntoIterator<Item = (u64, A)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (address, name) in iter {
            table.insert(address, name);
        }
        table
    }
}

/// Name every function the labeler knows. Returns how many were named.
///
/// Runs after discovery; naming never feeds back into graph construction.
pub fn name_functions(functions: &mut Map<u64, Function>, labeler: &(impl Labeler + ?Sized)) -> usize {
    let mut named = 0;
    functions.map(|&address, function| {
        if let Some(name) = labeler.label(address) {
            function.set_name(name);
            named += 1;
        }
    });
    debug!(named, total = functions.len(), "named functions");
    named
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InstructionGraph;

    #[test]
    fn test_symbol_table_labels() {
        let table: SymbolTable = [(0x1000, "_start"), (0x2000, "main")].into_iter().collect();
        assert_eq!(table.label(0x1000).as_deref(), Some("_start"));
        assert_eq!(table.label(0x1004), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_name_functions() {
        let mut functions = Map::new();
        for address in [0x1000, 0x2000, 0x3000] {
            functions.insert(address, Function::new(address, InstructionGraph::new()));
        }
        let table: SymbolTable = [(0x2000, "main")].into_iter().collect();
        assert_eq!(name_functions(&mut functions, &table), 1);
        assert_eq!(functions.fetch(&0x2000).and_then(Function::name), Some("main"));
        assert_eq!(functions.fetch(&0x1000).and_then(Function::name), None);

        let by_closure = |address: u64| Some(format!("sub_{address:x}"));
        assert_eq!(name_functions(&mut functions, &by_closure), 3);
        assert_eq!(functions.fetch(&0x3000).and_then(Function::name), Some("sub_3000"));
    }
}
