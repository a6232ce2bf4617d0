//! Analysis pipeline - flat binary → memory image → functions.

use std::fmt::Write as _;
use std::path::Path;

use rdis_cfg::{
    Buffer, DiscoveryConfig, Function, MemoryMap, SymbolTable, discover_functions, name_functions,
};
use rdis_graph::Map;
use rdis_riscv::{RiscV, Xlen};
use tracing::{debug, info};

use crate::Result;

/// What to analyze and how.
#[derive(Clone, Debug)]
pub struct Options {
    /// Load address of the flat binary.
    pub base: u64,
    /// Function entries; the base address when empty.
    pub entries: Vec<u64>,
    pub xlen: Xlen,
    /// Accept 16-bit compressed encodings.
    pub compressed: bool,
    pub discovery: DiscoveryConfig,
    pub symbols: SymbolTable,
}

impl Options {
    #[must_use]
    pub fn new(base: u64) -> Self {
        Self {
            base,
            entries: Vec::new(),
            xlen: Xlen::default(),
            compressed: true,
            discovery: DiscoveryConfig::default(),
            symbols: SymbolTable::new(),
        }
    }

    #[must_use]
    pub fn with_entry(mut self, entry: u64) -> Self {
        self.entries.push(entry);
        self
    }

    #[must_use]
    pub const fn with_xlen(mut self, xlen: Xlen) -> Self {
        self.xlen = xlen;
        self
    }

    #[must_use]
    pub const fn with_compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    #[must_use]
    pub const fn with_discovery(mut self, discovery: DiscoveryConfig) -> Self {
        self.discovery = discovery;
        self
    }

    #[must_use]
    pub fn with_label(mut self, address: u64, name: impl Into<String>) -> Self {
        self.symbols.insert(address, name);
        self
    }

    /// Entries to start discovery from.
    #[must_use]
    pub fn entries(&self) -> Vec<u64> {
        if self.entries.is_empty() {
            vec![self.base]
        } else {
            self.entries.clone()
        }
    }

    #[must_use]
    pub const fn arch(&self) -> RiscV {
        RiscV::new(self.xlen).with_compressed(self.compressed)
    }
}

/// Discovered functions, in address order.
#[derive(Clone, Debug)]
pub struct Analysis {
    functions: Map<u64, Function>,
}

impl Analysis {
    #[must_use]
    pub const fn functions(&self) -> &Map<u64, Function> {
        &self.functions
    }

    #[must_use]
    pub fn into_functions(self) -> Map<u64, Function> {
        self.functions
    }

    /// One `function : <address> <name>` line per function with graph sizes,
    /// followed by the instructions when `listing` is set.
    #[must_use]
    pub fn render(&self, listing: bool) -> String {
        let mut out = String::new();
        for (&address, function) in self.functions.iter() {
            let graph = function.graph();
            let _ = write!(out, "function : {address:08x}");
            if let Some(name) = function.name() {
                let _ = write!(out, " {name}");
            }
            let _ = write!(out, "  nodes={} edges={}", graph.node_count(), graph.edge_count());
            if let Some(blocks) = function.blocks() {
                let _ = write!(out, " blocks={}", blocks.node_count());
            }
            out.push('\n');

            if listing {
                for node in graph.nodes() {
                    let _ = writeln!(out, "    {}", node.data());
                }
            }
        }
        out
    }
}

/// Load a flat binary as one readable, executable buffer at `base`.
///
/// # Errors
///
/// [`Error::Io`](crate::Error::Io) if the file cannot be read.
pub fn load_flat(path: impl AsRef<Path>, base: u64) -> Result<MemoryMap> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    debug!(path = %path.display(), size = bytes.len(), base = format_args!("{base:#x}"), "loaded");

    let mut memory = MemoryMap::new();
    memory.insert(base, Buffer::new(bytes).with_permissions(Buffer::READ | Buffer::EXECUTE));
    Ok(memory)
}

/// Discover and name functions in `memory`.
///
/// # Errors
///
/// [`Error::Cfg`](crate::Error::Cfg) if discovery fails.
pub fn analyze(memory: &MemoryMap, options: &Options) -> Result<Analysis> {
    let arch = options.arch();
    let mut functions = discover_functions(&arch, memory, &options.entries(), &options.discovery)?;
    let named = name_functions(&mut functions, &options.symbols);
    info!(functions = functions.len(), named, "analysis complete");
    Ok(Analysis { functions })
}

/// [`load_flat`] followed by [`analyze`].
///
/// # Errors
///
/// Whatever either step fails with.
pub fn analyze_file(path: impl AsRef<Path>, options: &Options) -> Result<Analysis> {
    let memory = load_flat(path, options.base)?;
    analyze(&memory, options)
}
