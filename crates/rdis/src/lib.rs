//! rdis - recursive disassembler
//!
//! Loads raw code into a memory image, discovers functions by recursive
//! disassembly from entry addresses and names them from a symbol table.
//!
//! # Example
//!
//! ```ignore
//! use rdis::{Options, Xlen, analyze_file};
//!
//! let options = Options::new(0x8000_0000).with_xlen(Xlen::Rv32);
//! let analysis = analyze_file("firmware.bin", &options)?;
//! print!("{}", analysis.render(false));
//! ```

// Re-export from sub-crates
pub use rdis_cfg::{
    Architecture, Block, BlockGraph, Bounded, Buffer, DecodeError, DiscoveryConfig, Function,
    Instruction, InstructionGraph, Labeler, MemoryImage, MemoryMap, Successor, SuccessorKind,
    SymbolTable, block_graph, discover_functions, name_functions, recursive_disassemble,
};
pub use rdis_graph::{Graph, GraphError, Index, List, Map, Merge, Queue, Set, Tree};
pub use rdis_riscv::{RiscV, Xlen};

mod pipeline;
pub use pipeline::*;

use thiserror::Error;

/// Driver errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Analysis error: {0}")]
    Cfg(#[from] rdis_cfg::Error),
    #[error("Invalid address: {0:?}")]
    InvalidAddress(String),
    #[error("Invalid label {0:?}, expected ADDRESS=NAME")]
    InvalidLabel(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Parse a hexadecimal address, with or without a `0x` prefix.
///
/// # Errors
///
/// [`Error::InvalidAddress`] if `text` is not a hexadecimal `u64`.
pub fn parse_address(text: &str) -> Result<u64> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u64::from_str_radix(digits, 16).map_err(|_| Error::InvalidAddress(text.to_string()))
}

/// Parse an `ADDRESS=NAME` label.
///
/// # Errors
///
/// [`Error::InvalidLabel`] if `=` or the name is missing, and
/// [`Error::InvalidAddress`] for a bad address.
pub fn parse_label(text: &str) -> Result<(u64, String)> {
    let (address, name) = text
        .split_once('=')
        .filter(|(_, name)| !name.is_empty())
        .ok_or_else(|| Error::InvalidLabel(text.to_string()))?;
    Ok((parse_address(address)?, name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x1000").unwrap(), 0x1000);
        assert_eq!(parse_address("8000ABCD").unwrap(), 0x8000_abcd);
        assert!(matches!(parse_address("0xzz"), Err(Error::InvalidAddress(s)) if s == "0xzz"));
        assert!(parse_address("").is_err());
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label("0x1000=main").unwrap(), (0x1000, "main".to_string()));
        assert!(matches!(parse_label("1000"), Err(Error::InvalidLabel(_))));
        assert!(matches!(parse_label("1000="), Err(Error::InvalidLabel(_))));
        assert!(matches!(parse_label("g=main"), Err(Error::InvalidAddress(_))));
    }
}
