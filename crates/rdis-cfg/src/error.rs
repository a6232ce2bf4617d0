use rdis_graph::GraphError;
use thiserror::Error;

/// Why an architecture could not decode an instruction at an address.
///
/// A decode failure ends exploration of that one address; it never aborts a
/// disassembly run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Address 0x{0:x} is not mapped")]
    Unmapped(u64),
    #[error("Instruction at 0x{address:x} needs {needed} bytes, only {available} mapped")]
    Truncated {
        address: u64,
        needed: usize,
        available: usize,
    },
    #[error("Invalid instruction 0x{raw:08x} at 0x{address:x}")]
    Invalid { address: u64, raw: u32 },
}

impl DecodeError {
    /// Address the failed decode was attempted at.
    #[must_use]
    pub const fn address(&self) -> u64 {
        match *self {
            Self::Unmapped(address)
            | Self::Truncated { address, .. }
            | Self::Invalid { address, .. } => address,
        }
    }
}

/// Control flow recovery errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
    #[error("No entry addresses to disassemble from")]
    NoEntries,
}

pub type Result<T> = std::result::Result<T, Error>;
