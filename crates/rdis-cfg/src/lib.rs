//! Control flow recovery by recursive disassembly.
//!
//! An [`Architecture`] decodes one instruction at a time out of a
//! [`MemoryImage`]. [`recursive_disassemble`] follows successors from a set
//! of entries into an [`InstructionGraph`], and [`discover_functions`] runs
//! that per entry, treating call destinations as new entries.

mod arch;
mod block;
mod config;
mod error;
mod function;
mod instruction;
mod label;
mod memory;
mod recursive;

pub use arch::*;
pub use block::*;
pub use config::*;
pub use error::*;
pub use function::*;
pub use instruction::*;
pub use label::*;
pub use memory::*;
pub use recursive::*;
