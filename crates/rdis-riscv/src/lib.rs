//! RISC-V instruction decoding for recursive disassembly.
//!
//! [`RiscV`] implements [`rdis_cfg::Architecture`] for RV32 and RV64 with the
//! base integer set, the M and A extensions, Zicsr and the compressed set.
//! Floating point and vector opcodes outside the compressed loads and stores
//! decode as invalid.

mod arch;
mod decoder;
mod registers;

pub use arch::{RiscV, Xlen};
pub use decoder::{Decoded, Flow, decode};
pub use registers::reg_name;
