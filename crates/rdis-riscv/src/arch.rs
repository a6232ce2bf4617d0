use rdis_cfg::{Architecture, DecodeError, Instruction, MemoryImage, SuccessorKind};
use tracing::trace;

use crate::{Flow, decode};

/// Register width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Xlen {
    Rv32,
    #[default]
    Rv64,
}

impl Xlen {
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Rv32 => 32,
            Self::Rv64 => 64,
        }
    }

    /// `pc + offset`, wrapped to the address width.
    #[must_use]
    pub fn offset(self, pc: u64, offset: i32) -> u64 {
        let target = pc.wrapping_add_signed(i64::from(offset));
        match self {
            Self::Rv32 => target & 0xFFFF_FFFF,
            Self::Rv64 => target,
        }
    }
}

/// RISC-V decoder.
///
/// Little-endian instruction fetch. With `compressed` off, any halfword whose
/// low bits are not `0b11` is invalid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RiscV {
    xlen: Xlen,
    compressed: bool,
}

impl Default for RiscV {
    fn default() -> Self {
        Self::new(Xlen::default())
    }
}

impl RiscV {
    #[must_use]
    pub const fn new(xlen: Xlen) -> Self {
        Self {
            xlen,
            compressed: true,
        }
    }

    #[must_use]
    pub const fn with_compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    #[must_use]
    pub const fn xlen(&self) -> Xlen {
        self.xlen
    }

    #[must_use]
    pub const fn compressed(&self) -> bool {
        self.compressed
    }
}

impl Architecture for RiscV {
    fn name(&self) -> &'static str {
        match self.xlen {
            Xlen::Rv32 => "rv32",
            Xlen::Rv64 => "rv64",
        }
    }

    fn decode(&self, memory: &dyn MemoryImage, address: u64) -> Result<Instruction, DecodeError> {
        let bytes = memory
            .available(address)
            .filter(|bytes| !bytes.is_empty())
            .ok_or(DecodeError::Unmapped(address))?;
        let &[lo, hi, ..] = bytes else {
            return Err(DecodeError::Truncated {
                address,
                needed: 2,
                available: bytes.len(),
            });
        };
        let half = u16::from_le_bytes([lo, hi]);

        let size = if half & 0x3 == 0x3 { 4 } else { 2 };
        if size == 2 && !self.compressed {
            return Err(DecodeError::Invalid {
                address,
                raw: u32::from(half),
            });
        }
        let Some(bytes) = bytes.get(..size) else {
            return Err(DecodeError::Truncated {
                address,
                needed: size,
                available: bytes.len(),
            });
        };
        let raw = match *bytes {
            [b0, b1, b2, b3] => u32::from_le_bytes([b0, b1, b2, b3]),
            _ => u32::from(half),
        };

        let decoded = decode(raw, address, self.xlen).ok_or(DecodeError::Invalid { address, raw })?;
        trace!(address = format_args!("{address:#x}"), text = %decoded, "decoded");

        let next = self.xlen.offset(address, i32::from(decoded.size));
        let mut instruction = Instruction::new(address, bytes, decoded.text);
        match decoded.flow {
            Flow::Next => instruction.add_successor(next, SuccessorKind::Normal),
            Flow::Jump(target) => {
                instruction.add_successor(target, SuccessorKind::Jump);
                instruction.set_target(target);
            }
            Flow::Call(target) => {
                instruction.add_successor(target, SuccessorKind::Call);
                instruction.add_successor(next, SuccessorKind::Normal);
                instruction.set_target(target);
            }
            Flow::Branch(target) => {
                instruction.add_successor(target, SuccessorKind::ConditionalTrue);
                instruction.add_successor(next, SuccessorKind::ConditionalFalse);
                instruction.set_target(target);
            }
            Flow::IndirectCall => instruction.add_successor(next, SuccessorKind::Normal),
            Flow::IndirectJump | Flow::Return | Flow::Halt => {}
        }
        Ok(instruction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdis_cfg::{Buffer, MemoryMap};

    fn image(base: u64, bytes: &[u8]) -> MemoryMap {
        let mut memory = MemoryMap::new();
        memory.insert(base, Buffer::new(bytes.to_vec()));
        memory
    }

    fn kinds(instruction: &Instruction) -> Vec<(u64, SuccessorKind)> {
        instruction
            .successors()
            .iter()
            .map(|successor| (successor.address(), successor.kind()))
            .collect()
    }

    #[test]
    fn test_decode_call_successors() {
        // jal ra, 8
        let memory = image(0x1000, &[0xef, 0x00, 0x80, 0x00]);
        let ins = RiscV::new(Xlen::Rv32).decode(&memory, 0x1000).unwrap();
        assert_eq!(ins.size(), 4);
        assert_eq!(ins.description(), "jal ra, 0x1008");
        assert_eq!(ins.target(), Some(0x1008));
        assert_eq!(
            kinds(&ins),
            vec![(0x1008, SuccessorKind::Call), (0x1004, SuccessorKind::Normal)]
        );
    }

    #[test]
    fn test_decode_branch_successors() {
        // c.beqz a0, +4
        let memory = image(0x1000, &[0x11, 0xc1]);
        let ins = RiscV::default().decode(&memory, 0x1000).unwrap();
        assert_eq!(ins.size(), 2);
        assert_eq!(
            kinds(&ins),
            vec![
                (0x1004, SuccessorKind::ConditionalTrue),
                (0x1002, SuccessorKind::ConditionalFalse)
            ]
        );
    }

    #[test]
    fn test_decode_terminal() {
        // ret, c.ebreak
        let memory = image(0, &[0x67, 0x80, 0x00, 0x00, 0x02, 0x90]);
        let arch = RiscV::default();
        assert!(arch.decode(&memory, 0).unwrap().is_terminal());
        assert!(arch.decode(&memory, 4).unwrap().is_terminal());
    }

    #[test]
    fn test_decode_errors() {
        let arch = RiscV::new(Xlen::Rv32);
        // First half of a 32-bit nop at the end of the buffer.
        let memory = image(0x100, &[0x13, 0x00, 0x01]);
        assert_eq!(arch.decode(&memory, 0x200), Err(DecodeError::Unmapped(0x200)));
        assert_eq!(arch.decode(&memory, 0x50), Err(DecodeError::Unmapped(0x50)));
        assert_eq!(
            arch.decode(&memory, 0x100),
            Err(DecodeError::Truncated {
                address: 0x100,
                needed: 4,
                available: 3
            })
        );
        assert_eq!(
            arch.decode(&memory, 0x102),
            Err(DecodeError::Truncated {
                address: 0x102,
                needed: 2,
                available: 1
            })
        );

        let zeros = image(0, &[0, 0]);
        assert_eq!(
            arch.decode(&zeros, 0),
            Err(DecodeError::Invalid { address: 0, raw: 0 })
        );
    }

    #[test]
    fn test_compressed_disabled() {
        let memory = image(0, &[0x01, 0x00]);
        let arch = RiscV::new(Xlen::Rv64).with_compressed(false);
        assert_eq!(
            arch.decode(&memory, 0),
            Err(DecodeError::Invalid { address: 0, raw: 1 })
        );
        assert_eq!(arch.name(), "rv64");
    }
}
