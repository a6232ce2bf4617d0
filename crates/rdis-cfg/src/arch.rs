use crate::{DecodeError, Instruction, MemoryImage};

/// Decodes one instruction of some instruction set.
///
/// Decoding must be a pure function of the memory image and the address. The
/// returned instruction carries its successors:
/// - conditional branches emit a `ConditionalTrue`/`ConditionalFalse` pair
/// - calls emit a `Call` successor plus a `Normal` fallthrough
/// - unconditional transfers emit exactly one successor
/// - returns and halts emit none
pub trait Architecture {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Decode the instruction at `address`.
    ///
    /// # Errors
    ///
    /// A [`DecodeError`] when `address` is unmapped, the mapped bytes end
    /// before the instruction does, or the encoding is not recognized.
    fn decode(&self, memory: &dyn MemoryImage, address: u64) -> Result<Instruction, DecodeError>;
}

impl<F> Architecture for F
where
    F: Fn(&dyn MemoryImage, u64) -> Result<Instruction, DecodeError>,
{
    fn name(&self) -> &'static str {
        "fn"
    }

    fn decode(&self, memory: &dyn MemoryImage, address: u64) -> Result<Instruction, DecodeError> {
        self(memory, address)
    }
}
