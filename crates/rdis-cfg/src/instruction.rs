//! Decoded instruction model.

use std::cmp::Ordering;
use std::fmt;

use rdis_graph::{Graph, List};

/// How control reaches a successor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SuccessorKind {
    /// Fallthrough to the next instruction.
    Normal,
    /// Unconditional jump.
    Jump,
    /// Taken side of a conditional branch.
    ConditionalTrue,
    /// Not-taken side of a conditional branch.
    ConditionalFalse,
    /// Call target. The return lands on a separate `Normal` successor.
    Call,
}

impl SuccessorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Jump => "jump",
            Self::ConditionalTrue => "true",
            Self::ConditionalFalse => "false",
            Self::Call => "call",
        }
    }
}

impl fmt::Display for SuccessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A possible next address after an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Successor {
    address: u64,
    kind: SuccessorKind,
}

impl Successor {
    #[must_use]
    pub const fn new(address: u64, kind: SuccessorKind) -> Self {
        Self { address, kind }
    }

    #[must_use]
    pub const fn address(&self) -> u64 {
        self.address
    }

    #[must_use]
    pub const fn kind(&self) -> SuccessorKind {
        self.kind
    }

    #[must_use]
    pub const fn is_call(&self) -> bool {
        matches!(self.kind, SuccessorKind::Call)
    }
}

/// Control flow graph over instructions: nodes keyed by address, edges
/// carrying the successor that produced them.
pub type InstructionGraph = Graph<Instruction, Successor>;

/// One decoded instruction.
///
/// Address and bytes are fixed at decode time. Description, comment and
/// target can be annotated afterwards. Instructions compare by address.
#[derive(Clone, Debug)]
pub struct Instruction {
    address: u64,
    bytes: Vec<u8>,
    description: String,
    comment: Option<String>,
    target: Option<u64>,
    successors: List<Successor>,
}

impl Instruction {
    #[must_use]
    pub fn new(address: u64, bytes: &[u8], description: impl Into<String>) -> Self {
        Self {
            address,
            bytes: bytes.to_vec(),
            description: description.into(),
            comment: None,
            target: None,
            successors: List::new(),
        }
    }

    /// Builder form of [`add_successor`](Self::add_successor).
    #[must_use]
    pub fn with_successor(mut self, address: u64, kind: SuccessorKind) -> Self {
        self.add_successor(address, kind);
        self
    }

    #[must_use]
    pub const fn address(&self) -> u64 {
        self.address
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Branch or call target shown alongside the description, if any.
    #[must_use]
    pub const fn target(&self) -> Option<u64> {
        self.target
    }

    #[must_use]
    pub const fn successors(&self) -> &List<Successor> {
        &self.successors
    }

    pub fn add_successor(&mut self, address: u64, kind: SuccessorKind) {
        self.successors.append(Successor::new(address, kind));
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Set the comment. An empty comment clears it.
    pub fn set_comment(&mut self, comment: &str) {
        self.comment = (!comment.is_empty()).then(|| comment.to_string());
    }

    pub const fn set_target(&mut self, target: u64) {
        self.target = Some(target);
    }

    /// True if any successor is a call.
    #[must_use]
    pub fn is_call(&self) -> bool {
        self.successors.iter().any(Successor::is_call)
    }

    /// True for instructions control never leaves by a known edge (returns,
    /// halts, indirect jumps).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.successors.is_empty()
    }
}

impl PartialEq for Instruction {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for Instruction {}

impl PartialOrd for Instruction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Instruction {
    fn cmp(&self, other: &Self) -> Ordering {
        self.address.cmp(&other.address)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x} ", self.address)?;
        for byte in &self.bytes {
            write!(f, " {byte:02x}")?;
        }
        write!(f, "  {}", self.description)?;
        if let Some(comment) = &self.comment {
            write!(f, " ; {comment}")?;
        }
        Ok(())
    }
}
