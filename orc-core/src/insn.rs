//! Instructions: one opcode invocation over operand variables.

use smallvec::SmallVec;

use crate::opcode::{OpcodeRef, N_DEST, N_SRC};
use crate::rule::Rule;
use crate::var::VarIndex;

/// Opaque index into a program's or context's instruction list.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct InsnIndex(u32);

impl InsnIndex {
    pub fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize);
        InsnIndex(index as u32)
    }
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for InsnIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "insn{}", self.0)
    }
}

/// One instruction: an opcode plus its bound operand variables.
///
/// `rule` starts `None` and is filled in by `assign_rules` (spec.md §4.3); nothing
/// before that pass may assume it is populated.
#[derive(Clone, Debug)]
pub struct Instruction {
    pub opcode: OpcodeRef,
    pub src_args: SmallVec<[VarIndex; N_SRC]>,
    pub dest_args: SmallVec<[VarIndex; N_DEST]>,
    pub rule: Option<Rule>,
    /// Set by the liveness pass when a `Src` slot reads a `Dest` variable: the
    /// backend must emit a load from the destination's pointer before using it
    /// (spec.md §4.4).
    pub load_dest: bool,
}

impl Instruction {
    pub fn new(
        opcode: OpcodeRef,
        src_args: impl IntoIterator<Item = VarIndex>,
        dest_args: impl IntoIterator<Item = VarIndex>,
    ) -> Self {
        Instruction {
            opcode,
            src_args: src_args.into_iter().collect(),
            dest_args: dest_args.into_iter().collect(),
            rule: None,
            load_dest: false,
        }
    }

    pub fn src_size(&self, slot: usize) -> u8 {
        self.opcode.0.src_size.get(slot).copied().unwrap_or(0)
    }

    pub fn dest_size(&self, slot: usize) -> u8 {
        self.opcode.0.dest_size.get(slot).copied().unwrap_or(0)
    }
}
