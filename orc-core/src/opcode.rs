//! Static opcode descriptors.
//!
//! These describe an opcode's fixed shape — slot sizes and flags — independent of
//! any particular instruction or target. Opcode-table initialization (building the
//! actual catalog of opcodes an embedder supports, each with its interpreter
//! emulation function) is an external collaborator's job; this module only defines
//! the descriptor shape the rest of the pipeline reads.

use bitflags::bitflags;

/// Maximum source operand slots an instruction can carry.
pub const N_SRC: usize = 3;
/// Maximum destination operand slots an instruction can carry.
pub const N_DEST: usize = 2;

bitflags! {
    /// Static flags on an opcode, independent of any instantiation.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct OpcodeFlags: u8 {
        /// This opcode's destination persists across loop iterations and is only
        /// written by accumulator-flagged opcodes (spec.md §3 invariant).
        const ACCUMULATOR = 1 << 0;
        /// All source slots with index >= 1 must be `Const` or `Param` (spec.md
        /// §4.2).
        const SCALAR = 1 << 1;
    }
}

/// Interpreter emulation hook. Not invoked by the compiler pipeline itself; carried
/// on the descriptor only so a target's `compiler_init`/rule lookup can see it and
/// so the (external) interpreter has one place to find it.
pub type EmulateFn = fn(&mut [i64]);

/// Static, read-only description of one opcode.
///
/// Instances are expected to live in a process-wide, externally built table (the
/// opcode-table initialization collaborator named in spec.md §1); the pipeline only
/// ever holds `&'static StaticOpcode` references and compares them by pointer
/// identity (spec.md §4.3: "rule lookup is by opcode descriptor identity, not by
/// name").
#[derive(Debug)]
pub struct StaticOpcode {
    /// Diagnostic name (`"copyw"`, `"addw"`, `"mulw"`, ...).
    pub name: &'static str,
    /// Per-slot source element sizes in bytes; `0` means the slot is unused.
    pub src_size: [u8; N_SRC],
    /// Per-slot destination element sizes in bytes; `0` means the slot is unused.
    pub dest_size: [u8; N_DEST],
    /// Static flags.
    pub flags: OpcodeFlags,
    /// Interpreter emulation function, used only by the (external) interpreter.
    pub emulate: Option<EmulateFn>,
}

impl StaticOpcode {
    /// Number of source slots this opcode actually uses.
    pub fn n_src(&self) -> usize {
        self.src_size.iter().take_while(|&&s| s != 0).count()
    }

    /// Number of destination slots this opcode actually uses.
    pub fn n_dest(&self) -> usize {
        self.dest_size.iter().take_while(|&&s| s != 0).count()
    }

    pub fn is_accumulator(&self) -> bool {
        self.flags.contains(OpcodeFlags::ACCUMULATOR)
    }

    pub fn is_scalar(&self) -> bool {
        self.flags.contains(OpcodeFlags::SCALAR)
    }
}

/// A reference to a static opcode descriptor, compared by identity.
///
/// Wrapping the reference (rather than comparing `&'static StaticOpcode` directly
/// everywhere) gives us a single place to define "identity" as pointer equality,
/// matching spec.md §4.3.
#[derive(Clone, Copy)]
pub struct OpcodeRef(pub &'static StaticOpcode);

impl PartialEq for OpcodeRef {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}
impl Eq for OpcodeRef {}

impl std::fmt::Debug for OpcodeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.name)
    }
}
