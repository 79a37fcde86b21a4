//! The `Program` — a compiler's input and (on success) its output.
//!
//! Building a `Program` one opcode at a time is the public program-construction
//! API named as an external collaborator in spec.md §1; it is not part of this
//! crate. What lives here is only the shape `compile` reads from and writes to.

use crate::error::OrcError;
use crate::insn::Instruction;
use crate::var::VarTable;

/// Reserved capacity of a program's instruction list.
pub const N_INSNS: usize = 100;

/// An opaque, already-compiled or pre-built native entry point.
///
/// The actual calling convention is backend-specific and out of scope for the
/// core pipeline; we only ever move this pointer around, never call through it
/// ourselves.
pub type NativeFn = unsafe extern "C" fn();

/// A validated program: instructions, variable table, and optional native
/// fallback, plus (after a successful compile) the generated code.
pub struct Program {
    /// Diagnostic name.
    pub name: String,
    pub(crate) insns: Vec<Instruction>,
    pub(crate) vars: VarTable,
    /// Number of `Temp` slots present before any renaming duplicates them.
    pub n_temp_vars: usize,
    /// Pre-built native fallback, invoked when compilation is disabled or fails
    /// recoverably. `None` means "fall back to the emulator" (spec.md §4.1).
    pub backup_func: Option<NativeFn>,

    /// Runnable entry point: `backup_func`, the emulator, or freshly JIT-compiled
    /// code, in that order of preference until compilation succeeds.
    pub code: Option<NativeFn>,
    /// Size in bytes of the generated code, valid only after a successful compile.
    pub code_size: usize,
    /// Nul-terminated assembly text, valid only after a successful compile.
    pub asm_code: Option<String>,
}

impl Program {
    /// Construct a program from an already-built instruction list and variable
    /// table. This is the narrow seam the (external) program-construction API
    /// would call through; it only enforces the fixed-capacity bound named in
    /// spec.md §9.
    pub fn new(
        name: impl Into<String>,
        vars: VarTable,
        n_temp_vars: usize,
        insns: Vec<Instruction>,
    ) -> Result<Self, OrcError> {
        if insns.len() > N_INSNS {
            return Err(OrcError::CapacityExceeded("instruction list"));
        }
        Ok(Program {
            name: name.into(),
            insns,
            vars,
            n_temp_vars,
            backup_func: None,
            code: None,
            code_size: 0,
            asm_code: None,
        })
    }

    pub fn with_backup(mut self, backup: NativeFn) -> Self {
        self.backup_func = Some(backup);
        self
    }

    pub fn n_insns(&self) -> usize {
        self.insns.len()
    }
}
