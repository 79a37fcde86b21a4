//! The compiler context: all scratch state for a single compilation.
//!
//! Grounded on `cranelift_codegen::regalloc::context::Context` — "persistent
//! memory allocations... reused for multiple functions" — except that here a
//! context is created fresh per compilation (spec.md §3 Lifecycle) rather than
//! reused, since Orc programs are small and straight-line.

use crate::asmbuffer::AssemblyBuffer;
use crate::error::ResultCode;
use crate::insn::Instruction;
use crate::label::LabelAllocator;
use crate::regalloc::pool::RegisterPool;
use crate::var::VarTable;

/// One entry in the constant pool, keyed by the canonicalized (splatted) 32-bit
/// value (spec.md §4.7).
#[derive(Clone, Copy, Debug)]
pub struct ConstantPoolEntry {
    pub key: u32,
    pub use_count: u32,
    pub alloc_reg: u16,
}

/// Per-compilation scratch state: owned copies of the program's instructions and
/// variables (so passes rewrite freely without touching the source program),
/// register-pool state, the emitted-assembly buffer, and the error/result
/// channel.
pub struct CompilerContext {
    pub(crate) insns: Vec<Instruction>,
    pub(crate) vars: VarTable,
    pub n_temp_vars: usize,
    /// Number of duplicate `Temp`s created by renaming (spec.md §4.6).
    pub n_dup_vars: usize,

    pub regs: RegisterPool,
    /// Register offset at which this target's vector/data pool begins (copied
    /// from `Target::data_register_offset` during `compiler_init`).
    pub data_register_offset: u16,
    /// Scratch register used for constant loads, set by `compiler_init`.
    pub tmpreg: u16,
    /// Does this target want mask/offset/aligned-data registers allocated for
    /// every `Src`?
    pub need_mask_regs: bool,
    /// Does this target want an implicit loop-counter register allocated?
    pub alloc_loop_counter: bool,
    /// The loop-counter register, once allocated.
    pub loop_counter: Option<u16>,

    pub(crate) constants: Vec<ConstantPoolEntry>,

    pub asm: AssemblyBuffer,
    pub labels: LabelAllocator,

    /// Latched error flag: once set, the driver aborts after the current pass
    /// finishes (spec.md §4.4: the liveness pass keeps going to report as many
    /// diagnostics as possible).
    pub error: bool,
    pub result: ResultCode,
}

impl CompilerContext {
    /// Fresh, zero-initialized context owning deep copies of `insns`/`vars`. Every
    /// register starts `valid` by default; the target's `compiler_init` then
    /// prunes `valid`/`save` down to the real ISA (spec.md §4.1 step 4).
    pub fn new(insns: Vec<Instruction>, vars: VarTable, n_temp_vars: usize) -> Self {
        CompilerContext {
            insns,
            vars,
            n_temp_vars,
            n_dup_vars: 0,
            regs: RegisterPool::default(),
            data_register_offset: crate::regalloc::pool::GP_BASE + crate::regalloc::pool::POOL_WIDTH,
            tmpreg: 0,
            need_mask_regs: false,
            alloc_loop_counter: false,
            loop_counter: None,
            constants: Vec::new(),
            asm: AssemblyBuffer::new(),
            labels: LabelAllocator::new(),
            error: false,
            result: ResultCode::Ok,
        }
    }

    pub fn insns(&self) -> &[Instruction] {
        &self.insns
    }

    pub fn insns_mut(&mut self) -> &mut [Instruction] {
        &mut self.insns
    }

    pub fn vars(&self) -> &VarTable {
        &self.vars
    }

    pub fn vars_mut(&mut self) -> &mut VarTable {
        &mut self.vars
    }

    /// Record a pass failure: latch `error`, escalate `result`, and log a
    /// diagnostic. Mirrors `ORC_COMPILER_ERROR(ctx, fmt, ...)` from spec.md §6.
    pub fn record_error(&mut self, code: ResultCode, args: std::fmt::Arguments<'_>) {
        self.error = true;
        self.result.escalate(code);
        log::error!("{}", args);
    }
}
