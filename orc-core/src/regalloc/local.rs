//! Local (per-instruction) register allocation and the chaining optimization
//! (`rewrite_vars2`, spec.md §4.5 local pass).
//!
//! `Variable::alloc` here is the *data* register holding a value during the
//! instructions that use it — distinct from a `Src`/`Dest`'s pointer register,
//! which is allocated once, globally, to address memory. A `Src`/`Dest` still has
//! a local-lifetime data register: it's born at `first_use` (typically where its
//! value is loaded from, or about to be stored to, memory) and dies at
//! `last_use`, exactly like a `Temp`.

use crate::context::CompilerContext;
use crate::error::ResultCode;
use crate::regalloc::pool::NO_REG;
use crate::var::VarIndex;

/// Run the local allocation pass over every instruction in order. Returns `true`
/// if no register pool was exhausted.
pub fn rewrite_vars2(ctx: &mut CompilerContext) -> bool {
    for j in 0..ctx.insns.len() {
        if !chain(ctx, j) {
            return false;
        }
        clear_immediate_sentinel(ctx, j);
        if !births(ctx, j) {
            return false;
        }
        deaths(ctx, j);
    }
    debug_assert!(
        ctx.regs.fully_released(),
        "register pool should be fully released after the last instruction"
    );
    !ctx.error
}

/// If this instruction is non-accumulator and has exactly one destination, and
/// its first source dies here, let the destination inherit the source's
/// register instead of allocating a fresh one.
fn chain(ctx: &mut CompilerContext, j: usize) -> bool {
    let insn = &ctx.insns[j];
    if insn.opcode.0.is_accumulator() {
        return true;
    }
    if insn.dest_size(1) != 0 {
        return true;
    }
    let (Some(&src1), Some(&dest)) = (insn.src_args.first(), insn.dest_args.first()) else {
        return true;
    };

    if ctx.vars[src1].last_use != j as i32 {
        return true;
    }

    // Born and dies in the same instruction: give it a register before we can
    // chain through it.
    if ctx.vars[src1].first_use == j as i32 && ctx.vars[src1].alloc == NO_REG {
        let reg = ctx.regs.allocate(true, ctx.data_register_offset);
        if reg == NO_REG {
            ctx.record_error(
                ResultCode::UnknownCompile,
                format_args!("register overflow chaining `{}`", ctx.vars[src1].name),
            );
            return false;
        }
        ctx.vars[src1].alloc = reg;
    }

    let reg = ctx.vars[src1].alloc;
    // Bump the refcount so the shared register stays live through dest's
    // lifetime too; death processing will release it once for each of src1 and
    // dest.
    ctx.regs.retain(reg);
    ctx.vars[dest].alloc = reg;
    true
}

/// `alloc == 1` on a source's second operand is a sentinel from upstream
/// meaning "this is an inline immediate, don't load it into a register" — clear
/// it so later passes don't mistake it for a real allocation.
fn clear_immediate_sentinel(ctx: &mut CompilerContext, j: usize) {
    let insn = &ctx.insns[j];
    let Some(&second) = insn.src_args.get(1) else {
        return;
    };
    if ctx.vars[second].alloc == 1 {
        ctx.vars[second].alloc = 0;
    }
}

/// Allocate a register for every variable born at instruction `j` that doesn't
/// already have one (births are global-table scans because the spec's liveness
/// bookkeeping is per-variable, not per-instruction-operand).
fn births(ctx: &mut CompilerContext, j: usize) -> bool {
    for i in 0..ctx.vars().len() {
        let idx = VarIndex::new(i);
        if ctx.vars[idx].first_use != j as i32 || ctx.vars[idx].alloc != NO_REG {
            continue;
        }
        let reg = ctx.regs.allocate(true, ctx.data_register_offset);
        if reg == NO_REG {
            let name = ctx.vars[idx].name.clone();
            ctx.record_error(
                ResultCode::UnknownCompile,
                format_args!("register overflow allocating `{}`", name),
            );
            return false;
        }
        ctx.vars[idx].alloc = reg;
    }
    true
}

/// Release the register of every variable that dies at instruction `j`.
fn deaths(ctx: &mut CompilerContext, j: usize) {
    for i in 0..ctx.vars().len() {
        let idx = VarIndex::new(i);
        if ctx.vars[idx].last_use == j as i32 {
            ctx.regs.release(ctx.vars[idx].alloc);
        }
    }
}
