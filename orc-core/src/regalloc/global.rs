//! Global register allocation (`global_reg_alloc`, spec.md §4.5).
//!
//! Assigns fixed registers to every variable whose lifetime spans the whole
//! program: `Const`/`Param`/`Accumulator` each get one vector register; `Src`/
//! `Dest` each get a pointer register (plus, for `Src`, the mask/offset/
//! aligned-data bundle if the target wants it). `Temp`s are untouched here —
//! they're handled per-instruction by the local pass.
//!
//! Every allocation here goes through `RegisterPool::reserve`, not `allocate`:
//! these registers live for the whole program and are never released, so
//! leaving a standing refcount on them would make `fully_released` (the local
//! pass's end-of-compile invariant) permanently false.

use log::debug;

use crate::context::CompilerContext;
use crate::error::ResultCode;
use crate::regalloc::pool::NO_REG;
use crate::var::VarKind;

/// Allocate registers for every variable with a whole-program lifetime, in
/// variable-table order (allocation is a deterministic function of target
/// register masks, instruction order, and prior allocations — spec.md §5).
pub fn global_reg_alloc(ctx: &mut CompilerContext) -> bool {
    let data_offset = ctx.data_register_offset;
    let n_vars = ctx.vars().len();

    for i in 0..n_vars {
        let idx = crate::var::VarIndex::new(i);
        let name = ctx.vars()[idx].name.clone();

        match ctx.vars()[idx].kind.clone() {
            VarKind::Const(_) | VarKind::Param | VarKind::Accumulator => {
                let reg = ctx.regs.reserve(true, data_offset);
                if reg == NO_REG {
                    fail_overflow(ctx, "vector", &name);
                    return false;
                }
                ctx.vars_mut()[idx].alloc = reg;
            }
            VarKind::Src(_) => {
                let ptr = ctx.regs.reserve(false, data_offset);
                if ptr == NO_REG {
                    fail_overflow(ctx, "gp", &name);
                    return false;
                }
                if ctx.need_mask_regs {
                    let mask = ctx.regs.reserve(true, data_offset);
                    let offset = ctx.regs.reserve(false, data_offset);
                    let aligned = ctx.regs.reserve(true, data_offset);
                    if mask == NO_REG || offset == NO_REG || aligned == NO_REG {
                        fail_overflow(ctx, "vector", &name);
                        return false;
                    }
                    let p = ctx.vars_mut()[idx].pointer_regs_mut().unwrap();
                    p.ptr_register = ptr;
                    p.mask = mask;
                    p.ptr_offset = offset;
                    p.aligned_data = aligned;
                } else {
                    ctx.vars_mut()[idx].pointer_regs_mut().unwrap().ptr_register = ptr;
                }
            }
            VarKind::Dest(_) => {
                let ptr = ctx.regs.reserve(false, data_offset);
                if ptr == NO_REG {
                    fail_overflow(ctx, "gp", &name);
                    return false;
                }
                ctx.vars_mut()[idx].pointer_regs_mut().unwrap().ptr_register = ptr;
            }
            VarKind::Temp => {}
        }
    }

    if ctx.alloc_loop_counter && !ctx.error {
        let reg = ctx.regs.reserve(false, data_offset);
        if reg == NO_REG {
            forgive_loop_counter_exhaustion(ctx);
        } else {
            ctx.loop_counter = Some(reg);
        }
    }

    !ctx.error
}

fn fail_overflow(ctx: &mut CompilerContext, pool: &str, var_name: &str) {
    ctx.record_error(
        ResultCode::UnknownCompile,
        format_args!("register overflow in {} pool allocating `{}`", pool, var_name),
    );
}

/// A historical quirk (spec.md §4.5, §9): if the loop-counter allocation alone
/// exhausts its pool, clear the error and force `Ok` rather than fail the whole
/// compile. At least one backend relies on being able to link without an
/// explicit loop counter when registers are tight; this is the single site that
/// does, so don't reuse this helper anywhere else.
fn forgive_loop_counter_exhaustion(ctx: &mut CompilerContext) {
    debug!("loop counter allocation overflowed; forgiving per the historical quirk");
    ctx.error = false;
    ctx.result = ResultCode::Ok;
    ctx.loop_counter = None;
}

#[cfg(test)]
mod tests {
    use crate::testutil::TestTarget;
    use crate::var::{VarTable, Variable};

    use super::*;

    fn init(ctx: &mut CompilerContext, target: &TestTarget) {
        use crate::target::Target;
        target.compiler_init(ctx);
    }

    #[test]
    fn const_param_and_accumulator_get_vector_registers() {
        let mut vars = VarTable::new();
        let c1 = vars.push(Variable::constant("C1", 2, 1)).unwrap();
        let p1 = vars.push(Variable::param("P1", 2)).unwrap();
        let a1 = vars.push(Variable::accumulator("A1", 2)).unwrap();
        let mut ctx = CompilerContext::new(vec![], vars, 0);
        let target = TestTarget::new();
        init(&mut ctx, &target);

        assert!(global_reg_alloc(&mut ctx));
        assert_ne!(ctx.vars()[c1].alloc, NO_REG);
        assert_ne!(ctx.vars()[p1].alloc, NO_REG);
        assert_ne!(ctx.vars()[a1].alloc, NO_REG);
    }

    #[test]
    fn src_and_dest_get_pointer_registers() {
        let mut vars = VarTable::new();
        let s1 = vars.push(Variable::src("S1", 2)).unwrap();
        let d1 = vars.push(Variable::dest("D1", 2)).unwrap();
        let mut ctx = CompilerContext::new(vec![], vars, 0);
        let target = TestTarget::new();
        init(&mut ctx, &target);

        assert!(global_reg_alloc(&mut ctx));
        assert_ne!(ctx.vars()[s1].pointer_regs().unwrap().ptr_register, NO_REG);
        assert_ne!(ctx.vars()[d1].pointer_regs().unwrap().ptr_register, NO_REG);
    }
}
