//! The driver: sequences every pass and hands off to a backend (spec.md §4.1).

use log::{debug, trace, warn};

use crate::config::CompilerFlags;
use crate::context::CompilerContext;
use crate::error::ResultCode;
use crate::liveness::rewrite_vars;
use crate::program::Program;
use crate::regalloc::{global_reg_alloc, rewrite_vars2};
use crate::rules::assign_rules;
use crate::target::{CodeMemoryAllocator, Target, TargetFlags};
use crate::validate::check_sizes;

/// Compile `program` against `target`, in-place, returning the outcome.
///
/// `codemem` is the separate, narrower collaborator that installs real
/// executable memory (spec.md §6); pass `None` to exercise the pipeline
/// without one, as this crate's own tests and `orcc --dump` do.
pub fn compile(
    program: &mut Program,
    target: Option<&dyn Target>,
    codemem: Option<&dyn CodeMemoryAllocator>,
    flags: CompilerFlags,
) -> ResultCode {
    trace!("compile: {} starting", program.name);

    // Step 1: default the runnable entry point to the backup, leaving the
    // program callable even if everything below fails. `None` here means "fall
    // back to the emulator", which lives outside this crate.
    program.code = program.backup_func;

    // Step 2: backup present + compilation disabled by flag.
    if program.backup_func.is_some() && flags.disable_with_backup {
        debug!(
            "compile: {} skipped (ORC_CODE=backup, backup installed)",
            program.name
        );
        return ResultCode::UnknownCompile;
    }

    // Step 3: a target is required.
    let Some(target) = target else {
        debug!("compile: {} has no target", program.name);
        return ResultCode::UnknownCompile;
    };

    // Step 4: deep-copy into a fresh context; every register starts valid, and
    // the target's compiler_init prunes valid/save down to the real ISA.
    let mut ctx = CompilerContext::new(
        program.insns.clone(),
        program.vars.clone(),
        program.n_temp_vars,
    );
    target.compiler_init(&mut ctx);

    // Step 5: run the passes in order, stopping at the first failure.
    // Target-specific rule-selection flags aren't threaded through a Program
    // yet; 0 means "no preference", the only value any registered target
    // currently interprets.
    let target_flags: TargetFlags = 0;
    let passes_ok = check_sizes(&mut ctx)
        && assign_rules(&mut ctx, target, target_flags)
        && rewrite_vars(&mut ctx)
        && global_reg_alloc(&mut ctx)
        && rewrite_vars2(&mut ctx)
        && codemem.map_or(true, |c| c.allocate_codemem(&mut ctx));

    if passes_ok {
        target.compile(&mut ctx);
    }

    // Step 6: cleanup on error — the context (and any duplicated-name strings
    // it owns) is simply dropped at the end of this function.
    if !passes_ok || ctx.error {
        let result = ctx.result.promote_if_ok();
        warn!("compile: {} failed: {}", program.name, result);
        return result;
    }

    // Step 7: publish the generated output.
    let code_size = ctx.asm.len();
    program.code_size = code_size;
    program.asm_code = Some(ctx.asm.into_string());
    trace!("compile: {} succeeded, {} bytes of assembly text", program.name, code_size);
    ResultCode::Ok
}

#[cfg(test)]
mod tests {
    use crate::insn::Instruction;
    use crate::testutil::{copyw, TestTarget};
    use crate::var::{VarTable, Variable};

    use super::*;

    #[test]
    fn smallest_valid_program_compiles_end_to_end() {
        let mut vars = VarTable::new();
        let s1 = vars.push(Variable::src("S1", 2)).unwrap();
        let d1 = vars.push(Variable::dest("D1", 2)).unwrap();
        let insns = vec![Instruction::new(copyw(), [s1], [d1])];
        let mut program = Program::new("smallest", vars, 0, insns).unwrap();

        let target = TestTarget::new();
        let result = compile(&mut program, Some(&target), None, CompilerFlags::default());

        assert_eq!(result, ResultCode::Ok);
        assert!(program.asm_code.unwrap().contains("copyw"));
    }

    #[test]
    fn missing_target_is_recoverable() {
        let vars = VarTable::new();
        let mut program = Program::new("no-target", vars, 0, vec![]).unwrap();
        let result = compile(&mut program, None, None, CompilerFlags::default());
        assert_eq!(result, ResultCode::UnknownCompile);
    }

    #[test]
    fn malformed_program_is_fatal() {
        let mut vars = VarTable::new();
        let d1 = vars.push(Variable::dest("D1", 2)).unwrap();
        let t1 = vars.push(Variable::temp("T1", 2)).unwrap();
        // T1 is read before it's ever defined.
        let insns = vec![Instruction::new(copyw(), [t1], [d1])];
        let mut program = Program::new("bad", vars, 1, insns).unwrap();
        let target = TestTarget::new();
        let result = compile(&mut program, Some(&target), None, CompilerFlags::default());
        assert_eq!(result, ResultCode::UnknownParse);
    }

    #[test]
    fn backup_disable_flag_skips_compilation() {
        unsafe extern "C" fn noop() {}
        let vars = VarTable::new();
        let mut program = Program::new("has-backup", vars, 0, vec![])
            .unwrap()
            .with_backup(noop);
        let target = TestTarget::new();
        let flags = CompilerFlags {
            disable_with_backup: true,
            debug: false,
        };
        let result = compile(&mut program, Some(&target), None, flags);
        assert_eq!(result, ResultCode::UnknownCompile);
        assert!(program.code.is_some());
    }
}
