//! The validator (`check_sizes`, spec.md §4.2).
//!
//! Aborts on the first error found — unlike the liveness pass, there is no value
//! in reporting more than one size mismatch, since later instructions' operand
//! resolution assumes earlier ones were well-formed.

use crate::context::CompilerContext;
use crate::error::ResultCode;
use crate::var::VarKind;

/// Check every instruction's operand sizes against its opcode's static signature.
/// Returns `true` if the program is well-formed.
pub fn check_sizes(ctx: &mut CompilerContext) -> bool {
    for j in 0..ctx.insns.len() {
        let insn = &ctx.insns[j];
        let opcode = insn.opcode;
        let name = opcode.0.name;

        for (slot, &dest) in insn.dest_args.iter().enumerate() {
            let declared = insn.dest_size(slot);
            if declared == 0 {
                continue;
            }
            let actual = ctx.vars[dest].size;
            if actual != declared {
                ctx.record_error(
                    ResultCode::UnknownParse,
                    format_args!(
                        "{}: dest slot {} expects size {}, found size {}",
                        name, slot, declared, actual
                    ),
                );
                return false;
            }
        }

        for (slot, &src) in insn.src_args.iter().enumerate() {
            let declared = insn.src_size(slot);
            if declared == 0 {
                continue;
            }
            let var = &ctx.vars[src];
            let is_broadcast = matches!(var.kind, VarKind::Const(_) | VarKind::Param);
            if !is_broadcast && var.size != declared {
                ctx.record_error(
                    ResultCode::UnknownParse,
                    format_args!(
                        "{}: src slot {} expects size {}, found size {}",
                        name, slot, declared, var.size
                    ),
                );
                return false;
            }
        }

        if opcode.0.is_scalar() {
            for (slot, &src) in insn.src_args.iter().enumerate().skip(1) {
                let var = &ctx.vars[src];
                if !matches!(var.kind, VarKind::Const(_) | VarKind::Param) {
                    ctx.record_error(
                        ResultCode::UnknownParse,
                        format_args!(
                            "{}: scalar opcode requires src slot {} to be const or param",
                            name, slot
                        ),
                    );
                    return false;
                }
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use crate::testutil::*;
    use crate::var::Variable;

    use super::*;

    #[test]
    fn size_mismatch_is_rejected() {
        let mut vars = crate::var::VarTable::new();
        let s1 = vars.push(Variable::src("S1", 2)).unwrap();
        let d1 = vars.push(Variable::dest("D1", 4)).unwrap();
        let insns = vec![crate::insn::Instruction::new(copyw(), [s1], [d1])];
        let mut ctx = CompilerContext::new(insns, vars, 0);
        assert!(!check_sizes(&mut ctx));
        assert_eq!(ctx.result, ResultCode::UnknownParse);
    }

    #[test]
    fn const_src_is_exempt_from_size_check() {
        let mut vars = crate::var::VarTable::new();
        let c1 = vars.push(Variable::constant("C1", 4, 7)).unwrap();
        let d1 = vars.push(Variable::dest("D1", 2)).unwrap();
        let insns = vec![crate::insn::Instruction::new(copyw(), [c1], [d1])];
        let mut ctx = CompilerContext::new(insns, vars, 0);
        assert!(check_sizes(&mut ctx));
    }

    #[test]
    fn scalar_opcode_rejects_non_const_second_src() {
        let mut vars = crate::var::VarTable::new();
        let s1 = vars.push(Variable::src("S1", 2)).unwrap();
        let s2 = vars.push(Variable::src("S2", 2)).unwrap();
        let d1 = vars.push(Variable::dest("D1", 2)).unwrap();
        let insns = vec![crate::insn::Instruction::new(mulw_scalar(), [s1, s2], [d1])];
        let mut ctx = CompilerContext::new(insns, vars, 0);
        assert!(!check_sizes(&mut ctx));
        assert_eq!(ctx.result, ResultCode::UnknownParse);
    }
}
