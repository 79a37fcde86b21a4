//! The rule binder (`assign_rules`, spec.md §4.3).

use crate::context::CompilerContext;
use crate::error::ResultCode;
use crate::target::{Target, TargetFlags};

/// Bind a target-specific rule to every instruction. Returns `true` if every
/// instruction got a rule; absence of a rule is a recoverable
/// (`UnknownCompile`) error, since the interpreter can still run the program.
pub fn assign_rules(ctx: &mut CompilerContext, target: &dyn Target, flags: TargetFlags) -> bool {
    for j in 0..ctx.insns.len() {
        let opcode = ctx.insns[j].opcode;
        match target.get_rule(opcode, flags) {
            Some(rule) => ctx.insns[j].rule = Some(rule),
            None => {
                ctx.record_error(
                    ResultCode::UnknownCompile,
                    format_args!("no rule for opcode `{}` on target `{}`", opcode.0.name, target.name()),
                );
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use crate::testutil::{addw, copyw, TestTarget};
    use crate::var::{VarTable, Variable};

    use super::*;

    #[test]
    fn binds_a_rule_for_every_instruction() {
        let mut vars = VarTable::new();
        let s1 = vars.push(Variable::src("S1", 2)).unwrap();
        let d1 = vars.push(Variable::dest("D1", 2)).unwrap();
        let insns = vec![crate::insn::Instruction::new(copyw(), [s1], [d1])];
        let mut ctx = CompilerContext::new(insns, vars, 0);
        let target = TestTarget::new();
        assert!(assign_rules(&mut ctx, &target, 0));
        assert!(ctx.insns[0].rule.is_some());
    }

    #[test]
    fn missing_rule_is_recoverable() {
        let mut vars = VarTable::new();
        let s1 = vars.push(Variable::src("S1", 2)).unwrap();
        let s2 = vars.push(Variable::src("S2", 2)).unwrap();
        let d1 = vars.push(Variable::dest("D1", 2)).unwrap();
        // addw is a real opcode, but construct a distinct opcode with no rule by
        // reusing addw's operand shape against a target that only knows "test".
        let insns = vec![crate::insn::Instruction::new(addw(), [s1, s2], [d1])];
        let mut ctx = CompilerContext::new(insns, vars, 0);
        struct EmptyTarget;
        impl Target for EmptyTarget {
            fn name(&self) -> &'static str {
                "empty"
            }
            fn data_register_offset(&self) -> u16 {
                64
            }
            fn compiler_init(&self, _ctx: &mut CompilerContext) {}
            fn get_rule(&self, _opcode: crate::opcode::OpcodeRef, _flags: TargetFlags) -> Option<crate::rule::Rule> {
                None
            }
            fn load_constant(&self, _ctx: &mut CompilerContext, _reg: u16, _size: u8, _value: i64) {}
            fn compile(&self, _ctx: &mut CompilerContext) {}
        }
        let target = EmptyTarget;
        assert!(!assign_rules(&mut ctx, &target, 0));
        assert_eq!(ctx.result, ResultCode::UnknownCompile);
    }
}
