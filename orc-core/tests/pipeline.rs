//! End-to-end driver tests against the in-tree test target, covering each of
//! the compiler's testable scenarios.

use orc_core::config::CompilerFlags;
use orc_core::error::ResultCode;
use orc_core::insn::Instruction;
use orc_core::program::Program;
use orc_core::testutil::{accsumw, copyw, mulw_scalar, TestTarget};
use orc_core::var::{VarTable, Variable};

fn compile_with_test_target(program: &mut Program) -> ResultCode {
    let target = TestTarget::new();
    orc_core::compile(program, Some(&target), None, CompilerFlags::default())
}

#[test]
fn scenario_1_smallest_valid_program() {
    let mut vars = VarTable::new();
    let s1 = vars.push(Variable::src("S1", 2)).unwrap();
    let d1 = vars.push(Variable::dest("D1", 2)).unwrap();
    let insns = vec![Instruction::new(copyw(), [s1], [d1])];
    let mut program = Program::new("scenario1", vars, 0, insns).unwrap();

    let result = compile_with_test_target(&mut program);

    assert_eq!(result, ResultCode::Ok);
    assert!(program.code_size > 0);
    assert!(program.asm_code.is_some());
}

#[test]
fn scenario_2_temp_reuse_forces_duplicate() {
    // Rename bookkeeping itself is unit-tested in liveness.rs; here we only
    // check that the whole driver still succeeds end to end around it.
    let mut vars = VarTable::new();
    let s1 = vars.push(Variable::src("S1", 2)).unwrap();
    let d1 = vars.push(Variable::dest("D1", 2)).unwrap();
    let t1 = vars.push(Variable::temp("T1", 2)).unwrap();
    let insns = vec![
        Instruction::new(copyw(), [s1], [t1]),
        Instruction::new(orc_core::testutil::addw(), [t1, s1], [t1]),
        Instruction::new(copyw(), [t1], [d1]),
    ];
    let mut program = Program::new("scenario2", vars, 1, insns).unwrap();

    let result = compile_with_test_target(&mut program);

    assert_eq!(result, ResultCode::Ok);
}

#[test]
fn scenario_3_scalar_opcode_rejects_non_const_src2() {
    let mut vars = VarTable::new();
    let s1 = vars.push(Variable::src("S1", 2)).unwrap();
    let s2 = vars.push(Variable::src("S2", 2)).unwrap();
    let d1 = vars.push(Variable::dest("D1", 2)).unwrap();
    let insns = vec![Instruction::new(mulw_scalar(), [s1, s2], [d1])];
    let mut program = Program::new("scenario3", vars, 0, insns).unwrap();

    let result = compile_with_test_target(&mut program);

    assert_eq!(result, ResultCode::UnknownParse);
}

#[test]
fn scenario_4_chaining_hit_shares_register() {
    let mut vars = VarTable::new();
    let s1 = vars.push(Variable::src("S1", 2)).unwrap();
    let d1 = vars.push(Variable::dest("D1", 2)).unwrap();
    let insns = vec![Instruction::new(copyw(), [s1], [d1])];
    let mut program = Program::new("scenario4", vars, 0, insns).unwrap();

    let result = compile_with_test_target(&mut program);

    assert_eq!(result, ResultCode::Ok);
    // The assembly text references the same register for both operands of a
    // chained single-instruction copy.
    let asm = program.asm_code.unwrap();
    assert_eq!(asm.matches("copyw").count(), 1);
}

#[test]
fn scenario_5_backup_and_disable_flag() {
    unsafe extern "C" fn backup_entry() {}

    let vars = VarTable::new();
    let mut program = Program::new("scenario5", vars, 0, vec![])
        .unwrap()
        .with_backup(backup_entry);

    let target = TestTarget::new();
    let flags = CompilerFlags {
        disable_with_backup: true,
        debug: false,
    };
    let result = orc_core::compile(&mut program, Some(&target), None, flags);

    assert_eq!(result, ResultCode::UnknownCompile);
    assert_eq!(
        program.code.map(|f| f as usize),
        program.backup_func.map(|f| f as usize)
    );
}

#[test]
fn scenario_6_accumulator_mismatch() {
    let mut vars = VarTable::new();
    let s1 = vars.push(Variable::src("S1", 2)).unwrap();
    let d1 = vars.push(Variable::dest("D1", 2)).unwrap();
    let insns = vec![Instruction::new(accsumw(), [s1], [d1])];
    let mut program = Program::new("scenario6", vars, 0, insns).unwrap();

    let result = compile_with_test_target(&mut program);

    assert_eq!(result, ResultCode::UnknownParse);
}

#[test]
fn accumulator_variable_round_trips_through_the_whole_pipeline() {
    let mut vars = VarTable::new();
    let s1 = vars.push(Variable::src("S1", 2)).unwrap();
    let a1 = vars.push(Variable::accumulator("A1", 2)).unwrap();
    let insns = vec![Instruction::new(accsumw(), [s1], [a1])];
    let mut program = Program::new("accumulate", vars, 0, insns).unwrap();

    let result = compile_with_test_target(&mut program);

    assert_eq!(result, ResultCode::Ok);
    assert_ne!(program.asm_code, None);
}

#[test]
fn register_pool_is_fully_released_after_a_successful_compile() {
    // Indirect check of the spec's end-of-compile invariant: run a program with
    // enough reuse pressure that a leaked refcount would eventually overflow the
    // pool, then compile it several times over (fresh context each time) without
    // ever hitting an overflow.
    for _ in 0..40 {
        let mut vars = VarTable::new();
        let s1 = vars.push(Variable::src("S1", 2)).unwrap();
        let d1 = vars.push(Variable::dest("D1", 2)).unwrap();
        let t1 = vars.push(Variable::temp("T1", 2)).unwrap();
        let insns = vec![
            Instruction::new(copyw(), [s1], [t1]),
            Instruction::new(copyw(), [t1], [d1]),
        ];
        let mut program = Program::new("repeat", vars, 1, insns).unwrap();
        assert_eq!(compile_with_test_target(&mut program), ResultCode::Ok);
    }
}

#[test]
fn missing_rule_is_reported_as_unknown_compile() {
    struct NoRulesTarget;
    impl orc_core::target::Target for NoRulesTarget {
        fn name(&self) -> &'static str {
            "no-rules"
        }
        fn data_register_offset(&self) -> u16 {
            64
        }
        fn compiler_init(&self, _ctx: &mut orc_core::context::CompilerContext) {}
        fn get_rule(
            &self,
            _opcode: orc_core::opcode::OpcodeRef,
            _flags: orc_core::target::TargetFlags,
        ) -> Option<orc_core::rule::Rule> {
            None
        }
        fn load_constant(
            &self,
            _ctx: &mut orc_core::context::CompilerContext,
            _reg: u16,
            _size: u8,
            _value: i64,
        ) {
        }
        fn compile(&self, _ctx: &mut orc_core::context::CompilerContext) {}
    }

    let mut vars = VarTable::new();
    let s1 = vars.push(Variable::src("S1", 2)).unwrap();
    let d1 = vars.push(Variable::dest("D1", 2)).unwrap();
    let insns = vec![Instruction::new(copyw(), [s1], [d1])];
    let mut program = Program::new("no-rules", vars, 0, insns).unwrap();

    let target = NoRulesTarget;
    let result = orc_core::compile(&mut program, Some(&target), None, CompilerFlags::default());

    assert_eq!(result, ResultCode::UnknownCompile);
    assert_eq!(program.asm_code, None);
}
