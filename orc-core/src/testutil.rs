//! A minimal reference target and opcode set used by this crate's own tests and
//! by the `orcc` harness binary.
//!
//! This is **not** a real backend: it has just enough rules (one non-accumulator
//! vector op, one accumulator op, one scalar op) to drive validation, liveness,
//! both allocator passes, and chaining, without implementing instruction
//! selection, encoding, or peepholes. Grounded on the role
//! `cranelift_codegen::isa::test_utils` plays for Cranelift: a stand-in ISA that
//! lets ISA-independent code be exercised without a real backend.

use std::fmt::Write as _;

use crate::append_code;
use crate::context::CompilerContext;
use crate::insn::InsnIndex;
use crate::opcode::{OpcodeFlags, OpcodeRef, StaticOpcode};
use crate::regalloc::pool::GP_BASE;
use crate::rule::Rule;
use crate::target::{Target, TargetFlags};

static COPYW: StaticOpcode = StaticOpcode {
    name: "copyw",
    src_size: [2, 0, 0],
    dest_size: [2, 0],
    flags: OpcodeFlags::empty(),
    emulate: None,
};

static ADDW: StaticOpcode = StaticOpcode {
    name: "addw",
    src_size: [2, 2, 0],
    dest_size: [2, 0],
    flags: OpcodeFlags::empty(),
    emulate: None,
};

static MULW_SCALAR: StaticOpcode = StaticOpcode {
    name: "mulw",
    src_size: [2, 2, 0],
    dest_size: [2, 0],
    flags: OpcodeFlags::SCALAR,
    emulate: None,
};

static ACCSUMW: StaticOpcode = StaticOpcode {
    name: "accsumw",
    src_size: [2, 0, 0],
    dest_size: [2, 0],
    flags: OpcodeFlags::ACCUMULATOR,
    emulate: None,
};

pub fn copyw() -> OpcodeRef {
    OpcodeRef(&COPYW)
}
pub fn addw() -> OpcodeRef {
    OpcodeRef(&ADDW)
}
pub fn mulw_scalar() -> OpcodeRef {
    OpcodeRef(&MULW_SCALAR)
}
pub fn accsumw() -> OpcodeRef {
    OpcodeRef(&ACCSUMW)
}

/// A trivial target: GP/vector windows at the reference offsets, one rule per
/// test opcode, a scratch register, and no mask/loop-counter requirements.
pub struct TestTarget;

impl TestTarget {
    pub fn new() -> Self {
        TestTarget
    }
}

impl Default for TestTarget {
    fn default() -> Self {
        Self::new()
    }
}

fn emit_generic(ctx: &mut CompilerContext, insn: InsnIndex) {
    let insn = &ctx.insns()[insn.index()];
    let mut line = format!("{}", insn.opcode.0.name);
    for &d in &insn.dest_args {
        let _ = write!(line, " r{}", ctx.vars()[d].alloc);
    }
    for &s in &insn.src_args {
        let _ = write!(line, ", r{}", ctx.vars()[s].alloc);
    }
    append_code!(ctx.asm, "{}", line);
}

impl Target for TestTarget {
    fn name(&self) -> &'static str {
        "test"
    }

    fn data_register_offset(&self) -> u16 {
        GP_BASE + 32
    }

    fn compiler_init(&self, ctx: &mut CompilerContext) {
        ctx.data_register_offset = self.data_register_offset();
        ctx.tmpreg = ctx.data_register_offset;
        ctx.need_mask_regs = false;
        ctx.alloc_loop_counter = false;
    }

    fn get_rule(&self, opcode: OpcodeRef, _flags: TargetFlags) -> Option<Rule> {
        if std::ptr::eq(opcode.0, &COPYW)
            || std::ptr::eq(opcode.0, &ADDW)
            || std::ptr::eq(opcode.0, &MULW_SCALAR)
            || std::ptr::eq(opcode.0, &ACCSUMW)
        {
            Some(Rule::new(emit_generic))
        } else {
            None
        }
    }

    fn load_constant(&self, ctx: &mut CompilerContext, reg: u16, _size: u8, value: i64) {
        append_code!(ctx.asm, "load r{}, ${}", reg, value);
    }

    fn compile(&self, ctx: &mut CompilerContext) {
        for i in 0..ctx.insns().len() {
            let idx = InsnIndex::new(i);
            let rule = ctx.insns()[i].rule.clone();
            if let Some(rule) = rule {
                rule.emit(ctx, idx);
            }
        }
    }
}
