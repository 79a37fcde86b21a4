//! Target-specific emission rules.
//!
//! A `Rule` is the thing `assign_rules` (spec.md §4.3) binds onto each instruction:
//! a target-specific callback that knows how to emit code for a particular opcode
//! under the target's current flags, plus whatever user data that callback needs
//! (an encoding template, a peephole table entry, ...). The core pipeline never
//! inspects a rule's contents — only whether one was found.

use std::sync::Arc;

use crate::context::CompilerContext;
use crate::insn::InsnIndex;

/// Emits code for one instruction. Implemented by backends; the core pipeline only
/// calls this through `Target::compile`'s per-instruction dispatch.
pub trait Emit: Send + Sync {
    fn emit(&self, ctx: &mut CompilerContext, insn: InsnIndex);
}

impl<F: Fn(&mut CompilerContext, InsnIndex) + Send + Sync> Emit for F {
    fn emit(&self, ctx: &mut CompilerContext, insn: InsnIndex) {
        self(ctx, insn)
    }
}

/// A target-specific rule bound to an instruction during `assign_rules`.
///
/// Cheaply `Clone`-able (an `Arc` to the callback) since a rule is shared between
/// every instruction with the same opcode under the same target flags.
#[derive(Clone)]
pub struct Rule {
    emit: Arc<dyn Emit>,
}

impl Rule {
    pub fn new(emit: impl Emit + 'static) -> Self {
        Rule {
            emit: Arc::new(emit),
        }
    }

    pub fn emit(&self, ctx: &mut CompilerContext, insn: InsnIndex) {
        self.emit.emit(ctx, insn)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Rule(..)")
    }
}
