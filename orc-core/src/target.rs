//! The target interface: the narrow seam through which the core pipeline consumes
//! a backend.
//!
//! Grounded on `cranelift_codegen::isa::{TargetIsa, Builder, lookup_by_name}`: a
//! small trait object collected into a process-wide, read-only registry, looked up
//! by name. Unlike Cranelift's `TargetIsa`, targets here are registered directly
//! (there is no per-target settings builder to thread through first) since Orc
//! targets are selected by name alone, with flags carried per-compilation instead
//! of per-target-instance.

use std::collections::HashMap;
use std::sync::Arc;

use crate::context::CompilerContext;
use crate::error::OrcError;
use crate::opcode::OpcodeRef;
use crate::rule::Rule;

/// Per-compilation target flags (e.g. "prefer SSE2 over MMX"), opaque to the core
/// pipeline and interpreted only by the target itself.
pub type TargetFlags = u32;

/// Methods specialized to one hardware (or software-fallback) target.
///
/// A `Target` is registered once, at process startup, and is then shared
/// read-only (`Send + Sync`) across however many concurrent compilations run
/// against it (spec.md §5).
pub trait Target: Send + Sync {
    /// Name of this target (`"sse"`, `"mmx"`, `"altivec"`, `"c"`, ...).
    fn name(&self) -> &'static str;

    /// Base register number at which this target's vector/data register pool
    /// starts (reference value: 64, with general-purpose registers based at 32).
    fn data_register_offset(&self) -> u16;

    /// Prune `ctx`'s `valid`/`save` register sets down to what this ISA actually
    /// has, pick a scratch register (`tmpreg`) for constant loads, and declare
    /// whether this target wants mask/offset/aligned-data registers and an
    /// implicit loop counter.
    fn compiler_init(&self, ctx: &mut CompilerContext);

    /// Look up a rule for `opcode` under `flags`. Identity-keyed, not name-keyed
    /// (spec.md §4.3): two opcodes with the same name are never the same opcode.
    fn get_rule(&self, opcode: OpcodeRef, flags: TargetFlags) -> Option<Rule>;

    /// Emit a load of `value` (already canonicalized/splatted by the constant
    /// pool) into `reg`.
    fn load_constant(&self, ctx: &mut CompilerContext, reg: u16, size: u8, value: i64);

    /// Emit the whole program. Called once, after every other pass has
    /// succeeded; writes into `ctx`'s assembly buffer and code bytes.
    fn compile(&self, ctx: &mut CompilerContext);
}

/// Installs a writable+executable buffer into a compiler context. Kept separate
/// from `Target` so a target can be exercised in tests without standing up real
/// executable memory (spec.md §6: "a separate collaborator").
pub trait CodeMemoryAllocator: Send + Sync {
    fn allocate_codemem(&self, ctx: &mut CompilerContext) -> bool;
}

/// Process-wide, read-only (after construction) set of registered targets,
/// looked up by name.
#[derive(Default)]
pub struct TargetRegistry {
    targets: HashMap<&'static str, Arc<dyn Target>>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        TargetRegistry {
            targets: HashMap::new(),
        }
    }

    /// Register a target. Errors if a target with this name is already present;
    /// the registry is meant to be populated once at startup, not mutated during
    /// compilation.
    pub fn register(&mut self, target: Arc<dyn Target>) -> Result<(), OrcError> {
        let name = target.name();
        if self.targets.contains_key(name) {
            return Err(OrcError::DuplicateTarget(name.to_string()));
        }
        self.targets.insert(name, target);
        Ok(())
    }

    /// Look up a target previously registered under `name`.
    pub fn lookup_by_name(&self, name: &str) -> Option<Arc<dyn Target>> {
        self.targets.get(name).cloned()
    }
}
