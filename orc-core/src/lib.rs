//! Target-independent core of the Orc compiler: program validation, rule
//! binding, variable-lifetime analysis and renaming, register allocation, and
//! the driver that sequences these passes and hands off to a backend.
//!
//! Backends (instruction selection, encoding, executable-memory management)
//! are out of scope for this crate: it defines the `Target`/`CodeMemoryAllocator`
//! seams a backend implements and the data a backend reads and writes, nothing
//! more. See `testutil` for a minimal stand-in target used by this crate's own
//! tests.

pub mod asmbuffer;
pub mod config;
pub mod constant_pool;
pub mod context;
pub mod driver;
pub mod error;
pub mod insn;
pub mod label;
pub mod liveness;
pub mod opcode;
pub mod program;
pub mod regalloc;
pub mod rule;
pub mod rules;
pub mod target;
pub mod validate;
pub mod var;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;
#[cfg(not(any(test, feature = "testutil")))]
mod testutil;

pub use config::CompilerFlags;
pub use context::CompilerContext;
pub use driver::compile;
pub use error::{OrcError, ResultCode};
pub use insn::{InsnIndex, Instruction};
pub use opcode::{OpcodeFlags, OpcodeRef, StaticOpcode};
pub use program::Program;
pub use rule::{Emit, Rule};
pub use target::{CodeMemoryAllocator, Target, TargetFlags, TargetRegistry};
pub use var::{VarIndex, VarKind, VarTable, Variable};
