//! Register allocation: a fixed-window pool, a global (whole-program-lifetime)
//! pass, and a local (per-instruction) pass with the chaining optimization.

pub mod global;
pub mod local;
pub mod pool;

pub use global::global_reg_alloc;
pub use local::rewrite_vars2;
pub use pool::RegisterPool;
