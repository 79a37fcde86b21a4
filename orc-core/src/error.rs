//! Result codes and error types.
//!
//! Two distinct severities exist, per the compiler's error model: a parse error means
//! the program itself is malformed (the interpreter will also reject it); a compile
//! error is recoverable (the interpreter can still run the program). `ResultCode` is
//! the hot-path internal signal threaded through every pass; `OrcError` is the
//! boundary-facing error type for APIs that aren't on that hot path (target
//! registration, flag parsing).

use std::fmt;

/// Outcome of a compilation attempt, with a total severity order.
///
/// `Ok < EmulateOnly < UnknownCompile < UnknownParse`. The ordering isn't the enum's
/// declaration order, so we hand-write `severity` rather than derive `Ord`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ResultCode {
    /// Compilation succeeded; executable code was generated.
    #[default]
    Ok,
    /// No rule exists for at least one opcode; the program will only ever run
    /// through the interpreter.
    EmulateOnly,
    /// Compilation failed for a recoverable reason (no rule, register exhaustion,
    /// missing target, compilation disabled with a backup present). The interpreter
    /// can still run the program.
    UnknownCompile,
    /// The program itself is malformed (size mismatch, illegal operand kind,
    /// use-before-def, accumulator mismatch). Fatal: the interpreter will also
    /// reject it.
    UnknownParse,
}

impl ResultCode {
    fn severity(self) -> u8 {
        match self {
            ResultCode::Ok => 0,
            ResultCode::EmulateOnly => 1,
            ResultCode::UnknownCompile => 2,
            ResultCode::UnknownParse => 3,
        }
    }

    /// Did compilation produce executable code?
    pub fn successful(self) -> bool {
        self == ResultCode::Ok
    }

    /// Is the program itself invalid (as opposed to merely uncompilable)?
    pub fn fatal(self) -> bool {
        self == ResultCode::UnknownParse
    }

    /// Replace `self` with `other` if `other` is strictly more severe.
    ///
    /// Used by passes (the validator, the liveness pass) that latch the worst error
    /// seen so far rather than aborting on the first one.
    pub fn escalate(&mut self, other: ResultCode) {
        if other.severity() > self.severity() {
            *self = other;
        }
    }

    /// A zero/default result reaching the driver's error path is promoted to
    /// `UnknownCompile`: an error was flagged but no specific code was ever set.
    pub fn promote_if_ok(self) -> ResultCode {
        if self == ResultCode::Ok {
            ResultCode::UnknownCompile
        } else {
            self
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultCode::Ok => write!(f, "ok"),
            ResultCode::EmulateOnly => write!(f, "emulate-only"),
            ResultCode::UnknownCompile => write!(f, "unknown-compile"),
            ResultCode::UnknownParse => write!(f, "unknown-parse"),
        }
    }
}

/// Errors surfaced at API boundaries: target registration, flag parsing, and the
/// like. Pipeline-internal failures are reported via `ResultCode`, not this type.
#[derive(Debug, thiserror::Error)]
pub enum OrcError {
    /// A target with this name is already present in the registry.
    #[error("target `{0}` is already registered")]
    DuplicateTarget(String),

    /// No registered target matches the requested name.
    #[error("no such target: `{0}`")]
    UnknownTarget(String),

    /// `ORC_CODE` contained a flag name we don't recognize.
    #[error("unrecognized ORC_CODE flag: `{0}`")]
    UnknownFlag(String),

    /// The program supplied more instructions or variables than the fixed-capacity
    /// tables allow (spec's N_INSNS / N_VAR bounds).
    #[error("program exceeds fixed capacity: {0}")]
    CapacityExceeded(&'static str),
}
