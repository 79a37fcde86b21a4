//! Variables: the program's typed storage locations.
//!
//! `VarIndex` is an opaque reference into a program's (or a compiler context's)
//! variable table, grounded on `cranelift_codegen::ir::entities`'s pattern of
//! wrapping a `u32` index in a small `Copy` newtype rather than passing bare
//! `usize`s around.

use std::fmt;

use crate::error::OrcError;

/// Reserved capacity of the variable table (D1-D4, S1-S8, C1-C8, P1-P8, T1-T8 in the
/// reference implementation, plus room for renamed duplicates).
pub const N_VAR: usize = 36;

/// Sentinel meaning "not indexed by any instruction" for `first_use`/`last_use`.
pub const NOT_INDEXED: i32 = -1;

/// Opaque index into a variable table.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarIndex(u32);

impl VarIndex {
    /// Construct a `VarIndex` from a raw slot number.
    pub fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize);
        VarIndex(index as u32)
    }

    /// The raw slot number, for indexing into a variable table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VarIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "var{}", self.0)
    }
}

impl fmt::Debug for VarIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VarIndex({})", self.0)
    }
}

/// The kind of a variable, and the fields only meaningful for that kind.
///
/// Per spec's design note, this is a sum type rather than one flat struct with a
/// `kind` enum plus every per-kind field always present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VarKind {
    /// A scratch value with program-local lifetime; subject to SSA-style renaming
    /// on re-definition.
    Temp,
    /// A source operand read from memory via a pointer register. Carries the
    /// auxiliary register bundle a backend may request (mask/offset/aligned-data).
    Src(PointerRegs),
    /// A destination operand written to memory via a pointer register.
    Dest(PointerRegs),
    /// A compile-time constant, broadcast across the vector width. Live throughout
    /// the program.
    Const(i64),
    /// A scalar parameter supplied by the caller at run time. Live throughout the
    /// program.
    Param,
    /// A value that persists across loop iterations, written only by
    /// accumulator-flagged opcodes. Live throughout the program.
    Accumulator,
}

impl VarKind {
    /// Does this kind have a whole-program lifetime (`first_use = last_use = -1`)?
    pub fn is_global_lifetime(&self) -> bool {
        matches!(self, VarKind::Const(_) | VarKind::Param | VarKind::Accumulator)
    }

    /// Short tag used in diagnostics and in synthesized duplicate names.
    pub fn tag(&self) -> &'static str {
        match self {
            VarKind::Temp => "temp",
            VarKind::Src(_) => "src",
            VarKind::Dest(_) => "dest",
            VarKind::Const(_) => "const",
            VarKind::Param => "param",
            VarKind::Accumulator => "accumulator",
        }
    }
}

/// Auxiliary registers a backend may request for unaligned/masked src or dest
/// access. Only populated during global allocation; `0` means "not allocated"
/// (register 0 is never a valid allocation target — see `regalloc::pool`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerRegs {
    /// GP register holding the base pointer for this operand.
    pub ptr_register: u16,
    /// GP register holding a running byte offset from `ptr_register`, requested by
    /// backends that implement unaligned loads via masking.
    pub ptr_offset: u16,
    /// Vector register holding the unalignment mask.
    pub mask: u16,
    /// Vector register holding the aligned, masked data.
    pub aligned_data: u16,
}

/// A single variable: name, element size, kind, usage bookkeeping, and rename
/// state.
#[derive(Clone, Debug)]
pub struct Variable {
    /// Diagnostic name (`"S1"`, `"T1.dup3"`, ...).
    pub name: String,
    /// Element size in bytes. For `Src`/`Const`/`Param` this is the size of a
    /// single broadcast element; the instruction slot size is a property of the
    /// opcode, not the storage, for those kinds (invariant in spec.md §3).
    pub size: u8,
    /// What kind of variable this is, and its kind-specific fields.
    pub kind: VarKind,

    /// Has this variable been referenced by any instruction yet?
    pub used: bool,
    /// Index of the instruction that first defines/references this variable, or
    /// `NOT_INDEXED`.
    pub first_use: i32,
    /// Index of the instruction that last references this variable, or
    /// `NOT_INDEXED`.
    pub last_use: i32,

    /// Has this slot been superseded by a rename (Temp re-definition)?
    pub replaced: bool,
    /// If `replaced`, the slot that now stands in for this one. Flattened eagerly
    /// on each rewrite (spec.md §9): never chase more than one hop.
    pub replacement: Option<VarIndex>,

    /// Assigned register, or `0` if none yet (see `regalloc::pool::NO_REG`).
    pub alloc: u16,
}

impl Variable {
    /// Construct a fresh, unused variable.
    pub fn new(name: impl Into<String>, size: u8, kind: VarKind) -> Self {
        let global = kind.is_global_lifetime();
        Variable {
            name: name.into(),
            size,
            kind,
            used: global,
            first_use: NOT_INDEXED,
            last_use: NOT_INDEXED,
            replaced: false,
            replacement: None,
            alloc: 0,
        }
    }

    /// Convenience constructors for each kind, matching the reference slot
    /// naming (`D1..D4`, `S1..S8`, `C1..C8`, `P1..P8`, `T1..T8`).
    pub fn temp(name: impl Into<String>, size: u8) -> Self {
        Self::new(name, size, VarKind::Temp)
    }
    pub fn src(name: impl Into<String>, size: u8) -> Self {
        Self::new(name, size, VarKind::Src(PointerRegs::default()))
    }
    pub fn dest(name: impl Into<String>, size: u8) -> Self {
        Self::new(name, size, VarKind::Dest(PointerRegs::default()))
    }
    pub fn constant(name: impl Into<String>, size: u8, value: i64) -> Self {
        Self::new(name, size, VarKind::Const(value))
    }
    pub fn param(name: impl Into<String>, size: u8) -> Self {
        Self::new(name, size, VarKind::Param)
    }
    pub fn accumulator(name: impl Into<String>, size: u8) -> Self {
        Self::new(name, size, VarKind::Accumulator)
    }

    /// Is this a `Temp`?
    pub fn is_temp(&self) -> bool {
        matches!(self.kind, VarKind::Temp)
    }

    /// Return the auxiliary pointer-register bundle if this is a `Src`/`Dest`.
    pub fn pointer_regs(&self) -> Option<&PointerRegs> {
        match &self.kind {
            VarKind::Src(p) | VarKind::Dest(p) => Some(p),
            _ => None,
        }
    }

    /// Mutable access to the auxiliary pointer-register bundle if this is a
    /// `Src`/`Dest`.
    pub fn pointer_regs_mut(&mut self) -> Option<&mut PointerRegs> {
        match &mut self.kind {
            VarKind::Src(p) | VarKind::Dest(p) => Some(p),
            _ => None,
        }
    }
}

/// Fixed-capacity table of variables, indexed by `VarIndex`.
///
/// Slot indices are part of the ABI between the core pipeline and backends (spec.md
/// §9): once assigned, a variable's index never changes, even across renaming
/// (renaming appends a new slot and links the old one to it).
#[derive(Clone, Debug, Default)]
pub struct VarTable {
    vars: Vec<Variable>,
}

impl VarTable {
    pub fn new() -> Self {
        VarTable { vars: Vec::new() }
    }

    /// Append a variable, returning its newly assigned index.
    pub fn push(&mut self, var: Variable) -> Result<VarIndex, OrcError> {
        if self.vars.len() >= N_VAR {
            return Err(OrcError::CapacityExceeded("variable table"));
        }
        let idx = VarIndex::new(self.vars.len());
        self.vars.push(var);
        Ok(idx)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarIndex, &Variable)> {
        self.vars
            .iter()
            .enumerate()
            .map(|(i, v)| (VarIndex::new(i), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (VarIndex, &mut Variable)> {
        self.vars
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (VarIndex::new(i), v))
    }

    /// Resolve `idx` through any rename chain, flattening as we go (single-level
    /// union-find, per spec.md §9: no multi-hop chase is ever needed because each
    /// rewrite flattens eagerly).
    pub fn resolve(&mut self, idx: VarIndex) -> VarIndex {
        let Some(target) = self[idx].replacement else {
            return idx;
        };
        let root = self.resolve(target);
        self[idx].replacement = Some(root);
        root
    }
}

impl std::ops::Index<VarIndex> for VarTable {
    type Output = Variable;
    fn index(&self, idx: VarIndex) -> &Variable {
        &self.vars[idx.index()]
    }
}

impl std::ops::IndexMut<VarIndex> for VarTable {
    fn index_mut(&mut self, idx: VarIndex) -> &mut Variable {
        &mut self.vars[idx.index()]
    }
}
