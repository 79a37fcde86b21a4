//! The register pool: a refcounted bitmap, not a free-list.
//!
//! Grounded on `cranelift_codegen::regalloc::register_set::RegisterSet`, but
//! simplified to match spec.md §4.5's model: rather than a bit-per-register-unit
//! mask with register-class widths, each pool is a flat vector of small refcounts
//! indexed by register number, because the chaining optimization (spec.md §4.5
//! local pass) depends on bumping and reading a live refcount, not just a boolean
//! bit (design note in spec.md §9).

use log::{debug, trace};

/// Total number of register-state slots tracked per context (reference value; real
/// targets use a small window within this span).
pub const N_REG: usize = 128;

/// General-purpose register pool window: registers `[32, 64)`.
pub const GP_BASE: u16 = 32;
/// Width, in registers, of each pool's window.
pub const POOL_WIDTH: u16 = 32;

/// Sentinel meaning "no register assigned". Real register numbers are always
/// `>= GP_BASE`, so `0` is never a valid allocation.
pub const NO_REG: u16 = 0;

/// Per-register allocator state, sized `N_REG`.
#[derive(Clone, Debug)]
pub struct RegisterPool {
    /// This target may use this register at all.
    pub valid: [bool; N_REG],
    /// This register is callee-saved: prefer not to use it unless the scratch
    /// window is exhausted.
    pub save: [bool; N_REG],
    /// The allocator has touched this register at least once; the backend must
    /// save/restore it around the kernel body.
    pub used: [bool; N_REG],
    /// Live-range refcount. Zero means free.
    pub alloc: [u16; N_REG],
}

impl Default for RegisterPool {
    fn default() -> Self {
        RegisterPool {
            valid: [true; N_REG],
            save: [false; N_REG],
            used: [false; N_REG],
            alloc: [0; N_REG],
        }
    }
}

/// Diagnostic name of a pool, for "register overflow" messages.
pub fn pool_name(is_data: bool) -> &'static str {
    if is_data {
        "vector"
    } else {
        "gp"
    }
}

impl RegisterPool {
    /// Window base for the pool selected by `is_data`.
    fn base(&self, is_data: bool, data_register_offset: u16) -> u16 {
        if is_data {
            data_register_offset
        } else {
            GP_BASE
        }
    }

    /// Allocate one register from the pool selected by `is_data`.
    ///
    /// Two-pass policy, in order: prefer a scratch (non-`save`) register that is
    /// currently free; fall back to any free register, `save` or not. Returns
    /// `NO_REG` (`0`) on exhaustion, logging which pool overflowed.
    pub fn allocate(&mut self, is_data: bool, data_register_offset: u16) -> u16 {
        let base = self.base(is_data, data_register_offset);
        let window = base..base + POOL_WIDTH;

        // Preferred pass: valid, not callee-saved, currently free.
        for r in window.clone() {
            let i = r as usize;
            if self.valid[i] && !self.save[i] && self.alloc[i] == 0 {
                return self.take(r);
            }
        }
        // Fallback pass: valid and currently free, `save` or not.
        for r in window {
            let i = r as usize;
            if self.valid[i] && self.alloc[i] == 0 {
                return self.take(r);
            }
        }

        debug!("register overflow in {} pool", pool_name(is_data));
        NO_REG
    }

    fn take(&mut self, r: u16) -> u16 {
        self.alloc[r as usize] += 1;
        self.used[r as usize] = true;
        trace!("allocated register {}", r);
        r
    }

    /// Permanently reserve one register from the pool selected by `is_data`, for
    /// a whole-program-lifetime variable (global allocation: `Const`/`Param`/
    /// `Accumulator` vector registers, `Src`/`Dest` pointer registers, the loop
    /// counter). Unlike `allocate`, the refcount is not left standing — the
    /// register is instead struck from `valid` so it can never be handed out
    /// again, by either pass. This keeps `fully_released` meaningful as the
    /// per-instruction live-range invariant spec.md §3 describes, rather than
    /// requiring every global reservation to be matched with a `release` that
    /// would never come (global registers live for the whole program, not one
    /// instruction).
    pub fn reserve(&mut self, is_data: bool, data_register_offset: u16) -> u16 {
        let reg = self.allocate(is_data, data_register_offset);
        if reg != NO_REG {
            self.alloc[reg as usize] = 0;
            self.valid[reg as usize] = false;
        }
        reg
    }

    /// Bump the refcount of an already-allocated register (used by the chaining
    /// optimization to keep a shared register live through both operands'
    /// lifetimes).
    pub fn retain(&mut self, reg: u16) {
        if reg != NO_REG {
            self.alloc[reg as usize] += 1;
        }
    }

    /// Release one reference to `reg`. A register whose refcount reaches zero
    /// becomes reusable within the same pass.
    pub fn release(&mut self, reg: u16) {
        if reg == NO_REG {
            return;
        }
        let i = reg as usize;
        debug_assert!(self.alloc[i] > 0, "releasing register {} with zero refcount", reg);
        self.alloc[i] -= 1;
        trace!("released register {} (refcount now {})", reg, self.alloc[i]);
    }

    /// `true` iff every register has been fully released (spec.md §3 invariant:
    /// `alloc_regs[r] == 0` for all `r` at the end of local allocation).
    pub fn fully_released(&self) -> bool {
        self.alloc.iter().all(|&c| c == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> RegisterPool {
        RegisterPool::default()
    }

    #[test]
    fn preferred_pass_skips_save_registers() {
        let mut p = pool();
        p.save[GP_BASE as usize] = true;
        let r = p.allocate(false, 64);
        assert_eq!(r, GP_BASE + 1);
    }

    #[test]
    fn fallback_pass_uses_save_registers_when_exhausted() {
        let mut p = pool();
        // Mark every scratch register `save` so only the fallback pass can succeed.
        for r in GP_BASE..GP_BASE + POOL_WIDTH {
            p.save[r as usize] = true;
        }
        let r = p.allocate(false, 64);
        assert_eq!(r, GP_BASE);
        assert!(p.used[GP_BASE as usize]);
    }

    #[test]
    fn exhaustion_returns_no_reg() {
        let mut p = pool();
        for _ in 0..POOL_WIDTH {
            assert_ne!(p.allocate(false, 64), NO_REG);
        }
        assert_eq!(p.allocate(false, 64), NO_REG);
    }

    #[test]
    fn release_then_reallocate_reuses_register() {
        let mut p = pool();
        let r = p.allocate(true, 64);
        p.release(r);
        assert!(p.fully_released());
        let r2 = p.allocate(true, 64);
        assert_eq!(r, r2);
    }

    #[test]
    fn retain_keeps_register_live_across_extra_release() {
        let mut p = pool();
        let r = p.allocate(true, 64);
        p.retain(r);
        p.release(r);
        assert!(!p.fully_released());
        p.release(r);
        assert!(p.fully_released());
    }

    #[test]
    fn reserve_does_not_count_toward_fully_released() {
        let mut p = pool();
        let r = p.reserve(false, 64);
        assert!(p.fully_released());
        assert!(!p.valid[r as usize]);
    }

    #[test]
    fn reserve_excludes_the_register_from_future_allocation() {
        let mut p = pool();
        let reserved = p.reserve(false, 64);
        for _ in 0..POOL_WIDTH - 1 {
            assert_ne!(p.allocate(false, 64), reserved);
        }
        assert_eq!(p.allocate(false, 64), NO_REG);
    }
}
