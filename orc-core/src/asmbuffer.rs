//! The emitted-assembly text buffer.
//!
//! spec.md §4.8 describes a growable, NUL-terminated byte buffer built by
//! formatted per-call appends bounded at ~199 characters each, reallocated on
//! every append. In Rust a `String` already gives us the growable-buffer part for
//! free; we keep the "bounded-length formatted chunk" discipline as a debug
//! assertion so a rule implementation that builds a too-long line in one
//! `append_code` call gets caught in tests rather than just producing an
//! unreadable `.asm` dump.

/// Reference-implementation per-call formatting bound, preserved as a sanity
/// check rather than a hard limit (we don't need to avoid a fixed-size C buffer).
const MAX_CHUNK_LEN: usize = 199;

/// Growable assembly-text buffer. Starts empty; the first `append` is equivalent
/// to the reference's "buffer may be null initially".
#[derive(Clone, Debug, Default)]
pub struct AssemblyBuffer {
    text: String,
}

impl AssemblyBuffer {
    pub fn new() -> Self {
        AssemblyBuffer::default()
    }

    /// Append one formatted chunk, as `append_code` does in the reference
    /// implementation.
    pub fn append(&mut self, args: std::fmt::Arguments<'_>) {
        let chunk = args.to_string();
        debug_assert!(
            chunk.len() <= MAX_CHUNK_LEN,
            "assembly chunk exceeds the per-call formatting bound: {} bytes",
            chunk.len()
        );
        self.text.push_str(&chunk);
    }

    /// Append a line (chunk plus trailing newline), the common case for one
    /// instruction's worth of emitted assembly.
    pub fn append_line(&mut self, args: std::fmt::Arguments<'_>) {
        self.append(args);
        self.text.push('\n');
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Consume the buffer, yielding the final NUL-terminated-in-spirit text (a
    /// plain `String` on the Rust side; `Program::asm_code` is what callers read).
    pub fn into_string(self) -> String {
        self.text
    }
}

/// Convenience macro mirroring `append_code(ctx, fmt, ...)` call sites in rule
/// implementations.
#[macro_export]
macro_rules! append_code {
    ($buf:expr, $($arg:tt)*) => {
        $buf.append_line(format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_accumulate() {
        let mut buf = AssemblyBuffer::new();
        crate::append_code!(buf, "movq %xmm0, %xmm1");
        crate::append_code!(buf, "addq $4, %rax");
        assert_eq!(buf.into_string(), "movq %xmm0, %xmm1\naddq $4, %rax\n");
    }
}
