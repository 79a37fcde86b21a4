//! Process-wide compiler flags, parsed once from the `ORC_CODE` environment variable.
//!
//! This mirrors the "write-once global, pass references into the driver" shape the
//! teacher uses for its settings: rather than a builder that gets mutated and later
//! sealed, `CompilerFlags` here is small enough to just parse directly into an
//! immutable value and hand a `&CompilerFlags` down through the driver.

use std::env;

use crate::error::OrcError;

/// `ORC_CODE=backup`: when a program carries a backup function, skip compilation
/// entirely and report `ResultCode::UnknownCompile`, leaving the backup installed.
pub const FLAG_BACKUP: &str = "backup";
/// `ORC_CODE=debug`: enable verbose compile-time logging (in addition to whatever
/// `RUST_LOG` already enables).
pub const FLAG_DEBUG: &str = "debug";

/// Parsed, immutable set of `ORC_CODE` flags for this process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompilerFlags {
    /// `backup` flag: disable compilation when a backup function is available.
    pub disable_with_backup: bool,
    /// `debug` flag: verbose compile-time logging.
    pub debug: bool,
}

impl CompilerFlags {
    /// Parse a comma-separated flag list, as found in `ORC_CODE`.
    ///
    /// Unknown flag names are rejected rather than silently ignored, so a typo in
    /// `ORC_CODE` doesn't silently do nothing.
    pub fn parse(value: &str) -> Result<Self, OrcError> {
        let mut flags = CompilerFlags::default();
        for name in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match name {
                FLAG_BACKUP => flags.disable_with_backup = true,
                FLAG_DEBUG => flags.debug = true,
                other => return Err(OrcError::UnknownFlag(other.to_string())),
            }
        }
        Ok(flags)
    }

    /// Read and parse `ORC_CODE` from the process environment.
    ///
    /// An unset `ORC_CODE` is the empty flag set, not an error.
    pub fn from_env() -> Result<Self, OrcError> {
        match env::var("ORC_CODE") {
            Ok(value) => Self::parse(&value),
            Err(env::VarError::NotPresent) => Ok(CompilerFlags::default()),
            Err(env::VarError::NotUnicode(_)) => Ok(CompilerFlags::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_default() {
        assert_eq!(CompilerFlags::parse("").unwrap(), CompilerFlags::default());
    }

    #[test]
    fn parses_known_flags() {
        let flags = CompilerFlags::parse("backup, debug").unwrap();
        assert!(flags.disable_with_backup);
        assert!(flags.debug);
    }

    #[test]
    fn rejects_unknown_flag() {
        assert!(matches!(
            CompilerFlags::parse("backup,nonsense"),
            Err(OrcError::UnknownFlag(f)) if f == "nonsense"
        ));
    }
}
