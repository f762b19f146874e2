//! Standard exit codes (BSD sysexits.h compatible)

/// Successful termination, puzzle balanced
pub const OK: i32 = 0;

/// Puzzle parsed and checked, but not in equilibrium
pub const UNBALANCED: i32 = 1;

/// Command line usage error
pub const USAGE: i32 = 64;

/// Data format error (malformed puzzle)
pub const DATAERR: i32 = 65;

/// Cannot open input
pub const NOINPUT: i32 = 66;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error
pub const CONFIG: i32 = 78;
