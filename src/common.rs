// src/common.rs
//
// common imports, type aliases, and other globals (avoids circular imports)

pub use std::fs::File;
pub use std::path::Path;

// TODO: use `std::path::Path` for `FPath`
/// `F`ake `Path` or `F`ile `Path`
pub type FPath = String;
pub type FPaths = Vec<FPath>;

/// A general-purpose counter.
pub type Count = u64;

/// 1-based line number within the input stream.
pub type LineNum = u64;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// stats-log identifiers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// slapd connection identifier, `conn=` in the log.
/// Unique per log among live connections; slapd may reuse a value after the
/// connection closes.
pub type ConnId = i64;

/// slapd operation identifier, `op=` in the log.
/// Only meaningful paired with a [`ConnId`]; *not* globally unique.
pub type OpId = i64;

/// slapd file descriptor number, `fd=` in the log.
pub type Fd = i64;

/// Sentinel `fd` value for a connection created defensively from an `op`
/// line, before its `ACCEPT` line was seen (or when none exists in the log).
pub const FD_NONE: Fd = -1;

/// Sentinel `op` value used by the synthetic CONNECT/DISCONNECT records,
/// which do not correspond to a protocol operation.
pub const OP_NONE: OpId = -1;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// process exit values
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process exit value for everything was fine. Line-level parse errors do
/// not affect the exit value.
pub const EXIT_OK: i32 = 0;
/// Process exit value for a catastrophic setup problem, e.g. the input
/// source could not be opened.
pub const EXIT_ERR: i32 = 1;
