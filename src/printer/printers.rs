// src/printer/printers.rs

//! Record serialization.
//!
//! One JSON object per line ("NDJSON") so downstream tools can consume the
//! stream incrementally. Records go to *stdout* only; diagnostics go to
//! *stderr* (see [`crate::debug::printers`]).

use crate::data::conn::JsonMap;

use std::io::{Result, Write};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Serialize one record as a single JSON line.
///
/// A write failure is fatal to the run (broken pipe, closed stdout); the
/// caller propagates it.
pub fn write_record(
    writer: &mut impl Write,
    record: &JsonMap,
) -> Result<()> {
    serde_json::to_writer(&mut *writer, record)?;
    writer.write_all(b"\n")?;

    Ok(())
}
