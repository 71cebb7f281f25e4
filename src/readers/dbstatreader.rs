// src/readers/dbstatreader.rs

//! Parse the text report of the Berkeley DB statistics utility
//! (`db_stat -d`) into size figures, for the `db-size` binary.
//!
//! Three fixed report patterns are recognized: the underlying page size,
//! the per-level tree page counts, and the per-level free-byte counts. A
//! value may carry the `M` unit marker meaning ×1,000,000 (decimal, not
//! binary; see `db-*/src/env/env_stat.c:__db_dl()`).

use crate::common::FPath;

use std::process::Command;

use ::lazy_static::lazy_static;
use ::regex::Regex;
use ::si_trace_print::defñ;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Environment variable naming the statistics binary to invoke.
pub const DB_STAT_ENV: &str = "DB_SIZE_DB_STAT";
/// Default path of the statistics binary; `@SBINDIR@` is substituted at
/// package build time.
pub const DB_STAT_PATH_DEFAULT: &str = "@SBINDIR@/slapd_db_stat";

lazy_static! {
    static ref PAGE_SIZE_REGEX: Regex = Regex::new(
        r"(?m)^(\d+)(M?)\tUnderlying database page size$"
    ).unwrap();
    static ref USED_PAGES_REGEX: Regex = Regex::new(
        r"(?m)^(\d+)(M?)\tNumber of tree (\w+) pages$"
    ).unwrap();
    static ref FREE_BYTES_REGEX: Regex = Regex::new(
        r"(?m)^(\d+)(M?)\tNumber of bytes free in tree (\w+) pages \(.*\)$"
    ).unwrap();
}

/// Size figures for one database file, in bytes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DbSizes {
    pub size: u64,
    pub free: u64,
}

impl DbSizes {
    /// Bytes in use. Negative when the report's free bytes exceed the
    /// computed size (the `M` marker rounds to the nearest million, so the
    /// free figure can overshoot); reported as-is, matching the utility's
    /// own arithmetic.
    pub const fn used(&self) -> i64 {
        self.size as i64 - self.free as i64
    }
}

/// One captured report value with its optional `M` (×1,000,000) marker.
fn capture_value(captures: &regex::Captures) -> u64 {
    let mut value: u64 = captures[1].parse::<u64>().unwrap_or(0);
    if !captures[2].is_empty() {
        value *= 1_000_000;
    }
    value
}

/// Extract the size figures from one `db_stat -d` report.
pub fn parse_db_stat_report(report: &str) -> Result<DbSizes, String> {
    let page_size: u64 = match PAGE_SIZE_REGEX.captures(report) {
        Some(captures) => capture_value(&captures),
        None => return Err(String::from("no `Underlying database page size` in report")),
    };

    // 1 for the root page
    let mut pages: u64 = 1;
    for captures in USED_PAGES_REGEX.captures_iter(report) {
        pages += capture_value(&captures);
    }

    let mut free: u64 = 0;
    for captures in FREE_BYTES_REGEX.captures_iter(report) {
        free += capture_value(&captures);
    }
    defñ!("page_size {} pages {} free {}", page_size, pages, free);

    Ok(DbSizes {
        size: pages * page_size,
        free,
    })
}

/// Invoke the statistics binary for one database file and parse its
/// report.
pub fn db_sizes(
    db_stat_path: &FPath,
    db_file: &FPath,
) -> Result<DbSizes, String> {
    let output = Command::new(db_stat_path)
        .arg("-d")
        .arg(db_file)
        .output()
        .map_err(|err| format!("failed to run {:?}: {}", db_stat_path, err))?;
    if !output.status.success() {
        return Err(format!(
            "{:?} -d {:?} exited {}",
            db_stat_path, db_file, output.status
        ));
    }
    let report: String = String::from_utf8_lossy(&output.stdout).to_string();
    parse_db_stat_report(&report).map_err(|err| format!("{:?}: {}", db_file, err))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// report formatting
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Bytes as a MiB string with three decimal places.
pub fn format_b_as_mib(b: i64) -> String {
    format!("{:.3}", b as f64 / 1024.0 / 1024.0)
}

/// The human-readable size/used/free block for one label.
pub fn format_sizes(
    label: &str,
    sizes: &DbSizes,
) -> String {
    format!(
        "{label}: {size} ({size_mib} MiB)\n  Used: {used} ({used_mib} MiB)\n  Free: {free} ({free_mib} MiB)\n",
        label = label,
        size = sizes.size,
        size_mib = format_b_as_mib(sizes.size as i64),
        used = sizes.used(),
        used_mib = format_b_as_mib(sizes.used()),
        free = sizes.free,
        free_mib = format_b_as_mib(sizes.free as i64),
    )
}
