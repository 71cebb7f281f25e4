// src/readers/ldifreader.rs

//! Implement [`LdifReader`], grouping the lines of an LDIF file into
//! entries keyed by their leading `dn:` line.
//!
//! Framing rules: a blank line ends an entry; `#` comment lines are
//! skipped; a line starting with a space continues the previous attribute
//! line ("wrapping"); attribute selection is applied per line through an
//! [`AttrFilter`]. Malformed framing is a descriptive error that aborts the
//! run (these files are inputs the operator controls, unlike the noisy
//! stats log).
//!
//! [`LdifReader`]: self::LdifReader

use std::collections::HashSet;
use std::io::{BufRead, Error, ErrorKind, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Operational attributes excluded from comparison by default; they change
/// on every write and would make every entry differ.
pub const EXCLUDE_ATTRS_DEFAULT: &[&str] = &[
    "modifyTimestamp",
    "modifiersName",
    "contextCSN",
    "entryCSN",
    "entryUUID",
    "createTimestamp",
    "creatorsName",
    "structuralObjectClass",
    "entryDN",
    "subschemaSubentry",
    "numSubordinates",
    "hasSubordinates",
];

/// Which attributes of an entry take part in the comparison.
#[derive(Clone, Debug, Default)]
pub struct AttrFilter {
    /// compare only these attributes (positional `ATTRIBUTE` arguments);
    /// when non-empty, `include`/`exclude` are not consulted
    pub target: Vec<String>,
    /// attributes re-included despite `exclude`
    pub include: HashSet<String>,
    /// attributes excluded from comparison
    pub exclude: HashSet<String>,
}

impl AttrFilter {
    /// The default filter: no targets, the operational-attribute exclusion
    /// set.
    pub fn new() -> AttrFilter {
        AttrFilter {
            target: Vec::new(),
            include: HashSet::new(),
            exclude: EXCLUDE_ATTRS_DEFAULT
                .iter()
                .map(|attr| attr.to_string())
                .collect(),
        }
    }

    /// Should attribute `key` be skipped?
    pub fn skip(
        &self,
        key: &str,
    ) -> bool {
        if !self.target.is_empty() {
            return !key.eq_ignore_ascii_case("dn")
                && !self
                    .target
                    .iter()
                    .any(|target| target == key);
        }
        !self.include.contains(key) && self.exclude.contains(key)
    }
}

/// One LDIF entry: its distinguished name and its (filtered) attribute
/// lines, wrapping already undone, joined by `\n` without the `dn:` line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LdifEntry {
    pub dn: String,
    pub text: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LdifReader
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Reads [`LdifEntry`]s one at a time from a [`BufRead`] source.
pub struct LdifReader<R: BufRead> {
    reader: R,
    filter: AttrFilter,
}

impl<R: BufRead> LdifReader<R> {
    pub fn new(
        reader: R,
        filter: AttrFilter,
    ) -> LdifReader<R> {
        LdifReader { reader, filter }
    }

    /// Read the next entry. Returns `Ok(None)` at end of input.
    pub fn next_entry(&mut self) -> Result<Option<LdifEntry>> {
        let mut buf: String = String::new();
        let mut key: String = String::new();
        let mut skipped: bool = false;
        let mut line: String = String::new();

        loop {
            line.clear();
            let sz: usize = self.reader.read_line(&mut line)?;
            if sz == 0 {
                break;
            }
            let line: &str = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                if !buf.is_empty() {
                    // end of entry
                    break;
                }
                // skip heading empty lines
                continue;
            }
            if line.starts_with('#') {
                skipped = true;
                continue;
            }
            if let Some(wrapped) = line.strip_prefix(' ') {
                // continuation of the previous attribute line
                if !skipped {
                    if key.is_empty() {
                        return Err(Error::new(
                            ErrorKind::InvalidData,
                            format!("Wrapped line without attribute name found: {}", line),
                        ));
                    }
                    buf.push_str(wrapped);
                }
                continue;
            }
            let colon: usize = match line.find(':') {
                Some(colon) if colon > 0 => colon,
                _ => {
                    return Err(Error::new(
                        ErrorKind::InvalidData,
                        format!("Invalid attribute line (no colon `:`): {}", line),
                    ));
                }
            };
            key = line[..colon].to_string();
            if self.filter.skip(&key) {
                skipped = true;
                continue;
            }
            skipped = false;
            if !buf.is_empty() {
                buf.push('\n');
            }
            buf.push_str(line);
        }

        if buf.is_empty() {
            return Ok(None);
        }

        if !buf
            .get(..3)
            .map_or(false, |head| head.eq_ignore_ascii_case("dn:"))
        {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("No DN line in entry: {}", buf),
            ));
        }

        let (dn_line, text): (&str, &str) = match buf.find('\n') {
            Some(lf) => (&buf[..lf], &buf[lf + 1..]),
            None => (buf.as_str(), ""),
        };
        // TODO: support a base64-encoded DN value (`dn:: …`)
        let dn: String = dn_line[3..].trim_start().to_string();

        Ok(Some(LdifEntry {
            dn,
            text: text.to_string(),
        }))
    }
}
