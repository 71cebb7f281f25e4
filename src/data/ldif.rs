// src/data/ldif.rs

//! LDIF entry comparison: value decoding, per-attribute grouping, and the
//! change-script ("diff") driver used by the `ldifdiff` binary.
//!
//! Base64-encoded values (`attr:: …`) are decoded for *comparison only*;
//! emitted change blocks carry the attribute lines as they appeared in the
//! input.

use crate::readers::ldifreader::{LdifEntry, LdifReader};

use std::collections::BTreeMap;
use std::io::{BufRead, Error, ErrorKind, Result, Write};

use ::base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use ::base64::Engine;
use ::lazy_static::lazy_static;
use ::regex::Regex;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

lazy_static! {
    /// an attribute line, plain (`:`) or base64 (`::`) valued
    static ref KV_REGEX: Regex = Regex::new(
        r"^(?P<key>[A-Za-z][-.;0-9A-Za-z]*)::? *(?P<value>.*)"
    ).unwrap();
    /// an attribute line with a base64 (`::`) value
    static ref KV_B64_REGEX: Regex = Regex::new(
        r"^(?P<key>[A-Za-z][-.;0-9A-Za-z]*):: *(?P<value>.*)"
    ).unwrap();
}

/// Attribute lines grouped by attribute name. Each value is the
/// concatenation of that attribute's lines, each `\n`-terminated
/// (multi-valued attributes keep all their lines together).
pub type AttrLines = BTreeMap<String, String>;

/// Decode an entry's base64 values and sort its lines, producing the
/// canonical form used for equality comparison.
pub fn entry_decode(text: &str) -> Result<String> {
    let mut decoded: Vec<String> = Vec::new();
    for kv in text.split('\n') {
        match KV_B64_REGEX.captures(kv) {
            Some(captures) => {
                let value: Vec<u8> = BASE64_STANDARD
                    .decode(&captures["value"])
                    .map_err(|err| {
                        Error::new(
                            ErrorKind::InvalidData,
                            format!("Invalid base64 value in line {:?}: {}", kv, err),
                        )
                    })?;
                // TODO: support `\n` in a decoded value
                decoded.push(format!(
                    "{}: {}",
                    &captures["key"],
                    String::from_utf8_lossy(&value)
                ));
            }
            None => decoded.push(kv.to_string()),
        }
    }
    decoded.sort();

    Ok(decoded.join("\n"))
}

/// Group an entry's attribute lines by attribute name.
pub fn entry_attrs(text: &str) -> Result<AttrLines> {
    let mut attrs: AttrLines = AttrLines::new();
    if text.is_empty() {
        return Ok(attrs);
    }
    for kv in text.split('\n') {
        match KV_REGEX.captures(kv) {
            Some(captures) => {
                let entry = attrs
                    .entry(captures["key"].to_string())
                    .or_default();
                entry.push_str(kv);
                entry.push('\n');
            }
            None => {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    format!("Invalid line in entry: {}", kv),
                ));
            }
        }
    }

    Ok(attrs)
}

/// Build one `changetype: modify` block for an entry present in both files
/// with differing decoded forms: per-attribute `delete`, `replace`, and
/// `add` directives.
pub fn modify_block(
    old_text: &str,
    new_text: &str,
    old_decoded: &str,
    new_decoded: &str,
    dn: &str,
) -> Result<String> {
    let old_attrs: AttrLines = entry_attrs(old_text)
        .map_err(|err| Error::new(ErrorKind::InvalidData, format!("Invalid data in old entry: {}: {}", dn, err)))?;
    let old_attrs_decoded: AttrLines = entry_attrs(old_decoded)
        .map_err(|err| Error::new(ErrorKind::InvalidData, format!("Invalid data in old decoded entry: {}: {}", dn, err)))?;
    let mut new_attrs: AttrLines = entry_attrs(new_text)
        .map_err(|err| Error::new(ErrorKind::InvalidData, format!("Invalid data in new entry: {}: {}", dn, err)))?;
    let new_attrs_decoded: AttrLines = entry_attrs(new_decoded)
        .map_err(|err| Error::new(ErrorKind::InvalidData, format!("Invalid data in new decoded entry: {}: {}", dn, err)))?;

    let mut block: String = String::new();
    block.push_str(&format!("dn: {}\n", dn));
    block.push_str("changetype: modify\n");

    for key in old_attrs.keys() {
        if !new_attrs.contains_key(key) {
            block.push_str(&format!("delete: {}\n-\n", key));
            continue;
        }
        if old_attrs_decoded.get(key) != new_attrs_decoded.get(key) {
            block.push_str(&format!("replace: {}\n", key));
            block.push_str(&new_attrs[key]);
            block.push_str("-\n");
        }
        new_attrs.remove(key);
    }
    for (key, lines) in new_attrs.iter() {
        block.push_str(&format!("add: {}\n", key));
        block.push_str(lines);
        block.push_str("-\n");
    }
    block.push('\n');

    Ok(block)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// diff driver
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One side's pending entries: content by DN, plus DN insertion order for
/// the leftover-ordering tie-break.
#[derive(Default)]
struct EntrySet {
    entries: BTreeMap<String, String>,
    decoded: BTreeMap<String, String>,
    order: Vec<String>,
}

impl EntrySet {
    fn insert(
        &mut self,
        entry: LdifEntry,
    ) {
        // a duplicate DN within one file keeps its first order position,
        // last content; it must not yield two change blocks
        if !self.entries.contains_key(&entry.dn) {
            self.order.push(entry.dn.clone());
        }
        self.decoded.remove(&entry.dn);
        self.entries.insert(entry.dn, entry.text);
    }

    fn decoded_of(
        &mut self,
        dn: &str,
    ) -> Result<String> {
        if let Some(decoded) = self.decoded.get(dn) {
            return Ok(decoded.clone());
        }
        let decoded: String = entry_decode(&self.entries[dn])?;
        self.decoded
            .insert(dn.to_string(), decoded.clone());

        Ok(decoded)
    }

    fn remove(
        &mut self,
        dn: &str,
    ) {
        self.entries.remove(dn);
        self.decoded.remove(dn);
    }

    /// DNs still pending, in input order.
    fn leftover_dns(&self) -> Vec<&String> {
        self.order
            .iter()
            .filter(|dn| self.entries.contains_key(*dn))
            .collect()
    }
}

/// Compare two LDIF files and write a change script: delete blocks for
/// entries only in the old file (by decreasing DN length), add blocks for
/// entries only in the new file (by increasing DN length), then modify
/// blocks for entries in both whose decoded forms differ.
///
/// The length ordering with input-order tie-break reproduces the change
/// scripts existing consumers expect; deletes must remove leaf entries
/// before their parents, adds the reverse.
pub fn ldif_diff<RO: BufRead, RN: BufRead, W: Write>(
    mut old_reader: LdifReader<RO>,
    mut new_reader: LdifReader<RN>,
    writer: &mut W,
) -> Result<()> {
    let mut old_set: EntrySet = EntrySet::default();
    let mut new_set: EntrySet = EntrySet::default();
    // modify blocks are buffered and printed after the delete/add blocks
    let mut modify_buf: String = String::new();

    loop {
        let old_entry: Option<LdifEntry> = old_reader.next_entry()?;
        let new_entry: Option<LdifEntry> = new_reader.next_entry()?;
        let mut seen_dns: Vec<String> = Vec::new();
        match (&old_entry, &new_entry) {
            (None, None) => break,
            _ => {}
        }
        if let Some(entry) = old_entry {
            seen_dns.push(entry.dn.clone());
            old_set.insert(entry);
        }
        if let Some(entry) = new_entry {
            seen_dns.push(entry.dn.clone());
            new_set.insert(entry);
        }

        // an entry present on both sides is resolved as soon as its
        // counterpart appears; both files in parallel, bounded memory for
        // same-ordered inputs
        for dn in seen_dns.iter() {
            if !old_set.entries.contains_key(dn) || !new_set.entries.contains_key(dn) {
                continue;
            }
            let old_decoded: String = old_set.decoded_of(dn)?;
            let new_decoded: String = new_set.decoded_of(dn)?;
            if old_decoded != new_decoded {
                modify_buf.push_str(&modify_block(
                    &old_set.entries[dn],
                    &new_set.entries[dn],
                    &old_decoded,
                    &new_decoded,
                    dn,
                )?);
            }
            old_set.remove(dn);
            new_set.remove(dn);
        }
    }

    // entries only in the old file: delete, longest DN first (leaves before
    // parents)
    let mut delete_dns: Vec<&String> = old_set.leftover_dns();
    delete_dns.sort_by(|a, b| b.len().cmp(&a.len()));
    for dn in delete_dns.into_iter() {
        writeln!(writer, "dn: {}", dn)?;
        writeln!(writer, "changetype: delete")?;
        writeln!(writer)?;
    }

    // entries only in the new file: add, shortest DN first (parents before
    // leaves)
    let mut add_dns: Vec<&String> = new_set.leftover_dns();
    add_dns.sort_by(|a, b| a.len().cmp(&b.len()));
    for dn in add_dns.into_iter() {
        writeln!(writer, "dn: {}", dn)?;
        writeln!(writer, "changetype: add")?;
        writeln!(writer, "{}", new_set.entries[dn])?;
        writeln!(writer)?;
    }

    writer.write_all(modify_buf.as_bytes())?;

    Ok(())
}
