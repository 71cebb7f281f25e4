// src/readers/statsprocessor.rs

//! Implement [`StatsProcessor`], the stats-log reconstruction engine.
//!
//! A `StatsProcessor` consumes tokenized [`StatsLine`]s in input order and
//! maintains the table of live [`Conn`]s, each owning its table of open
//! [`Op`]s. Connection-lifecycle (`fd`) lines open and close connections;
//! operation (`op`) lines are routed through an ordered verb-prefix table
//! that either builds up an operation's request or closes the operation
//! with its result. Each closed operation is emitted immediately as one
//! JSON object, so output order is input order.
//!
//! Single-threaded and single-pass: all state is owned by the one
//! processing loop, the only "concurrency" is the logical multiplexing of
//! connection/operation identities on the line stream.
//!
//! [`StatsProcessor`]: self::StatsProcessor
//! [`StatsLine`]: crate::readers::statslinereader::StatsLine
//! [`Conn`]: crate::data::conn::Conn
//! [`Op`]: crate::data::conn::Op

use crate::common::{ConnId, Count, LineNum, OpId, OP_NONE};
use crate::data::codes::{
    deref_text,
    method_text,
    result_code_text,
    scope_text,
    ResultCode,
};
use crate::data::conn::{Conn, JsonMap, Op, DN_ANONYMOUS};
use crate::data::datetime::{DateTimeL, DateTimeLOpt, TimestampResolver, Year};
use crate::debug::printers::{e_err, e_wrn};
use crate::printer::printers::write_record;
use crate::readers::statslinereader::{LineClass, StatsLine, StatsLineReader};

use std::collections::BTreeMap;
use std::fmt;
use std::io::{BufRead, Result, Write};

use ::chrono::FixedOffset;
use ::lazy_static::lazy_static;
use ::regex::{Captures, Regex};
use ::serde_json::Value;
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// verb dispatch
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The operation verbs recognized on `op` lines.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Verb {
    /// terminal `SEARCH RESULT …`
    SearchResult,
    /// terminal generic `RESULT …`
    Result,
    /// request-building `BIND …`, three mutually exclusive sub-forms
    Bind,
    /// single-line `UNBIND`; request and result collapse into one line
    Unbind,
    /// `SRCH base=…` base/scope/deref/filter
    SearchBase,
    /// `SRCH attr=…` requested attribute list, appended on a later line
    SearchAttrs,
    /// `CMP dn=… attr=…`
    Compare,
    /// `ADD dn="…"`
    Add,
    /// `DEL dn="…"`
    Delete,
    /// `MODRDN dn="…"`
    ModRdn,
    /// `MOD attr=…` modified attribute list, appended on a later line
    ModAttrs,
    /// `MOD dn=…` opens a modify
    ModDn,
    /// `PASSMOD …` password modify
    PassMod,
    /// `WHOAMI`
    WhoAmI,
    /// `STARTTLS`
    StartTls,
    /// `EXT oid=…`; swallowed, not an error
    Ext,
    /// `ABANDON msg=…`; swallowed, not an error
    Abandon,
}

/// The ordered verb-prefix dispatch table; the first matching prefix wins.
///
/// Order is significant for overlapping prefixes: `MODRDN dn="` and
/// `MOD attr=` must be tried before the generic `MOD dn=`, and
/// `SEARCH RESULT ` before `RESULT `. The payload-less verbs `UNBIND`,
/// `WHOAMI`, and `STARTTLS` must match the whole chunk, not a prefix.
const VERB_DISPATCH: &[(&str, Verb)] = &[
    ("SEARCH RESULT ", Verb::SearchResult),
    ("RESULT ", Verb::Result),
    ("BIND ", Verb::Bind),
    ("UNBIND", Verb::Unbind),
    ("SRCH base=", Verb::SearchBase),
    ("SRCH attr=", Verb::SearchAttrs),
    ("CMP ", Verb::Compare),
    ("ADD dn=\"", Verb::Add),
    ("DEL dn=\"", Verb::Delete),
    ("MODRDN dn=\"", Verb::ModRdn),
    ("MOD attr=", Verb::ModAttrs),
    ("MOD dn=", Verb::ModDn),
    ("PASSMOD", Verb::PassMod),
    ("WHOAMI", Verb::WhoAmI),
    ("STARTTLS", Verb::StartTls),
    ("EXT ", Verb::Ext),
    ("ABANDON msg=", Verb::Abandon),
];

lazy_static! {
    /// generic `RESULT` payload; `qtime=`/`etime=` appear in slapd 2.5+
    static ref RESULT_REGEX: Regex = Regex::new(
        r#"^RESULT( tag=(?P<tag>\d+))?( oid=(?P<oid>\S*))? err=(?P<err>\d+)( qtime=(?P<qtime>\d+\.\d+))?( etime=(?P<etime>\d+\.\d+))? text=(?P<text>.*)$"#
    ).unwrap();
    static ref SEARCH_RESULT_REGEX: Regex = Regex::new(
        r#"^SEARCH RESULT tag=(?P<tag>\d+) err=(?P<err>\d+)( qtime=(?P<qtime>\d+\.\d+))?( etime=(?P<etime>\d+\.\d+))? nentries=(?P<nentries>\d+) text=(?P<text>.*)$"#
    ).unwrap();
    static ref BIND_METHOD_REGEX: Regex = Regex::new(
        r#"^BIND dn="(?P<dn>[^"]*)" method=(?P<method>\d+)$"#
    ).unwrap();
    static ref BIND_MECH_REGEX: Regex = Regex::new(
        r#"^BIND (dn="(?P<dn>[^"]*)"|anonymous) mech=(?P<mech>\S+)( sasl_ssf=(?P<sasl_ssf>\d+))? ssf=(?P<ssf>\d+)$"#
    ).unwrap();
    static ref BIND_AUTHCID_REGEX: Regex = Regex::new(
        r#"^BIND authcid="(?P<authcid>[^"]*)" authzid="(?P<authzid>[^"]*)"$"#
    ).unwrap();
    static ref SEARCH_BASE_REGEX: Regex = Regex::new(
        r#"^SRCH base="(?P<base>[^"]*)" scope=(?P<scope>\d+) deref=(?P<deref>\d+) filter="(?P<filter>.*)"$"#
    ).unwrap();
    static ref CMP_REGEX: Regex = Regex::new(
        r#"^CMP dn="(?P<dn>[^"]*)" attr="(?P<attr>[^"]*)"$"#
    ).unwrap();
    static ref MOD_DN_REGEX: Regex = Regex::new(
        r#"^MOD dn="(?P<dn>[^"]*)"$"#
    ).unwrap();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// capture helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn cap_str(
    captures: &Captures,
    name: &str,
) -> Option<String> {
    captures
        .name(name)
        .map(|m| m.as_str().to_string())
}

fn cap_i64(
    captures: &Captures,
    name: &str,
) -> Option<i64> {
    captures
        .name(name)?
        .as_str()
        .parse::<i64>()
        .ok()
}

fn cap_f64(
    captures: &Captures,
    name: &str,
) -> Option<f64> {
    captures
        .name(name)?
        .as_str()
        .parse::<f64>()
        .ok()
}

/// A result field bag for a trivially successful (synthetic or single-line)
/// operation.
fn result_success(line_n: LineNum) -> JsonMap {
    let mut result = JsonMap::new();
    result.insert(String::from("line_n"), Value::from(line_n));
    result.insert(String::from("error"), Value::from(0));
    result.insert(String::from("error_text"), Value::from(result_code_text(0)));

    result
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// StatsSummary
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Accumulated processing counts, printed for CLI option `--summary`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StatsSummary {
    /// lines read from the input source(s)
    pub count_lines: Count,
    /// lines matching the stats-line shape
    pub count_matched: Count,
    /// records emitted
    pub count_records: Count,
    /// per-line payload errors (malformed or unrecognized)
    pub count_errors: Count,
    /// connections opened (`ACCEPT`)
    pub count_conns_opened: Count,
    /// connections closed (`closed`)
    pub count_conns_closed: Count,
    /// operations opened
    pub count_ops_opened: Count,
    /// operations closed by a terminal line
    pub count_ops_closed: Count,
    /// operations discarded by a disconnect before their terminal line
    pub count_ops_dropped: Count,
    /// recognized but deliberately ignored lines (`EXT`, `ABANDON`)
    pub count_swallowed: Count,
}

impl fmt::Display for StatsSummary {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        writeln!(f, "Lines read            : {}", self.count_lines)?;
        writeln!(f, "Lines matched         : {}", self.count_matched)?;
        writeln!(f, "Records emitted       : {}", self.count_records)?;
        writeln!(f, "Line payload errors   : {}", self.count_errors)?;
        writeln!(f, "Lines swallowed       : {}", self.count_swallowed)?;
        writeln!(f, "Connections opened    : {}", self.count_conns_opened)?;
        writeln!(f, "Connections closed    : {}", self.count_conns_closed)?;
        writeln!(f, "Operations opened     : {}", self.count_ops_opened)?;
        writeln!(f, "Operations closed     : {}", self.count_ops_closed)?;
        write!(f, "Operations dropped    : {}", self.count_ops_dropped)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// StatsProcessor
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The stats-log reconstruction engine. See the [module documentation].
///
/// [module documentation]: self
pub struct StatsProcessor<W: Write> {
    /// live connections, keyed by `conn=` identifier
    conns: BTreeMap<ConnId, Conn>,
    resolver: TimestampResolver,
    writer: W,
    /// line numbering carried across input sources
    line_n: LineNum,
    pub summary: StatsSummary,
}

impl<W: Write> StatsProcessor<W> {
    /// New `StatsProcessor` pinning "now" to the current wall-clock for
    /// legacy-timestamp year inference.
    pub fn new(
        tz_offset: FixedOffset,
        writer: W,
    ) -> StatsProcessor<W> {
        let now: DateTimeL = chrono::Local::now().fixed_offset();
        StatsProcessor::new_at(tz_offset, now, writer)
    }

    /// New `StatsProcessor` with an explicit "now" (tests pin this).
    pub fn new_at(
        tz_offset: FixedOffset,
        now: DateTimeL,
        writer: W,
    ) -> StatsProcessor<W> {
        defñ!("StatsProcessor::new_at({:?}, {:?})", tz_offset, now);
        StatsProcessor {
            conns: BTreeMap::new(),
            resolver: TimestampResolver::new(tz_offset, now),
            writer,
            line_n: 0,
            summary: StatsSummary::default(),
        }
    }

    /// The year inferred from the stream's first legacy timestamp, if any.
    pub const fn year_inferred(&self) -> Option<Year> {
        self.resolver.year()
    }

    /// Count of connections still open (no `closed` line yet).
    pub fn conns_open(&self) -> Count {
        self.conns.len() as Count
    }

    /// Count of operations still open across all live connections.
    pub fn ops_open(&self) -> Count {
        self.conns
            .values()
            .map(|conn| conn.ops.len() as Count)
            .sum()
    }

    /// Consume one input source to its end.
    ///
    /// May be called repeatedly for multiple sources; connection state and
    /// line numbering carry over. An `Err` is only returned for failure to
    /// read the source or write a record, never for line-level problems.
    pub fn process(
        &mut self,
        reader: impl BufRead,
    ) -> Result<()> {
        defn!();
        let mut slr = StatsLineReader::new_at(reader, self.line_n);
        loop {
            match slr.find_line()? {
                Some(stats_line) => self.process_line(&stats_line)?,
                None => break,
            }
        }
        self.line_n = slr.line_n();
        self.summary.count_lines += slr.count_lines;
        self.summary.count_matched += slr.count_matched;
        defx!("line_n {}", self.line_n);

        Ok(())
    }

    fn process_line(
        &mut self,
        stats_line: &StatsLine,
    ) -> Result<()> {
        let dt: DateTimeLOpt = self.resolver.resolve(&stats_line.dt_raw);
        match stats_line.what {
            LineClass::Fd => self.process_fd_line(stats_line, dt),
            LineClass::Op => self.process_op_line(stats_line, dt),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // connection lifecycle (`fd` lines)
    // ─────────────────────────────────────────────────────────────────────

    fn process_fd_line(
        &mut self,
        stats_line: &StatsLine,
        dt: DateTimeLOpt,
    ) -> Result<()> {
        let chunk: &str = stats_line.chunk.as_str();
        if chunk.starts_with("ACCEPT from ") {
            self.conn_accept(stats_line, dt)
        } else if chunk.starts_with("TLS ") {
            // deliberate no-record transition; observable only in the TLS
            // field of later records for this connection
            defo!("conn={} TLS established", stats_line.conn);
            let conn: &mut Conn = self
                .conns
                .entry(stats_line.conn)
                .or_insert_with(|| Conn::new(stats_line.conn));
            conn.tls = true;
            conn.dt_last = dt;

            Ok(())
        } else if chunk.starts_with("closed") {
            self.conn_close(stats_line, dt)
        } else {
            e_err!("Invalid `fd` line: {}: {}", stats_line.line_n, stats_line.raw);
            self.summary.count_errors += 1;

            Ok(())
        }
    }

    /// `ACCEPT` line: create the connection and emit the synthetic CONNECT
    /// record.
    fn conn_accept(
        &mut self,
        stats_line: &StatsLine,
        dt: DateTimeLOpt,
    ) -> Result<()> {
        defn!("conn={} fd={}", stats_line.conn, stats_line.id);
        if let Some(conn_prior) = self.conns.get(&stats_line.conn) {
            // slapd reuses conn identifiers; a re-`ACCEPT` without a prior
            // `closed` means the close line was lost, and the prior
            // connection's open operations are unfinishable
            e_wrn!(
                "connection {} accepted again before closing: {}: {}",
                stats_line.conn, stats_line.line_n, stats_line.raw
            );
            self.summary.count_ops_dropped += conn_prior.ops.len() as Count;
        }
        let mut conn: Conn = Conn::new(stats_line.conn);
        conn.fd = stats_line.id;
        conn.dt_last = dt;
        // source address: first `IP=` or `PATH=` prefixed token wins
        let mut source: Option<&str> = None;
        for token in stats_line.chunk.split(' ') {
            if let Some(addr) = token.strip_prefix("IP=") {
                source = Some(addr);
                break;
            }
            if let Some(addr) = token.strip_prefix("PATH=") {
                source = Some(addr);
                break;
            }
        }
        match source {
            Some(addr) => conn.source = addr.to_string(),
            None => {
                e_err!("Unknown `ACCEPT` line: {}: {}", stats_line.line_n, stats_line.raw);
                self.summary.count_errors += 1;
                // still create the connection, with the placeholder source
            }
        }
        self.summary.count_conns_opened += 1;

        // synthetic CONNECT; request and result in one step
        let mut op: Op = Op::new(OP_NONE);
        op.op_type = "CONNECT";
        op.request
            .insert(String::from("line_n"), Value::from(stats_line.line_n));
        op.request_dt = dt;
        op.result = Some(result_success(stats_line.line_n));
        op.result_dt = dt;
        Self::emit(&mut self.writer, &mut self.summary, &conn, op)?;

        self.conns.insert(stats_line.conn, conn);
        defx!();

        Ok(())
    }

    /// `closed` line: emit the synthetic DISCONNECT record, then destroy
    /// the connection, discarding any still-open operations without a
    /// terminal record for them (documented lossy behavior).
    fn conn_close(
        &mut self,
        stats_line: &StatsLine,
        dt: DateTimeLOpt,
    ) -> Result<()> {
        defn!("conn={}", stats_line.conn);
        let mut conn: Conn = match self.conns.remove(&stats_line.conn) {
            Some(conn) => conn,
            // a close for a connection whose accept predates the log
            None => Conn::new(stats_line.conn),
        };
        conn.dt_last = dt;
        let dropped: Count = conn.ops.len() as Count;
        if dropped > 0 {
            defo!("conn={} dropping {} open operations", stats_line.conn, dropped);
            self.summary.count_ops_dropped += dropped;
            conn.ops.clear();
        }
        self.summary.count_conns_closed += 1;

        let mut result: JsonMap = result_success(stats_line.line_n);
        // optional parenthesized close reason, e.g. `closed (connection lost)`
        let chunk: &str = stats_line.chunk.as_str();
        if let Some(at) = chunk.find('(') {
            if at + 1 < chunk.len() {
                result.insert(
                    String::from("text"),
                    Value::from(&chunk[at + 1..chunk.len() - 1]),
                );
            }
        }
        let mut op: Op = Op::new(OP_NONE);
        op.op_type = "DISCONNECT";
        op.request
            .insert(String::from("line_n"), Value::from(stats_line.line_n));
        op.request_dt = dt;
        op.result = Some(result);
        op.result_dt = dt;
        Self::emit(&mut self.writer, &mut self.summary, &conn, op)?;
        defx!();

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // operation verb dispatch (`op` lines)
    // ─────────────────────────────────────────────────────────────────────

    fn process_op_line(
        &mut self,
        stats_line: &StatsLine,
        dt: DateTimeLOpt,
    ) -> Result<()> {
        let verb: Verb = match VERB_DISPATCH
            .iter()
            .find(|(prefix, verb)| match verb {
                // payload-less verbs are the whole chunk
                Verb::Unbind | Verb::WhoAmI | Verb::StartTls => stats_line.chunk == *prefix,
                _ => stats_line.chunk.starts_with(prefix),
            })
        {
            Some((_, verb)) => *verb,
            None => {
                e_err!("Unknown `op` line: {}: {}", stats_line.line_n, stats_line.raw);
                self.summary.count_errors += 1;
                return Ok(());
            }
        };
        defo!("line {} verb {:?}", stats_line.line_n, verb);

        // swallowed verbs change no state at all; do not create a
        // connection for them
        if matches!(verb, Verb::Ext | Verb::Abandon) {
            self.summary.count_swallowed += 1;
            return Ok(());
        }

        // defensively create the connection for an operation line arriving
        // before its `ACCEPT` line (log truncated at the start)
        let conn: &mut Conn = self
            .conns
            .entry(stats_line.conn)
            .or_insert_with(|| Conn::new(stats_line.conn));
        conn.dt_last = dt;
        let op_id: OpId = stats_line.id;
        let op_existed: bool = conn.ops.contains_key(&op_id);

        match verb {
            Verb::Result | Verb::SearchResult => {
                let regex: &Regex = match verb {
                    Verb::SearchResult => &SEARCH_RESULT_REGEX,
                    _ => &RESULT_REGEX,
                };
                let captures: Captures = match regex.captures(&stats_line.chunk) {
                    Some(captures) => captures,
                    None => {
                        e_err!(
                            "Invalid `RESULT` line: {}: {}",
                            stats_line.line_n, stats_line.raw
                        );
                        self.summary.count_errors += 1;
                        return Ok(());
                    }
                };
                let error: ResultCode = match cap_i64(&captures, "err") {
                    Some(error) => error,
                    None => {
                        e_err!(
                            "Invalid `err=` value: {}: {}",
                            stats_line.line_n, stats_line.raw
                        );
                        self.summary.count_errors += 1;
                        return Ok(());
                    }
                };
                let mut result: JsonMap = JsonMap::new();
                result.insert(String::from("line_n"), Value::from(stats_line.line_n));
                if let Some(tag) = cap_i64(&captures, "tag") {
                    result.insert(String::from("tag"), Value::from(tag));
                }
                if let Some(oid) = cap_str(&captures, "oid") {
                    result.insert(String::from("oid"), Value::from(oid));
                }
                if let Some(nentries) = cap_i64(&captures, "nentries") {
                    result.insert(String::from("nentries"), Value::from(nentries));
                }
                result.insert(String::from("error"), Value::from(error));
                result.insert(
                    String::from("error_text"),
                    Value::from(result_code_text(error)),
                );
                if let Some(qtime) = cap_f64(&captures, "qtime") {
                    result.insert(String::from("qtime"), Value::from(qtime));
                }
                if let Some(etime) = cap_f64(&captures, "etime") {
                    result.insert(String::from("etime"), Value::from(etime));
                }
                if let Some(text) = cap_str(&captures, "text") {
                    result.insert(String::from("text"), Value::from(text));
                }
                let op: Op = conn.op_close(op_id, result, dt);
                if error == 0 {
                    match op.op_type {
                        // a successful BIND rebinds the connection identity
                        "BIND" => {
                            conn.dn = op
                                .request
                                .get("dn")
                                .and_then(Value::as_str)
                                .unwrap_or(DN_ANONYMOUS)
                                .to_string();
                        }
                        "STARTTLS" => conn.tls = true,
                        _ => {}
                    }
                }
                if !op_existed {
                    // a terminal line for an operation whose request lines
                    // predate the log still counts as one opened operation,
                    // keeping the opened count covering the closed count
                    self.summary.count_ops_opened += 1;
                }
                self.summary.count_ops_closed += 1;
                let conn: &Conn = &*conn;
                Self::emit(&mut self.writer, &mut self.summary, conn, op)?;
            }
            Verb::Unbind => {
                let dn: String = conn.dn.clone();
                let op_: &mut Op = conn.op_open(op_id, "UNBIND", stats_line.line_n, dt);
                op_.request
                    .insert(String::from("dn"), Value::from(dn));
                let op: Op = conn.op_close(op_id, result_success(stats_line.line_n), dt);
                // the connection reverts to the anonymous identity
                conn.dn = String::from(DN_ANONYMOUS);
                if !op_existed {
                    self.summary.count_ops_opened += 1;
                }
                self.summary.count_ops_closed += 1;
                let conn: &Conn = &*conn;
                Self::emit(&mut self.writer, &mut self.summary, conn, op)?;
            }
            Verb::Bind => {
                // three mutually exclusive sub-forms, in priority order:
                // `method=`, `mech=`, `authcid=`
                if stats_line.chunk.contains(" method=") {
                    let captures: Captures = match BIND_METHOD_REGEX.captures(&stats_line.chunk) {
                        Some(captures) => captures,
                        None => {
                            e_err!(
                                "Invalid `BIND method=` line: {}: {}",
                                stats_line.line_n, stats_line.raw
                            );
                            self.summary.count_errors += 1;
                            return Ok(());
                        }
                    };
                    let method: i64 = cap_i64(&captures, "method").unwrap_or(-1);
                    let op_: &mut Op = conn.op_open(op_id, "BIND", stats_line.line_n, dt);
                    if let Some(dn) = cap_str(&captures, "dn") {
                        op_.request
                            .insert(String::from("dn"), Value::from(dn));
                    }
                    op_.request
                        .insert(String::from("method"), Value::from(method_text(method)));
                } else if stats_line.chunk.contains(" mech=") {
                    let captures: Captures = match BIND_MECH_REGEX.captures(&stats_line.chunk) {
                        Some(captures) => captures,
                        None => {
                            e_err!(
                                "Invalid `BIND mech=` line: {}: {}",
                                stats_line.line_n, stats_line.raw
                            );
                            self.summary.count_errors += 1;
                            return Ok(());
                        }
                    };
                    let op_: &mut Op = conn.op_open(op_id, "BIND", stats_line.line_n, dt);
                    match cap_str(&captures, "dn") {
                        Some(dn) => {
                            op_.request
                                .insert(String::from("dn"), Value::from(dn));
                        }
                        // the `anonymous` alternative matched
                        None => {
                            op_.request
                                .insert(String::from("dn"), Value::from(DN_ANONYMOUS));
                        }
                    }
                    if let Some(mech) = cap_str(&captures, "mech") {
                        op_.request
                            .insert(String::from("mech"), Value::from(mech));
                    }
                    if let Some(sasl_ssf) = cap_i64(&captures, "sasl_ssf") {
                        op_.request
                            .insert(String::from("sasl_ssf"), Value::from(sasl_ssf));
                    }
                    if let Some(ssf) = cap_i64(&captures, "ssf") {
                        op_.request
                            .insert(String::from("ssf"), Value::from(ssf));
                    }
                } else if stats_line.chunk.contains(" authcid=") {
                    let captures: Captures = match BIND_AUTHCID_REGEX.captures(&stats_line.chunk) {
                        Some(captures) => captures,
                        None => {
                            e_err!(
                                "Invalid `BIND authcid=` line: {}: {}",
                                stats_line.line_n, stats_line.raw
                            );
                            self.summary.count_errors += 1;
                            return Ok(());
                        }
                    };
                    let op_: &mut Op = conn.op_open(op_id, "BIND", stats_line.line_n, dt);
                    if let Some(authcid) = cap_str(&captures, "authcid") {
                        op_.request
                            .insert(String::from("authcid"), Value::from(authcid));
                    }
                    if let Some(authzid) = cap_str(&captures, "authzid") {
                        op_.request
                            .insert(String::from("authzid"), Value::from(authzid));
                    }
                } else {
                    e_err!("Invalid `BIND` line: {}: {}", stats_line.line_n, stats_line.raw);
                    self.summary.count_errors += 1;
                    return Ok(());
                }
            }
            Verb::SearchBase => {
                let captures: Captures = match SEARCH_BASE_REGEX.captures(&stats_line.chunk) {
                    Some(captures) => captures,
                    None => {
                        e_err!(
                            "Invalid `SRCH base=` line: {}: {}",
                            stats_line.line_n, stats_line.raw
                        );
                        self.summary.count_errors += 1;
                        return Ok(());
                    }
                };
                let scope: i64 = cap_i64(&captures, "scope").unwrap_or(-1);
                let deref: i64 = cap_i64(&captures, "deref").unwrap_or(-1);
                let op_: &mut Op = conn.op_open(op_id, "SEARCH", stats_line.line_n, dt);
                if let Some(base) = cap_str(&captures, "base") {
                    op_.request
                        .insert(String::from("base"), Value::from(base));
                }
                op_.request
                    .insert(String::from("scope"), Value::from(scope_text(scope)));
                op_.request
                    .insert(String::from("deref"), Value::from(deref_text(deref)));
                if let Some(filter) = cap_str(&captures, "filter") {
                    op_.request
                        .insert(String::from("filter"), Value::from(filter));
                }
            }
            Verb::SearchAttrs => {
                // requested attribute list, a later line of the same search
                let attrs: Vec<Value> = stats_line.chunk["SRCH attr=".len()..]
                    .split(' ')
                    .map(Value::from)
                    .collect();
                let op_: &mut Op = conn.op_augment(op_id);
                op_.request
                    .insert(String::from("attrs"), Value::from(attrs));
            }
            Verb::Compare => {
                let captures: Captures = match CMP_REGEX.captures(&stats_line.chunk) {
                    Some(captures) => captures,
                    None => {
                        e_err!("Invalid `CMP` line: {}: {}", stats_line.line_n, stats_line.raw);
                        self.summary.count_errors += 1;
                        return Ok(());
                    }
                };
                let op_: &mut Op = conn.op_open(op_id, "CMP", stats_line.line_n, dt);
                if let Some(dn) = cap_str(&captures, "dn") {
                    op_.request
                        .insert(String::from("dn"), Value::from(dn));
                }
                if let Some(attr) = cap_str(&captures, "attr") {
                    op_.request
                        .insert(String::from("attr"), Value::from(attr));
                }
            }
            Verb::Add | Verb::Delete | Verb::ModRdn => {
                let (prefix, op_type): (&str, &'static str) = match verb {
                    Verb::Add => ("ADD dn=\"", "ADD"),
                    Verb::Delete => ("DEL dn=\"", "DELETE"),
                    _ => ("MODRDN dn=\"", "MODIFYRDN"),
                };
                let dn: &str = match stats_line
                    .chunk
                    .strip_prefix(prefix)
                    .and_then(|rest| rest.strip_suffix('"'))
                {
                    Some(dn) => dn,
                    None => {
                        e_err!(
                            "Invalid `{}` line: {}: {}",
                            op_type, stats_line.line_n, stats_line.raw
                        );
                        self.summary.count_errors += 1;
                        return Ok(());
                    }
                };
                let dn: String = dn.to_string();
                let op_: &mut Op = conn.op_open(op_id, op_type, stats_line.line_n, dt);
                op_.request
                    .insert(String::from("dn"), Value::from(dn));
            }
            Verb::ModDn => {
                let captures: Captures = match MOD_DN_REGEX.captures(&stats_line.chunk) {
                    Some(captures) => captures,
                    None => {
                        e_err!(
                            "Invalid `MOD dn=` line: {}: {}",
                            stats_line.line_n, stats_line.raw
                        );
                        self.summary.count_errors += 1;
                        return Ok(());
                    }
                };
                let op_: &mut Op = conn.op_open(op_id, "MODIFY", stats_line.line_n, dt);
                if let Some(dn) = cap_str(&captures, "dn") {
                    op_.request
                        .insert(String::from("dn"), Value::from(dn));
                }
            }
            Verb::ModAttrs => {
                // modified attribute list, a later line of the same modify
                let attrs: Vec<Value> = stats_line.chunk["MOD attr=".len()..]
                    .split(' ')
                    .map(Value::from)
                    .collect();
                let op_: &mut Op = conn.op_augment(op_id);
                op_.request
                    .insert(String::from("attrs"), Value::from(attrs));
            }
            Verb::PassMod => {
                let mut dn: Option<String> = None;
                let mut rest: &str = stats_line.chunk.as_str();
                if let Some(after) = stats_line.chunk.strip_prefix("PASSMOD id=\"") {
                    match after.rfind('"') {
                        Some(at) => {
                            dn = Some(after[..at].to_string());
                            rest = &after[at + 1..];
                        }
                        None => {
                            e_err!(
                                "Invalid `PASSMOD` line: {}: {}",
                                stats_line.line_n, stats_line.raw
                            );
                            self.summary.count_errors += 1;
                            return Ok(());
                        }
                    }
                }
                // whether old/new secret material was supplied, not the
                // material itself (never logged)
                let old_supplied: bool = rest.contains(" old");
                let new_supplied: bool = rest.contains(" new");
                let op_: &mut Op = conn.op_open(op_id, "PASSWORD", stats_line.line_n, dt);
                if let Some(dn) = dn {
                    op_.request
                        .insert(String::from("dn"), Value::from(dn));
                }
                op_.request
                    .insert(String::from("old"), Value::from(old_supplied));
                op_.request
                    .insert(String::from("new"), Value::from(new_supplied));
            }
            Verb::WhoAmI => {
                conn.op_open(op_id, "WHOAMI", stats_line.line_n, dt);
            }
            Verb::StartTls => {
                // request only; the TLS flag is set by this operation's
                // successful RESULT, not here
                conn.op_open(op_id, "STARTTLS", stats_line.line_n, dt);
            }
            Verb::Ext | Verb::Abandon => unreachable!("swallowed before dispatch"),
        }

        if !op_existed && self.conns[&stats_line.conn].ops.contains_key(&op_id) {
            self.summary.count_ops_opened += 1;
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // record emission
    // ─────────────────────────────────────────────────────────────────────

    /// Assemble and write one record for a closed operation: the owning
    /// connection's public fields merged with the operation's identifier,
    /// verb, request, and result.
    ///
    /// Associated function, not a method: callers hold a borrow into
    /// `self.conns` while writing through `self.writer`.
    fn emit(
        writer: &mut W,
        summary: &mut StatsSummary,
        conn: &Conn,
        op: Op,
    ) -> Result<()> {
        let mut result: JsonMap = op.result.unwrap_or_default();
        if !result.contains_key("etime") {
            // no explicit elapsed time in the log; derive it from the
            // request and result instants when both were recorded
            if let (Some(request_dt), Some(result_dt)) = (op.request_dt, op.result_dt) {
                let elapsed: f64 = (result_dt - request_dt)
                    .num_microseconds()
                    .map(|us| us as f64 / 1e6)
                    .unwrap_or_default();
                result.insert(String::from("etime"), Value::from(elapsed));
            }
        }

        let mut record: JsonMap = JsonMap::new();
        record.insert(String::from("conn"), Value::from(conn.conn));
        record.insert(String::from("fd"), Value::from(conn.fd));
        record.insert(String::from("source"), Value::from(conn.source.as_str()));
        record.insert(String::from("tls"), Value::from(conn.tls));
        record.insert(String::from("dn"), Value::from(conn.dn.as_str()));
        record.insert(String::from("op"), Value::from(op.op));
        record.insert(String::from("op_type"), Value::from(op.op_type));
        record.insert(String::from("op_request"), Value::Object(op.request));
        record.insert(String::from("op_result"), Value::Object(result));
        write_record(writer, &record)?;
        summary.count_records += 1;

        Ok(())
    }
}
