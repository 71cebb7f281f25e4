// src/data/conn.rs

//! Implement the [`Conn`] and [`Op`] state records.
//!
//! A stats log multiplexes many concurrent client connections onto one line
//! stream. A [`Conn`] holds the per-connection state accumulated across
//! lines, keyed by the source-assigned `conn=` identifier. Each `Conn` owns
//! a table of open [`Op`]s keyed by the `op=` identifier, which is unique
//! _within that connection only_.
//!
//! State changes only through the named transitions [`Conn::op_open`],
//! [`Conn::op_augment`], and [`Conn::op_close`].
//!
//! [`Conn`]: self::Conn
//! [`Op`]: self::Op

use crate::common::{ConnId, Fd, LineNum, OpId, FD_NONE};
use crate::data::datetime::DateTimeLOpt;

use std::collections::BTreeMap;

use ::serde_json::Value;
use ::si_trace_print::defñ;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A JSON object under construction; the request and result "field bags"
/// whose schema varies by verb.
pub type JsonMap = serde_json::Map<String, Value>;

/// Placeholder for a connection source address that could not be parsed
/// from its `ACCEPT` line (or whose `ACCEPT` line never appeared).
pub const SOURCE_UNKNOWN: &str = "UNKNOWN";

/// The anonymous bound-identity sentinel. A connection is bound to this
/// until a successful BIND, and again after an UNBIND.
pub const DN_ANONYMOUS: &str = "anonymous";

/// Verb sentinel for an [`Op`] whose request-building line has not (yet)
/// been seen.
pub const OP_TYPE_UNKNOWN: &str = "UNKNOWN";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Op
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One in-flight operation, accumulated across multiple lines until a
/// terminal line closes it.
///
/// The identifier is scoped to the owning [`Conn`]; an `Op` is only ever
/// reached through its connection's table.
#[derive(Clone, Debug)]
pub struct Op {
    /// `op=` identifier
    pub op: OpId,
    /// the verb, e.g. `"BIND"`; set exactly once, [`OP_TYPE_UNKNOWN`] until
    /// then
    pub op_type: &'static str,
    /// request field bag, filled incrementally across lines
    pub request: JsonMap,
    /// result field bag, filled exactly once by the closing line
    pub result: Option<JsonMap>,
    /// instant of the first request-building line
    pub request_dt: DateTimeLOpt,
    /// instant of the closing line
    pub result_dt: DateTimeLOpt,
}

impl Op {
    pub fn new(op: OpId) -> Op {
        Op {
            op,
            op_type: OP_TYPE_UNKNOWN,
            request: JsonMap::new(),
            result: None,
            request_dt: None,
            result_dt: None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Conn
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One live client connection.
///
/// Created lazily on the first line referencing its `conn=` identifier
/// (normally the `ACCEPT` line; defensively, any `op` line arriving before
/// one). Destroyed on its `closed` line, which discards any still-open
/// [`Op`]s.
#[derive(Clone, Debug)]
pub struct Conn {
    /// `conn=` identifier
    pub conn: ConnId,
    /// file descriptor number, [`FD_NONE`] until the `ACCEPT` line
    pub fd: Fd,
    /// source address, `IP=…` or `PATH=…` from the `ACCEPT` line
    pub source: String,
    /// TLS active? set by the `fd` `TLS` line or a successful STARTTLS
    pub tls: bool,
    /// currently-bound identity
    pub dn: String,
    /// instant of the most recent line for this connection
    pub dt_last: DateTimeLOpt,
    /// open operations, keyed by `op=` identifier
    pub ops: BTreeMap<OpId, Op>,
}

impl Conn {
    pub fn new(conn: ConnId) -> Conn {
        defñ!("Conn::new({})", conn);
        Conn {
            conn,
            fd: FD_NONE,
            source: String::from(SOURCE_UNKNOWN),
            tls: false,
            dn: String::from(DN_ANONYMOUS),
            dt_last: None,
            ops: BTreeMap::new(),
        }
    }

    /// Open an operation (or retrieve the already-open one) and assign its
    /// verb.
    ///
    /// The verb is assigned only if still [`OP_TYPE_UNKNOWN`]; a later
    /// request-building line for the same identifier augments fields but
    /// never changes the verb. Records the request instant and the 1-based
    /// `line_n` of the opening line on first assignment.
    pub fn op_open(
        &mut self,
        op: OpId,
        op_type: &'static str,
        line_n: LineNum,
        dt: DateTimeLOpt,
    ) -> &mut Op {
        let op_ = self
            .ops
            .entry(op)
            .or_insert_with(|| Op::new(op));
        if op_.op_type == OP_TYPE_UNKNOWN {
            op_.op_type = op_type;
            op_.request
                .insert(String::from("line_n"), Value::from(line_n));
            op_.request_dt = dt;
        }

        op_
    }

    /// Retrieve an open operation to add request fields to, creating it if
    /// absent (an augmenting line may arrive before the verb line when the
    /// start of the log was truncated).
    pub fn op_augment(
        &mut self,
        op: OpId,
    ) -> &mut Op {
        self.ops
            .entry(op)
            .or_insert_with(|| Op::new(op))
    }

    /// Close an operation: remove it from the table, attach the result
    /// field bag and result instant, and return it for emission.
    ///
    /// An unknown identifier yields a fresh [`Op`] with verb
    /// [`OP_TYPE_UNKNOWN`] (a terminal line whose request lines predate the
    /// log).
    pub fn op_close(
        &mut self,
        op: OpId,
        result: JsonMap,
        dt: DateTimeLOpt,
    ) -> Op {
        let mut op_: Op = match self.ops.remove(&op) {
            Some(op_) => op_,
            None => Op::new(op),
        };
        op_.result = Some(result);
        op_.result_dt = dt;

        op_
    }
}
