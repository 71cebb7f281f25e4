// src/tests/conn_tests.rs

//! Tests for [`crate::data::conn`].

use crate::common::{FD_NONE, OP_NONE};
use crate::data::conn::{
    Conn,
    JsonMap,
    Op,
    DN_ANONYMOUS,
    OP_TYPE_UNKNOWN,
    SOURCE_UNKNOWN,
};

use ::serde_json::Value;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn test_conn_new_defaults() {
    let conn: Conn = Conn::new(5);
    assert_eq!(conn.conn, 5);
    assert_eq!(conn.fd, FD_NONE);
    assert_eq!(conn.source, SOURCE_UNKNOWN);
    assert!(!conn.tls);
    assert_eq!(conn.dn, DN_ANONYMOUS);
    assert!(conn.dt_last.is_none());
    assert!(conn.ops.is_empty());
}

#[test]
fn test_op_new_defaults() {
    let op: Op = Op::new(OP_NONE);
    assert_eq!(op.op, OP_NONE);
    assert_eq!(op.op_type, OP_TYPE_UNKNOWN);
    assert!(op.request.is_empty());
    assert!(op.result.is_none());
}

#[test]
fn test_op_open_assigns_verb_once() {
    let mut conn: Conn = Conn::new(1);
    let op_: &mut Op = conn.op_open(0, "SEARCH", 3, None);
    assert_eq!(op_.op_type, "SEARCH");
    assert_eq!(op_.request["line_n"], 3);
    // a later opening line for the same identifier must not reassign the
    // verb nor the opening line number
    let op_: &mut Op = conn.op_open(0, "BIND", 7, None);
    assert_eq!(op_.op_type, "SEARCH");
    assert_eq!(op_.request["line_n"], 3);
    assert_eq!(conn.ops.len(), 1);
}

#[test]
fn test_op_augment_creates_without_verb() {
    let mut conn: Conn = Conn::new(1);
    let op_: &mut Op = conn.op_augment(2);
    assert_eq!(op_.op_type, OP_TYPE_UNKNOWN);
    op_.request
        .insert(String::from("attrs"), Value::from(vec!["cn"]));
    assert!(conn.ops.contains_key(&2));
}

#[test]
fn test_op_close_removes_and_attaches_result() {
    let mut conn: Conn = Conn::new(1);
    conn.op_open(0, "ADD", 1, None);
    let mut result: JsonMap = JsonMap::new();
    result.insert(String::from("error"), Value::from(0));
    let op: Op = conn.op_close(0, result, None);
    assert_eq!(op.op_type, "ADD");
    assert_eq!(op.result.unwrap()["error"], 0);
    assert!(conn.ops.is_empty());
}

#[test]
fn test_op_close_unknown_id_yields_unknown_verb() {
    // a terminal line whose request lines predate the log
    let mut conn: Conn = Conn::new(1);
    let op: Op = conn.op_close(9, JsonMap::new(), None);
    assert_eq!(op.op, 9);
    assert_eq!(op.op_type, OP_TYPE_UNKNOWN);
    assert!(op.request.is_empty());
}

#[test]
fn test_ops_independent_within_conn() {
    let mut conn: Conn = Conn::new(1);
    conn.op_open(0, "SEARCH", 1, None);
    conn.op_open(1, "ADD", 2, None);
    assert_eq!(conn.ops.len(), 2);
    let op: Op = conn.op_close(1, JsonMap::new(), None);
    assert_eq!(op.op_type, "ADD");
    assert_eq!(conn.ops.len(), 1);
    assert_eq!(conn.ops[&0].op_type, "SEARCH");
}
