// src/tests/statslinereader_tests.rs

//! Tests for [`crate::readers::statslinereader`].

use crate::data::datetime::RawTimestamp;
use crate::readers::statslinereader::{
    parse_stats_line,
    LineClass,
    StatsLine,
    StatsLineReader,
};

use std::io::Cursor;

use ::test_case::test_case;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn test_parse_legacy_fd_line() {
    let line: &str =
        "Jan  1 00:00:01 host slapd[123]: conn=1 fd=3 ACCEPT from IP=10.0.0.1:1 (IP=0.0.0.0:389)";
    let sl: StatsLine = parse_stats_line(line, 1).unwrap();
    assert_eq!(sl.line_n, 1);
    assert_eq!(sl.raw, line);
    assert_eq!(sl.dt_raw, RawTimestamp::Legacy(String::from("Jan  1 00:00:01")));
    assert_eq!(sl.conn, 1);
    assert_eq!(sl.what, LineClass::Fd);
    assert_eq!(sl.id, 3);
    assert_eq!(sl.chunk, "ACCEPT from IP=10.0.0.1:1 (IP=0.0.0.0:389)");
}

#[test]
fn test_parse_legacy_two_digit_day() {
    let line: &str = "Dec 25 13:45:00 host slapd[123]: conn=42 op=7 UNBIND";
    let sl: StatsLine = parse_stats_line(line, 9).unwrap();
    assert_eq!(sl.dt_raw, RawTimestamp::Legacy(String::from("Dec 25 13:45:00")));
    assert_eq!(sl.conn, 42);
    assert_eq!(sl.what, LineClass::Op);
    assert_eq!(sl.id, 7);
    assert_eq!(sl.chunk, "UNBIND");
}

#[test]
fn test_parse_iso_op_line() {
    let line: &str = "2023-06-05T08:30:00.123456+09:00 ldap1 slapd[99]: conn=1000 op=2 SRCH base=\"dc=example,dc=com\" scope=2 deref=0 filter=\"(objectClass=*)\"";
    let sl: StatsLine = parse_stats_line(line, 1).unwrap();
    assert_eq!(
        sl.dt_raw,
        RawTimestamp::Iso(String::from("2023-06-05T08:30:00.123456+09:00"))
    );
    assert_eq!(sl.conn, 1000);
    assert_eq!(sl.what, LineClass::Op);
    assert_eq!(sl.id, 2);
    assert!(sl.chunk.starts_with("SRCH base="));
}

#[test_case(""; "empty")]
#[test_case("slapd starting"; "startup banner")]
#[test_case("Jan  1 00:00:01 host slapd[1]: bdb_monitor_db_open: monitoring disabled"; "no conn")]
#[test_case("Jan  1 00:00:01 host slapd[1]: conn=1 ACCEPT from IP=10.0.0.1:1"; "no fd or op")]
#[test_case("Jan  1 00:00:01 host slapd[1]: conn=1 fd=3"; "no chunk")]
#[test_case("2023-06-05 08:30:00 host slapd[1]: conn=1 op=0 UNBIND"; "timestamp missing T")]
#[test_case("conn=1 op=0 UNBIND"; "no timestamp")]
fn test_parse_non_matching(line: &str) {
    assert!(parse_stats_line(line, 1).is_none(), "unexpectedly matched {:?}", line);
}

// ─────────────────────────────────────────────────────────────────────────
// StatsLineReader
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn test_reader_skips_noise() {
    let input: String = [
        "slapd starting",
        "Jan  1 00:00:01 host slapd[1]: conn=1 fd=3 ACCEPT from IP=10.0.0.1:1 (IP=0.0.0.0:389)",
        "some unrelated noise",
        "Jan  1 00:00:02 host slapd[1]: conn=1 op=0 UNBIND",
        "",
    ]
    .join("\n");
    let mut reader = StatsLineReader::new(Cursor::new(input));
    let sl: StatsLine = reader.find_line().unwrap().unwrap();
    assert_eq!(sl.line_n, 2);
    assert_eq!(sl.what, LineClass::Fd);
    let sl: StatsLine = reader.find_line().unwrap().unwrap();
    assert_eq!(sl.line_n, 4);
    assert_eq!(sl.what, LineClass::Op);
    assert!(reader.find_line().unwrap().is_none());
    assert_eq!(reader.count_lines, 4);
    assert_eq!(reader.count_matched, 2);
}

#[test]
fn test_reader_handles_crlf() {
    let input: &str =
        "Jan  1 00:00:01 host slapd[1]: conn=1 op=0 UNBIND\r\n";
    let mut reader = StatsLineReader::new(Cursor::new(input));
    let sl: StatsLine = reader.find_line().unwrap().unwrap();
    assert_eq!(sl.chunk, "UNBIND");
}

#[test]
fn test_reader_new_at_continues_numbering() {
    let input: &str = "Jan  1 00:00:01 host slapd[1]: conn=1 op=0 UNBIND\n";
    let mut reader = StatsLineReader::new_at(Cursor::new(input), 10);
    let sl: StatsLine = reader.find_line().unwrap().unwrap();
    assert_eq!(sl.line_n, 11);
    assert_eq!(reader.line_n(), 11);
}
