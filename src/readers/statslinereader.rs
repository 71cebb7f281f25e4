// src/readers/statslinereader.rs

//! Implement [`StatsLineReader`], the stats-log line tokenizer.
//!
//! One anchored pattern splits a raw line into timestamp, host and process
//! metadata, `conn=` identifier, a `fd`|`op` discriminator with its numeric
//! identifier, and the trailing content chunk. Lines not matching the
//! pattern are arbitrary log noise (startup banners, other subsystems) and
//! are skipped silently; they must never abort processing.
//!
//! [`StatsLineReader`]: self::StatsLineReader

use crate::common::{ConnId, Count, LineNum};
use crate::data::datetime::RawTimestamp;

use std::io::{BufRead, Result};

use ::lazy_static::lazy_static;
use ::regex::Regex;
use ::si_trace_print::defñ;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The anchored stats-line pattern.
///
/// The timestamp alternation is mutually exclusive: either the legacy
/// syslog shape `%b %e %H:%M:%S` (year-less, `Jan  1 00:00:01`) or ISO-8601
/// with an explicit offset. The host and process tag are captured but
/// ignored downstream.
const STATS_LINE_PATTERN: &str = r#"(?x)
    ^
    (?:
        (?P<dt_legacy>[A-Z][a-z]{2}\x20[\x200-9]\d\x20\d{2}:\d{2}:\d{2})
        |
        (?P<dt_iso>\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2}))
    )
    \x20+
    (?P<host>\S+)
    \x20+
    (?P<tag>[^\x20:]+):
    \x20
    conn=(?P<conn>\d+)
    \x20
    (?P<what>fd|op)=(?P<id>\d+)
    \x20
    (?P<chunk>.*)
    $"#;

lazy_static! {
    static ref STATS_LINE_REGEX: Regex = Regex::new(STATS_LINE_PATTERN).unwrap();
}

/// Is the line a connection-lifecycle line (`fd=`) or an operation line
/// (`op=`)?
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineClass {
    Fd,
    Op,
}

/// One tokenized stats-log line.
#[derive(Clone, Debug)]
pub struct StatsLine {
    /// 1-based line number within the input stream
    pub line_n: LineNum,
    /// the raw line, kept for diagnostics
    pub raw: String,
    /// the timestamp substring, not yet resolved to an instant
    pub dt_raw: RawTimestamp,
    /// `conn=` identifier
    pub conn: ConnId,
    /// `fd` or `op` discriminator
    pub what: LineClass,
    /// the numeric identifier following the discriminator
    pub id: i64,
    /// the remainder of the line after the discriminator
    pub chunk: String,
}

/// Tokenize one raw line. Returns `None` for a line that does not match the
/// stats-line shape.
pub fn parse_stats_line(
    line: &str,
    line_n: LineNum,
) -> Option<StatsLine> {
    let captures = STATS_LINE_REGEX.captures(line)?;
    let dt_raw: RawTimestamp = match captures.name("dt_legacy") {
        Some(match_) => RawTimestamp::Legacy(match_.as_str().to_string()),
        None => RawTimestamp::Iso(
            captures
                .name("dt_iso")?
                .as_str()
                .to_string(),
        ),
    };
    // the `conn`, `what`, and `id` groups are all guaranteed by the pattern
    let conn: ConnId = captures
        .name("conn")?
        .as_str()
        .parse::<ConnId>()
        .ok()?;
    let what: LineClass = match captures
        .name("what")?
        .as_str()
    {
        "fd" => LineClass::Fd,
        _ => LineClass::Op,
    };
    let id: i64 = captures
        .name("id")?
        .as_str()
        .parse::<i64>()
        .ok()?;
    let chunk: String = captures
        .name("chunk")?
        .as_str()
        .to_string();
    defñ!("line {} conn={} {:?}={} chunk {:?}", line_n, conn, what, id, chunk);

    Some(StatsLine {
        line_n,
        raw: line.to_string(),
        dt_raw,
        conn,
        what,
        id,
        chunk,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// StatsLineReader
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Wraps a [`BufRead`] source and yields tokenized [`StatsLine`]s,
/// silently skipping non-matching lines. Line numbering continues across
/// sources fed to the same reader's processor.
pub struct StatsLineReader<R: BufRead> {
    reader: R,
    line_n: LineNum,
    /// count of lines read from the source
    pub count_lines: Count,
    /// count of lines that matched the stats-line shape
    pub count_matched: Count,
}

impl<R: BufRead> StatsLineReader<R> {
    pub fn new(reader: R) -> StatsLineReader<R> {
        StatsLineReader {
            reader,
            line_n: 0,
            count_lines: 0,
            count_matched: 0,
        }
    }

    /// Continue numbering from a prior reader (multiple input files fed to
    /// one processing run).
    pub fn new_at(
        reader: R,
        line_n: LineNum,
    ) -> StatsLineReader<R> {
        StatsLineReader {
            reader,
            line_n,
            count_lines: 0,
            count_matched: 0,
        }
    }

    /// The line number of the most recently read line.
    pub const fn line_n(&self) -> LineNum {
        self.line_n
    }

    /// Read forward to the next line matching the stats-line shape.
    /// Returns `Ok(None)` at end of input.
    pub fn find_line(&mut self) -> Result<Option<StatsLine>> {
        let mut buf: String = String::new();
        loop {
            buf.clear();
            let sz: usize = self.reader.read_line(&mut buf)?;
            if sz == 0 {
                return Ok(None);
            }
            self.line_n += 1;
            self.count_lines += 1;
            let line: &str = buf.trim_end_matches(['\n', '\r']);
            match parse_stats_line(line, self.line_n) {
                Some(stats_line) => {
                    self.count_matched += 1;
                    return Ok(Some(stats_line));
                }
                None => continue,
            }
        }
    }
}
