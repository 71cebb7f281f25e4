// src/data/datetime.rs

//! Timestamp resolution for stats-log lines.
//!
//! A slapd stats log carries its timestamps in one of two mutually exclusive
//! shapes:
//!
//! - legacy syslog `%b %e %H:%M:%S`, e.g. `Jan  1 00:00:01`, with no year
//!   and no timezone offset
//! - ISO-8601 with an explicit per-line offset,
//!   e.g. `2023-06-05T08:30:00.123456+09:00`
//!
//! ISO-8601 lines resolve directly. Legacy lines need a year and a timezone
//! offset supplied from elsewhere; see [`TimestampResolver`].

use crate::common::Count;

use ::chrono::{
    DateTime,
    Datelike, // adds method `.year()` onto `DateTime`
    FixedOffset,
    LocalResult,
    NaiveDateTime,
    TimeZone,
};
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The chrono [`DateTime`] type used in _ss2jlib_.
///
/// [`DateTime`]: https://docs.rs/chrono/0.4.40/chrono/struct.DateTime.html
pub type DateTimeL = DateTime<FixedOffset>;
pub type DateTimeLOpt = Option<DateTimeL>;

/// A year. Stored signed to match chrono.
pub type Year = i32;

/// `strftime` pattern for a legacy timestamp with the inferred year
/// prepended.
const DTP_LEGACY_YEARED: &str = "%Y %b %e %H:%M:%S";

/// `strftime` pattern for an ISO-8601 timestamp with a numeric offset.
/// `%z` accepts both `+09:00` and `+0900`; `Z` is handled by the RFC 3339
/// parse attempted first.
const DTP_ISO: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// A timestamp substring as captured from a stats-log line, before
/// resolution to an absolute instant.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RawTimestamp {
    /// legacy syslog shape, no year, no offset, e.g. `Jan  1 00:00:01`
    Legacy(String),
    /// ISO-8601 with explicit offset
    Iso(String),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// parse functions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Parse an ISO-8601 timestamp with explicit offset to a [`DateTimeL`].
pub fn datetime_parse_iso(data: &str) -> DateTimeLOpt {
    // RFC 3339 first; it accepts the `Z` suffix which `%z` does not
    if let Ok(dt) = DateTime::parse_from_rfc3339(data) {
        defñ!("parse_from_rfc3339({:?}) Ok", data);
        return Some(dt);
    }
    match DateTime::parse_from_str(data, DTP_ISO) {
        Ok(dt) => {
            defñ!("parse_from_str({:?}, {:?}) Ok", data, DTP_ISO);
            Some(dt)
        }
        Err(_err) => {
            defñ!("parse_from_str({:?}, {:?}) Err {}", data, DTP_ISO, _err);
            None
        }
    }
}

/// Parse a legacy year-less timestamp to a [`DateTimeL`] using the passed
/// `year` and fallback timezone offset `tz_offset`.
pub fn datetime_parse_legacy(
    data: &str,
    year: Year,
    tz_offset: &FixedOffset,
) -> DateTimeLOpt {
    let data_yeared: String = format!("{} {}", year, data);
    let ndt: NaiveDateTime = match NaiveDateTime::parse_from_str(&data_yeared, DTP_LEGACY_YEARED) {
        Ok(ndt) => ndt,
        Err(_err) => {
            defñ!("parse_from_str({:?}, {:?}) Err {}", data_yeared, DTP_LEGACY_YEARED, _err);
            return None;
        }
    };
    match tz_offset.from_local_datetime(&ndt) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(dt, _) => Some(dt),
        LocalResult::None => None,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TimestampResolver
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Resolves [`RawTimestamp`]s to absolute [`DateTimeL`] instants.
///
/// For legacy year-less timestamps the year is inferred _once_, from the
/// first legacy timestamp seen in the stream: take the wall-clock year of
/// `now`; if the candidate instant would lie strictly in the future relative
/// to `now` (a log processed shortly after a year boundary), use the prior
/// year instead. The inferred year is then fixed for the remainder of the
/// run.
///
/// A log that itself spans a year boundary is a known limitation; the
/// inferred year is *not* recomputed from later timestamps.
pub struct TimestampResolver {
    /// fallback timezone offset for legacy timestamps (CLI `--tz-offset`)
    tz_offset: FixedOffset,
    /// "now"; pinned at construction so tests can fix it
    now: DateTimeL,
    /// the once-inferred year for legacy timestamps
    year: Option<Year>,
    /// count of timestamps that failed to resolve
    pub count_unresolved: Count,
}

impl TimestampResolver {
    pub fn new(
        tz_offset: FixedOffset,
        now: DateTimeL,
    ) -> TimestampResolver {
        defñ!("TimestampResolver::new({:?}, {:?})", tz_offset, now);
        TimestampResolver {
            tz_offset,
            now,
            year: None,
            count_unresolved: 0,
        }
    }

    /// The inferred year, if a legacy timestamp has been seen.
    pub const fn year(&self) -> Option<Year> {
        self.year
    }

    /// Resolve one raw timestamp to an absolute instant.
    ///
    /// Returns `None` for a timestamp that does not parse; the caller treats
    /// that as a malformed-payload diagnostic, never a fatal error.
    pub fn resolve(
        &mut self,
        ts: &RawTimestamp,
    ) -> DateTimeLOpt {
        let dt: DateTimeLOpt = match ts {
            RawTimestamp::Iso(data) => datetime_parse_iso(data),
            RawTimestamp::Legacy(data) => {
                let year: Year = match self.year {
                    Some(year) => year,
                    None => {
                        let year: Year = self.infer_year(data);
                        self.year = Some(year);
                        year
                    }
                };
                datetime_parse_legacy(data, year, &self.tz_offset)
            }
        };
        if dt.is_none() {
            self.count_unresolved += 1;
        }
        dt
    }

    /// One-time year inference from the first legacy timestamp in the
    /// stream.
    fn infer_year(
        &self,
        data: &str,
    ) -> Year {
        defn!("({:?})", data);
        let mut year: Year = self.now.year();
        match datetime_parse_legacy(data, year, &self.tz_offset) {
            Some(dt) => {
                if dt > self.now {
                    // the candidate lies in the future; the log must be from
                    // the prior year (e.g. a December log read in January)
                    defo!("candidate {:?} > now {:?}", dt, self.now);
                    year -= 1;
                }
            }
            None => {}
        }
        defx!("return {}", year);
        year
    }
}
