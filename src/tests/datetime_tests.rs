// src/tests/datetime_tests.rs

//! Tests for [`crate::data::datetime`].

use crate::data::datetime::{
    datetime_parse_iso,
    datetime_parse_legacy,
    DateTimeL,
    DateTimeLOpt,
    RawTimestamp,
    TimestampResolver,
};
use crate::tests::common::{FO_0, FO_M8, FO_P9, NOW_MIDYEAR, NOW_NEWYEAR};

use ::chrono::TimeZone;
use ::test_case::test_case;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test_case("2023-06-05T08:30:00+09:00"; "offset colon")]
#[test_case("2023-06-05T08:30:00+0900"; "offset no colon")]
#[test_case("2023-06-05T08:30:00Z"; "zulu")]
#[test_case("2023-06-05T08:30:00.123456+09:00"; "fractional seconds")]
fn test_datetime_parse_iso_ok(data: &str) {
    assert!(datetime_parse_iso(data).is_some(), "failed to parse {:?}", data);
}

#[test_case("2023-06-05 08:30:00"; "no T separator")]
#[test_case("2023-06-05T08:30:00"; "no offset")]
#[test_case("Jan  1 00:00:01"; "legacy shape")]
#[test_case(""; "empty")]
fn test_datetime_parse_iso_bad(data: &str) {
    assert!(datetime_parse_iso(data).is_none(), "unexpectedly parsed {:?}", data);
}

#[test]
fn test_datetime_parse_iso_value() {
    let dt: DateTimeL = datetime_parse_iso("2023-06-05T08:30:00+09:00").unwrap();
    let expect: DateTimeL = FO_P9.with_ymd_and_hms(2023, 6, 5, 8, 30, 0).unwrap();
    assert_eq!(dt, expect);
}

#[test_case("Jan  1 00:00:01", 2023, (2023, 1, 1, 0, 0, 1); "january padded day")]
#[test_case("Jun 15 12:00:00", 2023, (2023, 6, 15, 12, 0, 0); "june")]
#[test_case("Dec 31 23:59:59", 2022, (2022, 12, 31, 23, 59, 59); "december")]
fn test_datetime_parse_legacy_ok(
    data: &str,
    year: i32,
    ymdhms: (i32, u32, u32, u32, u32, u32),
) {
    let dt: DateTimeL = datetime_parse_legacy(data, year, &FO_0).unwrap();
    let expect: DateTimeL = FO_0
        .with_ymd_and_hms(ymdhms.0, ymdhms.1, ymdhms.2, ymdhms.3, ymdhms.4, ymdhms.5)
        .unwrap();
    assert_eq!(dt, expect);
}

#[test_case("Foo  1 00:00:01"; "bad month")]
#[test_case("Jan 32 00:00:01"; "bad day")]
#[test_case("Jan  1 25:00:01"; "bad hour")]
fn test_datetime_parse_legacy_bad(data: &str) {
    assert!(datetime_parse_legacy(data, 2023, &FO_0).is_none());
}

// ─────────────────────────────────────────────────────────────────────────
// TimestampResolver
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn test_resolver_infers_current_year() {
    let mut resolver = TimestampResolver::new(*FO_0, *NOW_MIDYEAR);
    assert_eq!(resolver.year(), None);
    let ts = RawTimestamp::Legacy(String::from("Jan  1 00:00:01"));
    let dt: DateTimeL = resolver.resolve(&ts).unwrap();
    assert_eq!(resolver.year(), Some(2023));
    assert_eq!(dt, FO_0.with_ymd_and_hms(2023, 1, 1, 0, 0, 1).unwrap());
}

#[test]
fn test_resolver_infers_prior_year_across_boundary() {
    // a December log read just after New Year must resolve to the prior
    // year, not a future instant
    let mut resolver = TimestampResolver::new(*FO_0, *NOW_NEWYEAR);
    let ts = RawTimestamp::Legacy(String::from("Dec 31 23:59:59"));
    let dt: DateTimeL = resolver.resolve(&ts).unwrap();
    assert_eq!(resolver.year(), Some(2022));
    assert_eq!(dt, FO_0.with_ymd_and_hms(2022, 12, 31, 23, 59, 59).unwrap());
}

#[test]
fn test_resolver_year_fixed_after_first_inference() {
    let mut resolver = TimestampResolver::new(*FO_0, *NOW_NEWYEAR);
    let ts1 = RawTimestamp::Legacy(String::from("Dec 31 23:59:59"));
    resolver.resolve(&ts1).unwrap();
    assert_eq!(resolver.year(), Some(2022));
    // a later timestamp does not recompute the year
    let ts2 = RawTimestamp::Legacy(String::from("Jan  1 00:00:01"));
    let dt: DateTimeL = resolver.resolve(&ts2).unwrap();
    assert_eq!(resolver.year(), Some(2022));
    assert_eq!(dt, FO_0.with_ymd_and_hms(2022, 1, 1, 0, 0, 1).unwrap());
}

#[test]
fn test_resolver_iso_does_not_infer_year() {
    let mut resolver = TimestampResolver::new(*FO_0, *NOW_MIDYEAR);
    let ts = RawTimestamp::Iso(String::from("2019-06-05T08:30:00+09:00"));
    let dt: DateTimeLOpt = resolver.resolve(&ts);
    assert!(dt.is_some());
    assert_eq!(resolver.year(), None);
}

#[test]
fn test_resolver_legacy_uses_tz_offset() {
    let mut resolver = TimestampResolver::new(*FO_P9, *NOW_MIDYEAR);
    let ts = RawTimestamp::Legacy(String::from("Jun 15 12:00:00"));
    let dt: DateTimeL = resolver.resolve(&ts).unwrap();
    assert_eq!(dt, FO_P9.with_ymd_and_hms(2023, 6, 15, 12, 0, 0).unwrap());
}

#[test]
fn test_resolver_inference_compares_across_offsets() {
    // 2023-01-01T20:00:00-08:00 is 2023-01-02T04:00:00+00:00, four hours
    // past "now"; the offset must take part in the future comparison
    let mut resolver = TimestampResolver::new(*FO_M8, *NOW_NEWYEAR);
    let ts = RawTimestamp::Legacy(String::from("Jan  1 20:00:00"));
    resolver.resolve(&ts).unwrap();
    assert_eq!(resolver.year(), Some(2022));
}

#[test]
fn test_resolver_counts_unresolved() {
    let mut resolver = TimestampResolver::new(*FO_0, *NOW_MIDYEAR);
    let ts = RawTimestamp::Legacy(String::from("Jan 32 00:00:01"));
    assert!(resolver.resolve(&ts).is_none());
    assert_eq!(resolver.count_unresolved, 1);
}
