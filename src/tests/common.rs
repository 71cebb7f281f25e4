// src/tests/common.rs

//! Constants shared by tests.

use crate::data::datetime::DateTimeL;

use ::chrono::{FixedOffset, TimeZone};
use ::lazy_static::lazy_static;

lazy_static! {
    /// timezone offset `+00:00`
    pub static ref FO_0: FixedOffset = FixedOffset::east_opt(0).unwrap();
    /// timezone offset `+09:00`
    pub static ref FO_P9: FixedOffset = FixedOffset::east_opt(9 * 3600).unwrap();
    /// timezone offset `-08:00`
    pub static ref FO_M8: FixedOffset = FixedOffset::east_opt(-8 * 3600).unwrap();
    /// a pinned "now" in mid-year, away from year boundaries
    pub static ref NOW_MIDYEAR: DateTimeL =
        FO_0.with_ymd_and_hms(2023, 6, 15, 12, 0, 0).unwrap();
    /// a pinned "now" just after a year boundary
    pub static ref NOW_NEWYEAR: DateTimeL =
        FO_0.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
}
