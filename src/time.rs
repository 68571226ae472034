//! Day bucketing for log rollover decisions.
//!
//! Rotation code compares the timestamp of the last write with "now" and rolls
//! the file when they fall on different local days. Only the primitive lives
//! here; the rotation policy belongs to the log writer.

use crate::utils::config::SECONDS_PER_DAY;
use chrono::{DateTime, Local, TimeZone};
use log::debug;
use std::fmt::Write;

/// Whether two epoch timestamps fall on the same local day
///
/// **Public** - main entry point for rollover checks
///
/// # Arguments
/// * `src` - First timestamp, seconds since the epoch
/// * `target` - Second timestamp, seconds since the epoch
/// * `offset` - Local offset in seconds east of UTC, added to both timestamps
///
/// Division floors toward negative infinity so pre-epoch timestamps and
/// negative offsets bucket consistently. The sum is widened to `i128` so it
/// cannot overflow.
pub fn same_local_day(src: i64, target: i64, offset: i64) -> bool {
    local_day(src, offset) == local_day(target, offset)
}

fn local_day(ts: i64, offset: i64) -> i128 {
    (i128::from(ts) + i128::from(offset)).div_euclid(i128::from(SECONDS_PER_DAY))
}

/// Current local offset from UTC in seconds (east positive)
pub fn local_utc_offset() -> i64 {
    i64::from(Local::now().offset().local_minus_utc())
}

/// Format an epoch timestamp in local time using strftime-style specifiers
///
/// **Public** - used for dated log file names
///
/// Returns an empty string when the timestamp is out of range or the format
/// contains an invalid specifier.
pub fn format_local_date(format: &str, ts: i64) -> String {
    match Local.timestamp_opt(ts, 0).single() {
        Some(dt) => format_datetime(&dt, format),
        None => {
            debug!("Timestamp out of range for local time: {}", ts);
            String::new()
        }
    }
}

fn format_datetime(dt: &DateTime<Local>, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", dt.format(format)).is_err() {
        debug!("Invalid date format: {}", format);
        out.clear();
    }
    out
}
