//! UTC date/time reply parsing
//!
//! The `PTIME` subsystem reports the calendar date as `<year>,<month>,<day>`
//! and the time of day either comma-delimited (`PTIM:TIME?`) or
//! colon-delimited for display (`PTIM:TIME:STR?`).

use chrono::{NaiveDate, NaiveTime};

use crate::error::ParseError;

/// Parse a `PTIM:DATE?` reply, e.g. `2016,4,28`
pub fn parse_date(reply: &str) -> Result<NaiveDate, ParseError> {
    let malformed = || ParseError::MalformedTime {
        kind: "date",
        reply: reply.to_string(),
    };

    let mut parts = reply.trim().splitn(3, ',');
    let year = next_num(&mut parts).ok_or_else(malformed)?;
    let month = next_num(&mut parts).ok_or_else(malformed)?;
    let day = next_num(&mut parts).ok_or_else(malformed)?;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32).ok_or_else(malformed)
}

/// Parse a time-of-day reply, comma- or colon-delimited, e.g. `23,59,59`
/// or `23:59:59`
pub fn parse_time(reply: &str) -> Result<NaiveTime, ParseError> {
    let malformed = || ParseError::MalformedTime {
        kind: "time",
        reply: reply.to_string(),
    };

    let trimmed = reply.trim();
    let delimiter = if trimmed.contains(':') { ':' } else { ',' };

    let mut parts = trimmed.splitn(3, delimiter);
    let hour = next_num(&mut parts).ok_or_else(malformed)?;
    let minute = next_num(&mut parts).ok_or_else(malformed)?;
    let second = next_num(&mut parts).ok_or_else(malformed)?;

    NaiveTime::from_hms_opt(hour as u32, minute as u32, second as u32).ok_or_else(malformed)
}

fn next_num<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Option<i32> {
    parts.next()?.trim().parse().ok()
}
