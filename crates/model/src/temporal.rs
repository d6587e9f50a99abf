//! ISO-8601 formatting and lenient parsing of date and datetime values.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike};

use crate::value::Value;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const AWARE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z"];

/// Parses an ISO-8601 timestamp.
///
/// Accepts RFC 3339, naive timestamps with a `T` or space separator and bare
/// dates (read as midnight). With `as_utc`, the parsed timezone is replaced
/// by UTC, keeping the wall-clock time.
pub fn parse_datetime(input: &str, as_utc: bool) -> Option<Value> {
    let input = input.trim();

    let aware = DateTime::parse_from_rfc3339(input).ok().or_else(|| {
        AWARE_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(input, fmt).ok())
    });
    if let Some(dt) = aware {
        return Some(if as_utc {
            Value::from(with_utc(dt.naive_local()))
        } else {
            Value::from(dt)
        });
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| parse_date(input).and_then(|d| d.and_hms_opt(0, 0, 0)))?;

    Some(if as_utc {
        Value::from(with_utc(naive))
    } else {
        Value::from(naive)
    })
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}

fn with_utc(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    naive.and_utc().fixed_offset()
}

/// Formats a temporal value the way `isoformat()` does.
///
/// Microseconds are printed only when non-zero. Returns `None` for
/// non-temporal values.
pub fn iso_format(value: &Value) -> Option<String> {
    match value {
        Value::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        Value::NaiveDateTime(dt) => Some(dt.format(naive_pattern(dt.nanosecond())).to_string()),
        Value::DateTime(dt) => {
            let mut out = dt.format(naive_pattern(dt.nanosecond())).to_string();
            out.push_str(&dt.format("%:z").to_string());
            Some(out)
        }
        _ => None,
    }
}

const fn naive_pattern(nanos: u32) -> &'static str {
    if nanos / 1_000 == 0 {
        "%Y-%m-%dT%H:%M:%S"
    } else {
        "%Y-%m-%dT%H:%M:%S%.6f"
    }
}
