//! Normalization of heterogeneous publish/comment times to epoch milliseconds.
//!
//! Every consumer (time sort, trend bucketing, time range) goes through
//! [`publish_time_ms`]; `0` means "unknown" and sorts last under newest-first.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use hints_core::TimeValue;
use regex::Regex;

/// Values below this are unix seconds, at or above it unix milliseconds.
const MILLIS_THRESHOLD: f64 = 1e12;

static EXPLICIT_ZONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:[Zz]|[+-]\d{2}:?\d{2})$").expect("valid zone regex"));

const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Normalize a publish time to epoch milliseconds, `0` when unknown or unparsable.
///
/// * numbers: `< 1e12` are seconds, otherwise milliseconds
/// * digit strings: same rule as numbers
/// * date/time strings without an explicit offset or `Z` are read as UTC
#[must_use]
pub fn publish_time_ms(value: &TimeValue) -> i64 {
    match value {
        TimeValue::Missing => 0,
        TimeValue::Number(n) => n.as_f64().map_or(0, epoch_number_ms),
        TimeValue::Text(s) => text_ms(s),
    }
}

/// Calendar day (`YYYY-MM-DD`, UTC) of a normalized timestamp; `None` for unknown.
#[must_use]
pub fn day_key(ms: i64) -> Option<String> {
    if ms == 0 {
        return None;
    }
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// RFC 3339 rendering of a normalized timestamp; `None` for unknown.
#[must_use]
pub fn rfc3339(ms: i64) -> Option<String> {
    if ms == 0 {
        return None;
    }
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
}

#[allow(clippy::cast_possible_truncation)]
fn epoch_number_ms(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let ms = if value < MILLIS_THRESHOLD {
        value * 1000.0
    } else {
        value
    };
    ms as i64
}

fn text_ms(raw: &str) -> i64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }

    if let Ok(num) = trimmed.parse::<f64>() {
        if num.is_finite() && num > 0.0 {
            return epoch_number_ms(num);
        }
    }

    parse_datetime(trimmed).map_or(0, |dt| dt.timestamp_millis())
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if EXPLICIT_ZONE.is_match(s) {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        return ZONED_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
            .map(|dt| dt.with_timezone(&Utc));
    }

    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
