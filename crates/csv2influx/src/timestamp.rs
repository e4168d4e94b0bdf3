// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed run timestamp normalisation.
//!
//! The user supplies one timestamp for a whole run in a human format; lines
//! carry it as integer nanoseconds since the Unix epoch.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Naive date-time layouts accepted, interpreted as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Date-only layout, interpreted as midnight UTC.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamp parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("unrecognized timestamp '{0}' (expected RFC 3339, YYYY-MM-DD[ HH:MM:SS] or epoch nanoseconds)")]
    Unrecognized(String),

    #[error("timestamp '{0}' cannot be represented in nanoseconds")]
    OutOfRange(String),
}

/// Convert a user timestamp into a nanosecond epoch string.
///
/// Integer input is assumed to already be in nanoseconds and is kept as-is.
pub fn to_nanos(input: &str) -> Result<String, TimestampError> {
    let input = input.trim();
    let digits = input.strip_prefix('-').unwrap_or(input);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(input.to_string());
    }

    let utc = parse(input).ok_or_else(|| TimestampError::Unrecognized(input.to_string()))?;
    utc.and_utc()
        .timestamp_nanos_opt()
        .map(|ns| ns.to_string())
        .ok_or_else(|| TimestampError::OutOfRange(input.to_string()))
}

fn parse(input: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.naive_utc());
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc3339_with_offset() {
        assert_eq!(
            to_nanos("2016-09-26T02:00:00+00:00").expect("parse"),
            "1474855200000000000"
        );
        assert_eq!(
            to_nanos("2016-09-26T04:00:00+02:00").expect("parse"),
            "1474855200000000000"
        );
    }

    #[test]
    fn test_date_only_is_midnight_utc() {
        assert_eq!(to_nanos("2016-09-26").expect("parse"), "1474848000000000000");
    }

    #[test]
    fn test_naive_datetime_with_fraction() {
        assert_eq!(
            to_nanos("2016-09-26 02:00:00.5").expect("parse"),
            "1474855200500000000"
        );
        assert_eq!(
            to_nanos("2016-09-26T02:00:00").expect("parse"),
            "1474855200000000000"
        );
    }

    #[test]
    fn test_epoch_digits_verbatim() {
        assert_eq!(to_nanos(" 1474855200000000000 ").expect("parse"), "1474855200000000000");
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(
            to_nanos("yesterday").unwrap_err(),
            TimestampError::Unrecognized("yesterday".into())
        );
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            to_nanos("3000-01-01").unwrap_err(),
            TimestampError::OutOfRange("3000-01-01".into())
        );
    }
}
