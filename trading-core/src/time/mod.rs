//! Time normalization
//!
//! The wire carries timestamps in three shapes:
//!
//! - ISO-8601 strings (candles, funding and open-interest points)
//! - epoch seconds as numbers (points that were already converted upstream)
//! - epoch milliseconds as numbers (trade and position timestamps)
//!
//! Everything downstream works in [`EpochSeconds`]. Conversion happens once,
//! at decode time, through the functions and serde adapters in this module.

pub mod serde_helpers;

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;

use crate::value_objects::EpochSeconds;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("Invalid ISO-8601 timestamp: {0}")]
    Invalid(String),
    #[error("Epoch value out of range: {0}")]
    OutOfRange(String),
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-8601 timestamp into epoch seconds (sub-second part floored).
///
/// Offsets are honoured. Timestamps without an offset are taken as UTC.
pub fn parse_iso8601(raw: &str) -> Result<EpochSeconds, TimeError> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.timestamp());
    }

    if let Ok(dt) = DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(dt.timestamp());
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc().timestamp());
        }
    }

    Err(TimeError::Invalid(raw.to_string()))
}

/// Convert epoch milliseconds to epoch seconds, flooring toward negative infinity
pub fn from_epoch_millis(millis: i64) -> EpochSeconds {
    millis.div_euclid(1000)
}

/// A timestamp exactly as it appeared on the wire
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireTime {
    Iso(String),
    Integer(i64),
    Float(f64),
}

impl WireTime {
    /// Normalize a field whose numeric form is already epoch seconds.
    ///
    /// Numbers pass through untouched (floats are floored); only strings are
    /// parsed.
    pub fn to_epoch_seconds(&self) -> Result<EpochSeconds, TimeError> {
        match self {
            WireTime::Iso(raw) => parse_iso8601(raw),
            WireTime::Integer(secs) => Ok(*secs),
            WireTime::Float(secs) => float_to_epoch(*secs),
        }
    }

    /// Normalize a field whose numeric form is epoch milliseconds
    pub fn millis_to_epoch_seconds(&self) -> Result<EpochSeconds, TimeError> {
        match self {
            WireTime::Iso(raw) => parse_iso8601(raw),
            WireTime::Integer(millis) => Ok(from_epoch_millis(*millis)),
            WireTime::Float(millis) => float_to_epoch(*millis / 1000.0),
        }
    }
}

fn float_to_epoch(value: f64) -> Result<EpochSeconds, TimeError> {
    let floored = value.floor();
    if !floored.is_finite() || floored < i64::MIN as f64 || floored > i64::MAX as f64 {
        return Err(TimeError::OutOfRange(value.to_string()));
    }
    Ok(floored as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_utc_designator() {
        assert_eq!(parse_iso8601("2024-01-01T00:00:00Z").unwrap(), 1_704_067_200);
    }

    #[test]
    fn test_parse_with_offset() {
        // 01:00 at +01:00 is midnight UTC
        assert_eq!(
            parse_iso8601("2024-01-01T01:00:00+01:00").unwrap(),
            1_704_067_200
        );
        assert_eq!(
            parse_iso8601("2024-01-01 00:00:00+00:00").unwrap(),
            1_704_067_200
        );
    }

    #[test]
    fn test_parse_fraction_is_floored() {
        assert_eq!(
            parse_iso8601("2024-01-01T00:00:00.999Z").unwrap(),
            1_704_067_200
        );
        assert_eq!(
            parse_iso8601("2024-01-01T00:00:01.250000").unwrap(),
            1_704_067_201
        );
    }

    #[test]
    fn test_parse_naive_is_utc() {
        assert_eq!(parse_iso8601("2024-01-01T00:00:00").unwrap(), 1_704_067_200);
        assert_eq!(parse_iso8601("2024-01-01 00:01:00").unwrap(), 1_704_067_260);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_iso8601("yesterday"),
            Err(TimeError::Invalid(_))
        ));
        assert!(parse_iso8601("").is_err());
    }

    #[test]
    fn test_from_epoch_millis_floors() {
        assert_eq!(from_epoch_millis(1_704_067_200_999), 1_704_067_200);
        assert_eq!(from_epoch_millis(-1), -1);
    }

    #[test]
    fn test_wire_time_numbers_pass_through() {
        let t: WireTime = serde_json::from_str("1704067200").unwrap();
        assert_eq!(t, WireTime::Integer(1_704_067_200));
        assert_eq!(t.to_epoch_seconds().unwrap(), 1_704_067_200);

        let t: WireTime = serde_json::from_str("1704067200.75").unwrap();
        assert_eq!(t.to_epoch_seconds().unwrap(), 1_704_067_200);
    }

    #[test]
    fn test_wire_time_millis() {
        let t: WireTime = serde_json::from_str("1704067200500").unwrap();
        assert_eq!(t.millis_to_epoch_seconds().unwrap(), 1_704_067_200);

        let t: WireTime = serde_json::from_str("\"2024-01-01T00:00:00Z\"").unwrap();
        assert_eq!(t.millis_to_epoch_seconds().unwrap(), 1_704_067_200);
    }
}
