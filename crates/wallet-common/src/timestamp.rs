//! ISO-8601 timestamp codec
//!
//! Timestamps are kept at microsecond precision so that a value written to
//! disk reads back identical. Serialized form is RFC 3339 with a `Z` suffix,
//! e.g. `2024-05-01T10:00:00.123456Z`. Parsing also accepts naive
//! `YYYY-MM-DDTHH:MM:SS[.ffffff]` strings, interpreted as UTC.
//!
//! Use with `#[serde(with = "crate::timestamp")]`.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer, de};

/// Wall-clock timestamp used throughout the wallet document
pub type Timestamp = DateTime<Utc>;

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Current wall-clock time at the precision stored on disk
#[must_use]
pub fn now() -> Timestamp {
    Utc::now().trunc_subsecs(6)
}

/// Render a timestamp as an RFC 3339 string with microseconds
#[must_use]
pub fn format(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse an ISO-8601 timestamp, with or without a UTC offset
///
/// # Errors
/// Returns the chrono parse error when neither form matches.
pub fn parse(raw: &str) -> Result<Timestamp, chrono::ParseError> {
    let parsed = match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT)?.and_utc(),
    };
    Ok(parsed.trunc_subsecs(6))
}

/// Serde serializer for [`Timestamp`] fields
///
/// # Errors
/// Propagates serializer errors.
pub fn serialize<S>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(ts))
}

/// Serde deserializer for [`Timestamp`] fields
///
/// # Errors
/// Fails when the value is not a string or not a valid ISO-8601 timestamp.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(|e| de::Error::custom(format_args!("invalid timestamp {raw:?}: {e}")))
}
