//! Serde adapter for guess timestamps.
//!
//! The authority may send either an RFC 3339 / ISO 8601 string or a number of
//! milliseconds since the Unix epoch. Strings without an offset are UTC.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::{OffsetDateTime, PrimitiveDateTime};

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
}

pub fn serialize<S: Serializer>(ts: &OffsetDateTime, s: S) -> Result<S::Ok, S::Error> {
    let text = ts.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
    s.serialize_str(&text)
}

pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<OffsetDateTime, D::Error> {
    match Raw::deserialize(d)? {
        Raw::Millis(ms) => from_millis(i128::from(ms)).map_err(D::Error::custom),
        Raw::FractionalMillis(ms) => from_millis(ms as i128).map_err(D::Error::custom),
        Raw::Text(text) => parse_text(&text).map_err(D::Error::custom),
    }
}

fn from_millis(ms: i128) -> Result<OffsetDateTime, time::error::ComponentRange> {
    OffsetDateTime::from_unix_timestamp_nanos(ms * 1_000_000)
}

fn parse_text(text: &str) -> Result<OffsetDateTime, time::error::Parse> {
    match OffsetDateTime::parse(text, &Rfc3339) {
        Ok(ts) => Ok(ts),
        Err(_) => PrimitiveDateTime::parse(text, &Iso8601::DEFAULT).map(|ts| ts.assume_utc()),
    }
}
