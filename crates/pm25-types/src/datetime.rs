//! Timestamp parsing and formatting.
//!
//! The server reports station-local wall-clock times. Depending on the
//! endpoint and server version these arrive as `2025-11-23 14:00`,
//! `2025-11-23T14:00:00` or a full RFC 3339 string with an offset. All of
//! them are normalized to a [`PrimitiveDateTime`]; an offset, when present,
//! is dropped and the wall-clock fields are kept as reported.

use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::error::{ParseError, ParseResult};

/// The server's native timestamp layout.
const SERVER_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

const ACCEPTED_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    SERVER_FORMAT,
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
];

/// Parse a server timestamp.
///
/// # Examples
///
/// ```
/// use pm25_types::parse_timestamp;
///
/// let a = parse_timestamp("2025-11-23 14:00").unwrap();
/// let b = parse_timestamp("2025-11-23T14:00:00+08:00").unwrap();
/// assert_eq!(a, b);
/// ```
pub fn parse_timestamp(input: &str) -> ParseResult<PrimitiveDateTime> {
    let input = input.trim();

    if let Ok(dt) = OffsetDateTime::parse(input, &Rfc3339) {
        return Ok(PrimitiveDateTime::new(dt.date(), dt.time()));
    }

    ACCEPTED_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(input, *format).ok())
        .ok_or_else(|| ParseError::InvalidTimestamp(input.to_string()))
}

/// Format a timestamp the way the server writes it (`YYYY-MM-DD HH:MM`).
pub fn format_timestamp(dt: PrimitiveDateTime) -> String {
    // Every component comes from the date and time, so this cannot fail.
    dt.format(SERVER_FORMAT).unwrap_or_else(|_| dt.to_string())
}

/// Serde adapter for server timestamps.
///
/// Deserializes any format accepted by [`parse_timestamp`] and serializes
/// with [`format_timestamp`].
pub mod serde_timestamp {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::PrimitiveDateTime;

    pub fn serialize<S: Serializer>(dt: &PrimitiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_timestamp(*dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<PrimitiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }

    /// Optional variant; `null` and missing fields map to `None`.
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use time::PrimitiveDateTime;

        pub fn serialize<S: Serializer>(
            dt: &Option<PrimitiveDateTime>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => s.serialize_str(&super::super::format_timestamp(*dt)),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<PrimitiveDateTime>, D::Error> {
            match Option::<String>::deserialize(d)? {
                Some(raw) => super::super::parse_timestamp(&raw)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}
