//! Wire ↔ domain conversions for protobuf scalar fields
//!
//! - Timestamps: `DateTime<Utc>` ↔ `int64` Unix seconds
//! - Identifiers: `int64` on the wire, unsigned in the domain
//!
//! Parsing functions return `Result<_, String>` so handlers can finish with
//! [`ToTonicResult::to_tonic`](crate::error::ToTonicResult::to_tonic) and
//! answer `INVALID_ARGUMENT`.

use chrono::{DateTime, Utc};

/// Convert DateTime<Utc> to Unix timestamp (seconds since epoch)
pub fn datetime_to_timestamp(dt: DateTime<Utc>) -> i64 {
  dt.timestamp()
}

/// Convert Unix seconds to DateTime<Utc>, rejecting values chrono cannot represent
///
/// # Example
/// ```
/// use grpc_client::conversions::timestamp_to_datetime;
///
/// let dt = timestamp_to_datetime("time", 1_702_209_600).unwrap();
/// assert_eq!(dt.timestamp(), 1_702_209_600);
/// assert!(timestamp_to_datetime("time", i64::MAX).is_err());
/// ```
pub fn timestamp_to_datetime(field: &str, timestamp: i64) -> Result<DateTime<Utc>, String> {
  DateTime::from_timestamp(timestamp, 0)
    .ok_or_else(|| format!("{} is out of range: {}", field, timestamp))
}

/// Convert a signed wire id to an unsigned one
///
/// # Example
/// ```
/// use grpc_client::conversions::non_negative_id;
///
/// assert_eq!(non_negative_id("event_id", 4), Ok(4));
/// assert!(non_negative_id("event_id", -4).is_err());
/// ```
pub fn non_negative_id(field: &str, value: i64) -> Result<u64, String> {
  u64::try_from(value).map_err(|_| format!("{} must not be negative, got {}", field, value))
}

/// Convert an unsigned id back to the wire, saturating at `i64::MAX`
pub fn id_to_wire(value: u64) -> i64 {
  i64::try_from(value).unwrap_or(i64::MAX)
}
