//! Normalized timestamp representation.
//!
//! The store stamps documents with epoch milliseconds, while older documents
//! and external writers may hold RFC 3339 strings, float seconds or
//! `{seconds, nanos}` maps. `Timestamp` deserializes from all of them so
//! callers never branch on the stored form.

use chrono::{DateTime, Utc};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A point in time, normalized to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Construct from epoch milliseconds.
    ///
    /// Returns `None` if the value is outside the representable range.
    pub fn from_epoch_millis(millis: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp_millis(millis).map(Self)
    }

    /// Epoch milliseconds.
    pub fn epoch_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// The underlying UTC datetime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// RFC 3339 representation.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TimestampVisitor)
    }
}

struct TimestampVisitor;

impl<'de> Visitor<'de> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an RFC 3339 string, epoch milliseconds, float seconds, or {seconds, nanos}")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        DateTime::parse_from_rfc3339(v)
            .map(|dt| Timestamp(dt.with_timezone(&Utc)))
            .map_err(|e| E::custom(format!("invalid RFC 3339 timestamp: {e}")))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Timestamp::from_epoch_millis(v)
            .ok_or_else(|| E::custom(format!("epoch milliseconds out of range: {v}")))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        let millis = i64::try_from(v)
            .map_err(|_| E::custom(format!("epoch milliseconds out of range: {v}")))?;
        self.visit_i64(millis)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        self.visit_i64((v * 1000.0) as i64)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut seconds: Option<i64> = None;
        let mut nanos: Option<u32> = None;
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "seconds" => seconds = Some(map.next_value()?),
                "nanos" => nanos = Some(map.next_value()?),
                _ => {
                    let _ = map.next_value::<serde_json::Value>()?;
                }
            }
        }
        let seconds = seconds.ok_or_else(|| de::Error::missing_field("seconds"))?;
        DateTime::<Utc>::from_timestamp(seconds, nanos.unwrap_or(0))
            .map(Timestamp)
            .ok_or_else(|| de::Error::custom(format!("epoch seconds out of range: {seconds}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rfc3339_round_trip() {
        let ts = Timestamp::now();
        let encoded = serde_json::to_value(ts).unwrap();
        let decoded: Timestamp = serde_json::from_value(encoded).unwrap();
        assert_eq!(ts.epoch_millis(), decoded.epoch_millis());
    }

    #[test]
    fn test_deserialize_epoch_millis() {
        let ts: Timestamp = serde_json::from_value(json!(1_700_000_000_000_i64)).unwrap();
        assert_eq!(ts.epoch_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_deserialize_float_seconds() {
        let ts: Timestamp = serde_json::from_value(json!(1_700_000_000.5)).unwrap();
        assert_eq!(ts.epoch_millis(), 1_700_000_000_500);
    }

    #[test]
    fn test_deserialize_seconds_nanos_map() {
        let ts: Timestamp =
            serde_json::from_value(json!({"seconds": 1_700_000_000, "nanos": 250_000_000}))
                .unwrap();
        assert_eq!(ts.epoch_millis(), 1_700_000_000_250);
    }

    #[test]
    fn test_all_forms_normalize_to_same_instant() {
        let from_string: Timestamp =
            serde_json::from_value(json!("2024-01-15T10:30:00Z")).unwrap();
        let millis = from_string.epoch_millis();
        let from_millis: Timestamp = serde_json::from_value(json!(millis)).unwrap();
        let from_map: Timestamp =
            serde_json::from_value(json!({"seconds": millis / 1000, "nanos": 0})).unwrap();
        assert_eq!(from_string, from_millis);
        assert_eq!(from_string, from_map);
    }
}
