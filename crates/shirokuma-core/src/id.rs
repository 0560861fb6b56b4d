//! Item identifiers.
//!
//! Normal types use strictly increasing integer ids allocated per type by
//! the sequences table. The reserved types carry deterministic string keys:
//! `sessions` ids encode a timestamp with millisecond precision
//! (`YYYY-MM-DD-HH.MM.SS.sss`), `dailies` ids encode a date (`YYYY-MM-DD`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identifier of an item. On the wire sequence ids are JSON numbers and
/// key ids are JSON strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemId {
    /// Sequence-allocated integer id (normal types).
    Seq(i64),
    /// Deterministic string key (sessions, dailies).
    Key(String),
}

impl ItemId {
    /// Parses an id from its canonical text form (as stored on disk and in
    /// the index). Pure digits become [`ItemId::Seq`], anything else a key.
    pub fn parse(s: &str) -> Self {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = s.parse::<i64>() {
                return Self::Seq(n);
            }
        }
        Self::Key(s.to_owned())
    }

    /// Returns the sequence number, if this is a sequence id.
    pub fn as_seq(&self) -> Option<i64> {
        match self {
            Self::Seq(n) => Some(*n),
            Self::Key(_) => None,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seq(n) => write!(f, "{n}"),
            Self::Key(k) => f.write_str(k),
        }
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        Self::Seq(n)
    }
}

impl Serialize for ItemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Seq(n) => serializer.serialize_i64(*n),
            Self::Key(k) => serializer.serialize_str(k),
        }
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl serde::de::Visitor<'_> for IdVisitor {
            type Value = ItemId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer id or a string key")
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<ItemId, E> {
                Ok(ItemId::Seq(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<ItemId, E> {
                Ok(ItemId::Seq(v as i64))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<ItemId, E> {
                Ok(ItemId::parse(v))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Formats a session id from a timestamp (millisecond precision).
pub fn session_id_for(at: DateTime<Utc>) -> ItemId {
    ItemId::Key(at.format("%Y-%m-%d-%H.%M.%S%.3f").to_string())
}

/// Formats a daily id from a date.
pub fn daily_id_for(date: NaiveDate) -> ItemId {
    ItemId::Key(date.format("%Y-%m-%d").to_string())
}

/// Extracts the `YYYY-MM-DD` date component from a session or daily id.
pub fn date_component(id: &ItemId) -> Option<String> {
    match id {
        ItemId::Key(k) if k.len() >= 10 => {
            let date = &k[..10];
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .ok()
                .map(|_| date.to_owned())
        }
        _ => None,
    }
}

/// Parses a `datetime` override for session creation.
///
/// Accepts RFC 3339 or the naive forms `YYYY-MM-DD HH:MM:SS` /
/// `YYYY-MM-DDTHH:MM:SS` (interpreted as UTC).
pub fn parse_session_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = s.parse::<DateTime<Utc>>() {
        return Some(dt);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_digits_as_seq() {
        assert_eq!(ItemId::parse("42"), ItemId::Seq(42));
        assert_eq!(ItemId::parse("2025-01-15"), ItemId::Key("2025-01-15".into()));
    }

    #[test]
    fn display_roundtrip() {
        assert_eq!(ItemId::Seq(7).to_string(), "7");
        let key = ItemId::Key("2025-01-15-10.30.00.123".into());
        assert_eq!(ItemId::parse(&key.to_string()), key);
    }

    #[test]
    fn serde_number_and_string() {
        assert_eq!(serde_json::to_string(&ItemId::Seq(3)).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&ItemId::Key("2025-01-15".into())).unwrap(),
            "\"2025-01-15\""
        );
        let n: ItemId = serde_json::from_str("9").unwrap();
        assert_eq!(n, ItemId::Seq(9));
        let k: ItemId = serde_json::from_str("\"2025-01-15\"").unwrap();
        assert_eq!(k, ItemId::Key("2025-01-15".into()));
    }

    #[test]
    fn session_id_format() {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap()
            + chrono::Duration::milliseconds(123);
        assert_eq!(
            session_id_for(at),
            ItemId::Key("2025-01-15-10.30.00.123".into())
        );
    }

    #[test]
    fn daily_id_format() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(daily_id_for(d), ItemId::Key("2025-01-15".into()));
    }

    #[test]
    fn date_component_extraction() {
        let session = ItemId::Key("2025-01-15-10.30.00.123".into());
        assert_eq!(date_component(&session), Some("2025-01-15".into()));
        let daily = ItemId::Key("2025-01-15".into());
        assert_eq!(date_component(&daily), Some("2025-01-15".into()));
        assert_eq!(date_component(&ItemId::Seq(1)), None);
    }

    #[test]
    fn parse_datetime_override() {
        assert!(parse_session_datetime("2025-01-15T10:30:00Z").is_some());
        assert!(parse_session_datetime("2025-01-15 10:30:00").is_some());
        assert!(parse_session_datetime("not a date").is_none());
    }
}
