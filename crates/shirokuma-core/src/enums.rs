//! String-backed enums for the shirokuma system.
//!
//! Unlike item types (which are open-ended and live in the type registry),
//! these enums are closed sets: dispatch happens on `base_type`, never on a
//! type name string.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ===========================================================================
// Priority
// ===========================================================================

/// Item priority.
///
/// Canonical form is uppercase; the parser also accepts the legacy lowercase
/// aliases `high` / `medium` / `low` from older exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
    Minimal,
}

impl Priority {
    /// Returns the canonical (uppercase) string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::Minimal => "MINIMAL",
        }
    }

    /// Parses a priority string, accepting legacy lowercase aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CRITICAL" => Some(Self::Critical),
            "HIGH" | "high" => Some(Self::High),
            "MEDIUM" | "medium" => Some(Self::Medium),
            "LOW" | "low" => Some(Self::Low),
            "MINIMAL" => Some(Self::Minimal),
            _ => None,
        }
    }

    /// Returns `true` if this is the default variant.
    pub fn is_default(&self) -> bool {
        *self == Self::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid priority {s:?} (expected CRITICAL, HIGH, MEDIUM, LOW or MINIMAL)"
            ))
        })
    }
}

// ===========================================================================
// BaseType
// ===========================================================================

/// One of the two base-type rails every registered type is bound to.
///
/// Controls field requirements (documents require `content`) and the
/// grouping of tag-search results. The reserved types `sessions` and
/// `dailies` are registered on the `tasks` rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Tasks,
    Documents,
}

impl BaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Documents => "documents",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tasks" => Some(Self::Tasks),
            "documents" => Some(Self::Documents),
            _ => None,
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BaseType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BaseType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid base_type {s:?} (expected \"tasks\" or \"documents\")"
            ))
        })
    }
}

// ===========================================================================
// Type registry row
// ===========================================================================

/// A registered item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    pub base_type: BaseType,
    #[serde(default)]
    pub is_reserved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Reserved type names that are pre-registered and cannot be created,
/// deleted or used as a `change_item_type` endpoint.
pub const RESERVED_TYPES: &[&str] = &["sessions", "dailies"];

/// Types seeded on first init: `(name, base_type, description)`.
pub const DEFAULT_TYPES: &[(&str, BaseType, &str)] = &[
    ("issues", BaseType::Tasks, "Bug reports and problem tracking"),
    ("plans", BaseType::Tasks, "Planned work with a time horizon"),
    ("docs", BaseType::Documents, "Reference documentation"),
    ("knowledge", BaseType::Documents, "Reusable knowledge notes"),
];

/// Returns `true` if `name` is one of the reserved type names.
pub fn is_reserved_type(name: &str) -> bool {
    RESERVED_TYPES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_parse_canonical() {
        assert_eq!(Priority::parse("CRITICAL"), Some(Priority::Critical));
        assert_eq!(Priority::parse("MINIMAL"), Some(Priority::Minimal));
        assert_eq!(Priority::parse("bogus"), None);
    }

    #[test]
    fn priority_parse_legacy_lowercase() {
        assert_eq!(Priority::parse("high"), Some(Priority::High));
        assert_eq!(Priority::parse("medium"), Some(Priority::Medium));
        assert_eq!(Priority::parse("low"), Some(Priority::Low));
        // Legacy set never included these.
        assert_eq!(Priority::parse("critical"), None);
        assert_eq!(Priority::parse("minimal"), None);
    }

    #[test]
    fn priority_serde_roundtrip() {
        let json = serde_json::to_string(&Priority::High).unwrap();
        assert_eq!(json, "\"HIGH\"");
        let back: Priority = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(back, Priority::Low);
    }

    #[test]
    fn base_type_parse() {
        assert_eq!(BaseType::parse("tasks"), Some(BaseType::Tasks));
        assert_eq!(BaseType::parse("documents"), Some(BaseType::Documents));
        assert_eq!(BaseType::parse("sessions"), None);
    }

    #[test]
    fn reserved_types() {
        assert!(is_reserved_type("sessions"));
        assert!(is_reserved_type("dailies"));
        assert!(!is_reserved_type("issues"));
    }
}
