//! Typed references between items.
//!
//! On the wire a reference is a `<type>-<id>` token (e.g. `issues-1`,
//! `dailies-2025-01-15`). Type names never contain `-`, so the token splits
//! at the first dash.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::id::ItemId;

/// A directed reference to another item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemRef {
    pub type_name: String,
    pub id: ItemId,
}

impl ItemRef {
    pub fn new(type_name: impl Into<String>, id: ItemId) -> Self {
        Self {
            type_name: type_name.into(),
            id,
        }
    }

    /// Parses a `<type>-<id>` token. Returns `None` when the token has no
    /// dash, an empty side, or a type part that is not a valid slug.
    pub fn parse(token: &str) -> Option<Self> {
        let (type_name, id) = token.split_once('-')?;
        if type_name.is_empty() || id.is_empty() {
            return None;
        }
        if !crate::validation::is_valid_type_slug(type_name) {
            return None;
        }
        Some(Self {
            type_name: type_name.to_owned(),
            id: ItemId::parse(id),
        })
    }

    /// Returns the wire token form.
    pub fn token(&self) -> String {
        format!("{}-{}", self.type_name, self.id)
    }

    /// Returns `true` if this reference points at the given item.
    pub fn points_to(&self, type_name: &str, id: &ItemId) -> bool {
        self.type_name == type_name && self.id == *id
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.type_name, self.id)
    }
}

impl Serialize for ItemRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.token())
    }
}

impl<'de> Deserialize<'de> for ItemRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| {
            serde::de::Error::custom(format!("malformed item reference {s:?} (expected type-id)"))
        })
    }
}
