//! The current-state singleton document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::refs::ItemRef;

/// Fixed title of the state document.
pub const STATE_TITLE: &str = "プロジェクト状態";
/// Fixed type label of the state document.
pub const STATE_TYPE: &str = "current_state";
/// Fixed priority label reported in state metadata.
pub const STATE_PRIORITY: &str = "high";

/// The latest-wins workspace state. Never deleted, only overwritten;
/// `related` entries are validated against live items at write time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurrentState {
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub related: Vec<ItemRef>,

    #[serde(default)]
    pub metadata: StateMetadata,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Free-form metadata attached to a state update. `updated_by` and
/// `context` are recognised; everything else is carried through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StateMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_empty() {
        let state = CurrentState::default();
        assert_eq!(state.content, "");
        assert!(state.tags.is_empty());
        assert!(state.updated_at.is_none());
    }

    #[test]
    fn metadata_preserves_unknown_keys() {
        let json = r#"{"updated_by":"ai","session_id":"s-1"}"#;
        let meta: StateMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.updated_by.as_deref(), Some("ai"));
        assert_eq!(meta.extra["session_id"], "s-1");
        let back = serde_json::to_value(&meta).unwrap();
        assert_eq!(back["session_id"], "s-1");
    }
}
