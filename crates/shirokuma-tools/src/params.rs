//! Parameter structs for every tool.
//!
//! Each struct is the closed schema of one tool: `deny_unknown_fields`
//! turns any unexpected key into a validation error before dispatch
//! reaches a service.

use serde::Deserialize;

use shirokuma_core::id::ItemId;
use shirokuma_core::state::StateMetadata;

/// Params for tools that take no arguments. An empty object (or omitted
/// params) is the only valid input.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmptyParams {}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetItemsParams {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub statuses: Option<Vec<String>>,
    #[serde(default, rename = "includeClosedStatuses")]
    pub include_closed_statuses: bool,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetItemDetailParams {
    #[serde(rename = "type")]
    pub type_name: String,
    pub id: ItemId,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateItemParams {
    #[serde(rename = "type")]
    pub type_name: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub related: Option<Vec<String>>,
    #[serde(default)]
    pub related_tasks: Option<Vec<String>>,
    #[serde(default)]
    pub related_documents: Option<Vec<String>>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Daily date override (dailies only).
    #[serde(default)]
    pub date: Option<String>,
    /// Session timestamp override (sessions only).
    #[serde(default)]
    pub datetime: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateItemParams {
    #[serde(rename = "type")]
    pub type_name: String,
    pub id: ItemId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub related: Option<Vec<String>>,
    #[serde(default)]
    pub related_tasks: Option<Vec<String>>,
    #[serde(default)]
    pub related_documents: Option<Vec<String>>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteItemParams {
    #[serde(rename = "type")]
    pub type_name: String,
    pub id: ItemId,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangeItemTypeParams {
    pub from_type: String,
    pub from_id: ItemId,
    pub to_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchItemsParams {
    pub query: String,
    #[serde(default)]
    pub types: Option<Vec<String>>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchSuggestParams {
    pub query: String,
    #[serde(default)]
    pub types: Option<Vec<String>>,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchItemsByTagParams {
    pub tag: String,
    #[serde(default)]
    pub types: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTagParams {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteTagParams {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchTagsParams {
    pub pattern: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetTypesParams {
    #[serde(default)]
    pub include_definitions: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTypeParams {
    pub name: String,
    #[serde(default)]
    pub base_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTypeParams {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteTypeParams {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCurrentStateParams {
    pub content: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub related: Option<Vec<String>>,
    #[serde(default)]
    pub metadata: Option<StateMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keys_are_rejected() {
        let err = serde_json::from_value::<GetItemDetailParams>(serde_json::json!({
            "type": "issues",
            "id": 1,
            "surprise": true
        }))
        .unwrap_err();
        assert!(err.to_string().contains("surprise"));
    }

    #[test]
    fn wire_ids_accept_number_and_string() {
        let p: GetItemDetailParams =
            serde_json::from_value(serde_json::json!({"type": "issues", "id": 1})).unwrap();
        assert_eq!(p.id, ItemId::Seq(1));
        let p: GetItemDetailParams = serde_json::from_value(
            serde_json::json!({"type": "dailies", "id": "2025-01-15"}),
        )
        .unwrap();
        assert_eq!(p.id, ItemId::Key("2025-01-15".into()));
    }

    #[test]
    fn include_closed_statuses_is_camel_case() {
        let p: GetItemsParams = serde_json::from_value(
            serde_json::json!({"type": "issues", "includeClosedStatuses": true}),
        )
        .unwrap();
        assert!(p.include_closed_statuses);
    }

    #[test]
    fn empty_params_reject_any_key() {
        assert!(serde_json::from_value::<EmptyParams>(serde_json::json!({})).is_ok());
        assert!(serde_json::from_value::<EmptyParams>(serde_json::json!({"x": 1})).is_err());
    }
}
