//! Item struct -- the single stored entity of the knowledge base.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::Priority;
use crate::id::{self, ItemId};
use crate::refs::ItemRef;

/// Helper for `skip_serializing_if` on `Vec` fields.
fn is_empty_vec<T>(v: &Vec<T>) -> bool {
    v.is_empty()
}

/// The sole content node. Every row in the store has this shape regardless
/// of its `type`; field requirements differ only at the validation boundary
/// (documents require `content`, sessions and dailies carry key ids).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,

    #[serde(rename = "type")]
    pub type_name: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Status name. Resolution to a status id happens in the index.
    pub status: String,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    /// Tag names, insertion order preserved.
    #[serde(default, skip_serializing_if = "is_empty_vec")]
    pub tags: Vec<String>,

    /// Outbound references. Targets may be dangling; that is observable.
    #[serde(default, skip_serializing_if = "is_empty_vec")]
    pub related: Vec<ItemRef>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Default for Item {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: ItemId::Seq(0),
            type_name: String::new(),
            title: String::new(),
            description: None,
            content: None,
            status: "Open".to_owned(),
            priority: Priority::Medium,
            category: None,
            version: None,
            start_date: None,
            end_date: None,
            tags: Vec::new(),
            related: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Item {
    /// The `YYYY-MM-DD` date component of a session/daily id, if any.
    pub fn date(&self) -> Option<String> {
        id::date_component(&self.id)
    }

    /// Returns a reference token (`type-id`) for this item.
    pub fn self_ref(&self) -> ItemRef {
        ItemRef::new(self.type_name.clone(), self.id.clone())
    }
}

/// Builder for constructing an [`Item`] with a fluent API.
pub struct ItemBuilder {
    item: Item,
}

impl ItemBuilder {
    pub fn new(type_name: impl Into<String>, title: impl Into<String>) -> Self {
        let mut item = Item::default();
        item.type_name = type_name.into();
        item.title = title.into();
        Self { item }
    }

    pub fn id(mut self, id: ItemId) -> Self {
        self.item.id = id;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.item.description = Some(description.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.item.content = Some(content.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.item.status = status.into();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.item.priority = priority;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.item.category = Some(category.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.item.version = Some(version.into());
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.item.start_date = Some(date);
        self
    }

    pub fn end_date(mut self, date: NaiveDate) -> Self {
        self.item.end_date = Some(date);
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.item.tags = tags;
        self
    }

    pub fn related(mut self, related: Vec<ItemRef>) -> Self {
        self.item.related = related;
        self
    }

    pub fn created_at(mut self, t: DateTime<Utc>) -> Self {
        self.item.created_at = t;
        self
    }

    pub fn updated_at(mut self, t: DateTime<Utc>) -> Self {
        self.item.updated_at = t;
        self
    }

    pub fn build(self) -> Item {
        self.item
    }
}

// ---------------------------------------------------------------------------
// Projected views
// ---------------------------------------------------------------------------

/// The list-view projection returned by `get_items`.
///
/// The field set is part of the contract: `content`, internal status ids and
/// relation arrays are deliberately absent. `date` appears only for
/// sessions and dailies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub type_name: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl From<&Item> for ListItem {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            type_name: item.type_name.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            status: item.status.clone(),
            priority: item.priority,
            tags: item.tags.clone(),
            updated_at: item.updated_at,
            date: item.date(),
        }
    }
}

/// The detail-view projection returned by `get_item_detail`.
///
/// Carries the full item plus the `related` split by the targets' base
/// types (unresolvable targets fall into the side their token was given on,
/// defaulting to tasks).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: Item,
    pub related_tasks: Vec<String>,
    pub related_documents: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl ItemDetail {
    pub fn new(item: Item, related_tasks: Vec<String>, related_documents: Vec<String>) -> Self {
        let date = item.date();
        Self {
            item,
            related_tasks,
            related_documents,
            date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_item() {
        let item = Item::default();
        assert_eq!(item.status, "Open");
        assert_eq!(item.priority, Priority::Medium);
        assert!(item.tags.is_empty());
    }

    #[test]
    fn builder_basic() {
        let item = ItemBuilder::new("issues", "Auth Bug")
            .id(ItemId::Seq(1))
            .priority(Priority::High)
            .tags(vec!["bug".into(), "auth".into()])
            .build();
        assert_eq!(item.type_name, "issues");
        assert_eq!(item.title, "Auth Bug");
        assert_eq!(item.id, ItemId::Seq(1));
        assert_eq!(item.tags, vec!["bug", "auth"]);
    }

    #[test]
    fn item_serde_roundtrip() {
        let item = ItemBuilder::new("docs", "API Guide")
            .id(ItemId::Seq(2))
            .content("# Guide")
            .related(vec![ItemRef::parse("issues-1").unwrap()])
            .build();
        let json = serde_json::to_string(&item).unwrap();
        let back: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn type_field_renamed_on_wire() {
        let item = ItemBuilder::new("issues", "T").id(ItemId::Seq(1)).build();
        let value = serde_json::to_value(&item).unwrap();
        assert!(value.get("type").is_some());
        assert!(value.get("type_name").is_none());
    }

    #[test]
    fn list_view_field_set() {
        let item = ItemBuilder::new("issues", "T")
            .id(ItemId::Seq(1))
            .content("hidden")
            .build();
        let view = ListItem::from(&item);
        let value = serde_json::to_value(&view).unwrap();
        let mut keys: Vec<&str> =
            value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["description", "id", "priority", "status", "tags", "title", "type", "updated_at"]
        );
    }

    #[test]
    fn list_view_includes_date_for_dailies() {
        let item = ItemBuilder::new("dailies", "Summary")
            .id(ItemId::Key("2025-01-15".into()))
            .build();
        let view = ListItem::from(&item);
        assert_eq!(view.date.as_deref(), Some("2025-01-15"));
    }

    #[test]
    fn detail_view_contains_content() {
        let item = ItemBuilder::new("docs", "T")
            .id(ItemId::Seq(1))
            .content("body")
            .build();
        let detail = ItemDetail::new(item, vec![], vec![]);
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["content"], "body");
        assert!(value.get("related_tasks").is_some());
    }
}
