//! Item ⇄ projection-file mapping.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use shirokuma_core::enums::Priority;
use shirokuma_core::id::ItemId;
use shirokuma_core::item::Item;
use shirokuma_core::refs::ItemRef;

use crate::front_matter::{MarkdownError, assemble_document, split_document};

/// The front-matter shape of one projection file.
///
/// Unrecognised keys land in `extra` so a hand-edited file keeps them
/// across a parse/serialize round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDoc {
    pub id: ItemId,

    #[serde(rename = "type")]
    pub type_name: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub status: String,

    pub priority: Priority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<ItemRef>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl ItemDoc {
    /// Builds the front-matter view of an item. `content` is not part of
    /// the block; it becomes the file body.
    pub fn from_item(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            type_name: item.type_name.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            status: item.status.clone(),
            priority: item.priority,
            category: item.category.clone(),
            version: item.version.clone(),
            start_date: item.start_date,
            end_date: item.end_date,
            tags: item.tags.clone(),
            related: item.related.clone(),
            created_at: item.created_at,
            updated_at: item.updated_at,
            extra: BTreeMap::new(),
        }
    }

    /// Combines the front matter with a body into an [`Item`]. An empty
    /// body reads back as no content.
    pub fn into_item(self, body: &str) -> Item {
        Item {
            id: self.id,
            type_name: self.type_name,
            title: self.title,
            description: self.description,
            content: if body.is_empty() {
                None
            } else {
                Some(body.to_owned())
            },
            status: self.status,
            priority: self.priority,
            category: self.category,
            version: self.version,
            start_date: self.start_date,
            end_date: self.end_date,
            tags: self.tags,
            related: self.related,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Serialises an item into projection-file text.
pub fn render_item(item: &Item) -> crate::Result<String> {
    let doc = ItemDoc::from_item(item);
    let yaml = serde_yaml::to_string(&doc)?;
    Ok(assemble_document(
        &yaml,
        item.content.as_deref().unwrap_or(""),
    ))
}

/// Parses projection-file text back into an item.
pub fn parse_item(text: &str, path: &Path) -> crate::Result<Item> {
    let (yaml, body) = split_document(text).map_err(|e| match e {
        MarkdownError::Malformed { reason, .. } => MarkdownError::malformed(path, reason),
        other => other,
    })?;
    let doc: ItemDoc = serde_yaml::from_str(yaml)
        .map_err(|e| MarkdownError::malformed(path, e.to_string()))?;
    Ok(doc.into_item(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shirokuma_core::item::ItemBuilder;
    use std::path::PathBuf;

    fn sample_item() -> Item {
        ItemBuilder::new("issues", "Auth Bug")
            .id(ItemId::Seq(1))
            .description("login broken")
            .content("# Notes\n\nUsers cannot log in.\n")
            .priority(Priority::High)
            .tags(vec!["bug".into(), "auth".into()])
            .related(vec![ItemRef::parse("docs-2").unwrap()])
            .build()
    }

    #[test]
    fn render_parse_roundtrip() {
        let item = sample_item();
        let text = render_item(&item).unwrap();
        let back = parse_item(&text, &PathBuf::from("issues-1.md")).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn daily_key_id_roundtrip() {
        let item = ItemBuilder::new("dailies", "Daily summary")
            .id(ItemId::Key("2025-01-15".into()))
            .content("did things")
            .build();
        let text = render_item(&item).unwrap();
        let back = parse_item(&text, &PathBuf::from("2025-01-15.md")).unwrap();
        assert_eq!(back.id, ItemId::Key("2025-01-15".into()));
    }

    #[test]
    fn unicode_content_byte_for_byte() {
        let body = "🌍 国際 Test with emojis 🎉 and `code`\n";
        let item = ItemBuilder::new("docs", "🌍 国際 Test")
            .id(ItemId::Seq(3))
            .content(body)
            .build();
        let text = render_item(&item).unwrap();
        let back = parse_item(&text, &PathBuf::from("docs-3.md")).unwrap();
        assert_eq!(back.content.as_deref(), Some(body));
        assert_eq!(back.title, "🌍 国際 Test");
    }

    #[test]
    fn item_without_content_has_empty_body() {
        let item = ItemBuilder::new("issues", "No body").id(ItemId::Seq(9)).build();
        let text = render_item(&item).unwrap();
        let back = parse_item(&text, &PathBuf::from("issues-9.md")).unwrap();
        assert_eq!(back.content, None);
    }

    #[test]
    fn unknown_front_matter_keys_are_kept() {
        let text = "---\nid: 1\ntype: issues\ntitle: T\nstatus: Open\npriority: MEDIUM\ncreated_at: 2025-01-15T10:00:00Z\nupdated_at: 2025-01-15T10:00:00Z\nlegacy_field: kept\n---\n\nbody\n";
        let (yaml, _) = split_document(text).unwrap();
        let doc: ItemDoc = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            doc.extra.get("legacy_field"),
            Some(&serde_yaml::Value::String("kept".into()))
        );
        // And they survive re-serialisation.
        let out = serde_yaml::to_string(&doc).unwrap();
        assert!(out.contains("legacy_field: kept"));
    }

    #[test]
    fn garbage_front_matter_is_malformed() {
        let text = "---\n: : :\n---\n\nbody";
        assert!(parse_item(text, &PathBuf::from("bad.md")).is_err());
    }
}
