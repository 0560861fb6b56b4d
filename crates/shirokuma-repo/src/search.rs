//! Search service: AND full-text, suggestions, tag-grouped lookup.

use std::collections::BTreeMap;

use serde::Serialize;

use shirokuma_core::filter::{SUGGEST_MAX_LIMIT, SearchPage};
use shirokuma_core::item::{Item, ListItem};
use shirokuma_core::validation::ValidationError;
use shirokuma_storage::sqlite::search::build_match_expr;

use crate::error::Result;
use crate::repository::Repository;

/// One full-text hit: the list-view projection plus a relevance score.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub item: ListItem,
    pub score: f64,
}

/// Tag-search results grouped by base type, then by type name. Items are
/// full items (backward-compat surface, unlike list views).
#[derive(Debug, Clone, Default, Serialize)]
pub struct TagSearchResults {
    pub tasks: BTreeMap<String, Vec<Item>>,
    pub documents: BTreeMap<String, Vec<Item>>,
}

impl Repository {
    /// Full-text search with AND semantics: every whitespace-separated
    /// token must match in `title + description + content`. An empty query
    /// is rejected.
    pub fn search_items(
        &self,
        query: &str,
        types: &[String],
        page: SearchPage,
    ) -> Result<Vec<SearchHit>> {
        let Some(expr) = build_match_expr(query) else {
            return Err(ValidationError::EmptyQuery.into());
        };
        let rows = self.store().search_rows(&expr, types, page)?;
        let mut hits = Vec::with_capacity(rows.len());
        for (mut item, score) in rows {
            item.tags = self.store().item_tags(&item.type_name, &item.id)?;
            hits.push(SearchHit {
                item: ListItem::from(&item),
                score,
            });
        }
        Ok(hits)
    }

    /// Prefix suggestions over titles and tag names. The exact query string
    /// sorts first, then candidates by descending frequency, then
    /// alphabetically. `limit` is clamped to at most 20.
    pub fn search_suggest(
        &self,
        query: &str,
        types: &[String],
        limit: Option<u32>,
    ) -> Result<Vec<String>> {
        let limit = limit.unwrap_or(10).clamp(1, SUGGEST_MAX_LIMIT);
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        // Over-fetch both sources, then merge: the same string can appear
        // as a title and a tag.
        let mut merged: BTreeMap<String, i64> = BTreeMap::new();
        for (text, freq) in self
            .store()
            .title_suggestions(query, types, SUGGEST_MAX_LIMIT)?
        {
            *merged.entry(text).or_insert(0) += freq;
        }
        for (text, freq) in self.store().tag_suggestions(query, SUGGEST_MAX_LIMIT)? {
            *merged.entry(text).or_insert(0) += freq;
        }

        let mut candidates: Vec<(String, i64)> = merged.into_iter().collect();
        candidates.sort_by(|a, b| {
            let a_exact = a.0 == query;
            let b_exact = b.0 == query;
            b_exact
                .cmp(&a_exact)
                .then(b.1.cmp(&a.1))
                .then(a.0.cmp(&b.0))
        });

        Ok(candidates
            .into_iter()
            .take(limit as usize)
            .map(|(text, _)| text)
            .collect())
    }

    /// Exact tag lookup, grouped by base type and type name. Sessions and
    /// dailies group under tasks.
    pub fn search_items_by_tag(
        &self,
        tag: &str,
        types: &[String],
    ) -> Result<TagSearchResults> {
        let rows = self.store().items_by_tag(tag, types)?;
        let mut results = TagSearchResults::default();
        for mut item in rows {
            item.tags = self.store().item_tags(&item.type_name, &item.id)?;
            item.related = self.store().item_relations(&item.type_name, &item.id)?;
            let group = match self.store().get_type(&item.type_name) {
                Ok(td) if td.base_type == shirokuma_core::enums::BaseType::Documents => {
                    &mut results.documents
                }
                _ => &mut results.tasks,
            };
            group.entry(item.type_name.clone()).or_default().push(item);
        }
        Ok(results)
    }
}
