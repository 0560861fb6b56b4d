//! Search queries for [`IndexStore`]: full-text, suggestions and tag joins.

use rusqlite::Connection;

use shirokuma_core::filter::SearchPage;
use shirokuma_core::item::Item;

use crate::error::Result;
use crate::sqlite::items::{ITEM_COLUMNS, scan_item};
use crate::sqlite::store::IndexStore;
use crate::sqlite::tags::escape_like;

/// Builds an FTS5 MATCH expression with AND semantics: every
/// whitespace-separated token must match. Returns `None` for a blank query.
pub fn build_match_expr(query: &str) -> Option<String> {
    let tokens: Vec<String> = query
        .split_whitespace()
        .map(|t| format!("\"{}\"", t.replace('"', "\"\"")))
        .collect();
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" AND "))
    }
}

/// Runs a full-text query. Results are item rows paired with a relevance
/// score (higher is more relevant; bm25 rank negated).
pub(crate) fn search_items(
    conn: &Connection,
    match_expr: &str,
    types: &[String],
    page: SearchPage,
) -> Result<Vec<(Item, f64)>> {
    let mut where_sql = "items_fts MATCH ?1".to_owned();
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> =
        vec![Box::new(match_expr.to_owned())];
    let mut param_idx = 2;

    if !types.is_empty() {
        let placeholders: Vec<String> = types
            .iter()
            .enumerate()
            .map(|(i, _)| format!("?{}", param_idx + i))
            .collect();
        where_sql.push_str(&format!(" AND i.type IN ({})", placeholders.join(",")));
        for t in types {
            param_values.push(Box::new(t.clone()));
        }
        param_idx += types.len();
    }

    let sql = format!(
        "SELECT {ITEM_COLUMNS}, bm25(items_fts) AS rank
         FROM items_fts
         JOIN items i ON i.type = items_fts.type AND i.id = items_fts.id
         JOIN statuses s ON s.id = i.status_id
         WHERE {where_sql}
         ORDER BY rank
         LIMIT ?{param_idx} OFFSET ?{}",
        param_idx + 1
    );
    param_values.push(Box::new(page.limit as i64));
    param_values.push(Box::new(page.offset as i64));

    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        param_values.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), |row| {
        let item = scan_item(row)?;
        let rank: f64 = row.get("rank")?;
        Ok((item, -rank))
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Title candidates starting with `prefix`, with occurrence counts.
pub(crate) fn title_suggestions(
    conn: &Connection,
    prefix: &str,
    types: &[String],
    limit: u32,
) -> Result<Vec<(String, i64)>> {
    let mut where_sql = "i.title LIKE ?1 ESCAPE '\\'".to_owned();
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> =
        vec![Box::new(format!("{}%", escape_like(prefix)))];
    let mut param_idx = 2;

    if !types.is_empty() {
        let placeholders: Vec<String> = types
            .iter()
            .enumerate()
            .map(|(i, _)| format!("?{}", param_idx + i))
            .collect();
        where_sql.push_str(&format!(" AND i.type IN ({})", placeholders.join(",")));
        for t in types {
            param_values.push(Box::new(t.clone()));
        }
        param_idx += types.len();
    }

    let sql = format!(
        "SELECT i.title, COUNT(*) AS freq FROM items i
         WHERE {where_sql}
         GROUP BY i.title
         ORDER BY freq DESC, i.title
         LIMIT ?{param_idx}"
    );
    param_values.push(Box::new(limit as i64));

    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        param_values.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), |row| {
        Ok((row.get(0)?, row.get(1)?))
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Tag-name candidates starting with `prefix`, with usage counts.
pub(crate) fn tag_suggestions(
    conn: &Connection,
    prefix: &str,
    limit: u32,
) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT t.name, COUNT(it.tag_id) AS freq
         FROM tags t LEFT JOIN item_tags it ON it.tag_id = t.id
         WHERE t.name LIKE ?1 ESCAPE '\\'
         GROUP BY t.id
         ORDER BY freq DESC, t.name
         LIMIT ?2",
    )?;
    let like = format!("{}%", escape_like(prefix));
    let rows = stmt.query_map(rusqlite::params![like, limit as i64], |row| {
        Ok((row.get(0)?, row.get(1)?))
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Full item rows carrying the given tag, optionally restricted by type,
/// ordered by type then id.
pub(crate) fn items_by_tag(
    conn: &Connection,
    tag: &str,
    types: &[String],
) -> Result<Vec<Item>> {
    let mut where_sql = "t.name = ?1".to_owned();
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(tag.to_owned())];
    let param_idx = 2;

    if !types.is_empty() {
        let placeholders: Vec<String> = types
            .iter()
            .enumerate()
            .map(|(i, _)| format!("?{}", param_idx + i))
            .collect();
        where_sql.push_str(&format!(" AND i.type IN ({})", placeholders.join(",")));
        for t in types {
            param_values.push(Box::new(t.clone()));
        }
    }

    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM items i
         JOIN statuses s ON s.id = i.status_id
         JOIN item_tags it ON it.item_type = i.type AND it.item_id = i.id
         JOIN tags t ON t.id = it.tag_id
         WHERE {where_sql}
         ORDER BY i.type, i.id"
    );

    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        param_values.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), scan_item)?;
    let mut items = Vec::new();
    for row in rows {
        items.push(row?);
    }
    Ok(items)
}

impl IndexStore {
    /// Full-text search; see [`build_match_expr`] for the AND semantics.
    pub fn search_rows(
        &self,
        match_expr: &str,
        types: &[String],
        page: SearchPage,
    ) -> Result<Vec<(Item, f64)>> {
        let conn = self.lock_conn()?;
        search_items(&conn, match_expr, types, page)
    }

    /// Title suggestion candidates.
    pub fn title_suggestions(
        &self,
        prefix: &str,
        types: &[String],
        limit: u32,
    ) -> Result<Vec<(String, i64)>> {
        let conn = self.lock_conn()?;
        title_suggestions(&conn, prefix, types, limit)
    }

    /// Tag suggestion candidates.
    pub fn tag_suggestions(&self, prefix: &str, limit: u32) -> Result<Vec<(String, i64)>> {
        let conn = self.lock_conn()?;
        tag_suggestions(&conn, prefix, limit)
    }

    /// Full items carrying a tag.
    pub fn items_by_tag(&self, tag: &str, types: &[String]) -> Result<Vec<Item>> {
        let conn = self.lock_conn()?;
        items_by_tag(&conn, tag, types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::items::insert_item;
    use crate::sqlite::statuses::resolve_status;
    use crate::sqlite::tags::set_item_tags;
    use shirokuma_core::id::ItemId;
    use shirokuma_core::item::ItemBuilder;

    fn test_store() -> IndexStore {
        IndexStore::open_in_memory().unwrap()
    }

    fn seed(store: &IndexStore, type_name: &str, n: i64, title: &str, content: &str) {
        let conn = store.lock_conn().unwrap();
        let item = ItemBuilder::new(type_name, title)
            .id(ItemId::Seq(n))
            .content(content)
            .build();
        let status = resolve_status(&conn, "Open").unwrap();
        insert_item(&conn, &item, status.id).unwrap();
    }

    #[test]
    fn match_expr_quotes_and_joins() {
        assert_eq!(build_match_expr("a b").as_deref(), Some("\"a\" AND \"b\""));
        assert_eq!(build_match_expr("  "), None);
        assert_eq!(
            build_match_expr("say \"hi\"").as_deref(),
            Some("\"say\" AND \"\"\"hi\"\"\"")
        );
    }

    #[test]
    fn and_semantics() {
        let store = test_store();
        seed(&store, "issues", 1, "Auth bug", "authentication fails on login");
        seed(&store, "issues", 2, "Perf bug", "authentication is slow");
        seed(&store, "docs", 1, "Login guide", "how to login");

        let conn = store.lock_conn().unwrap();
        let expr = build_match_expr("authentication login").unwrap();
        let hits = search_items(&conn, &expr, &[], SearchPage::default()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0.title, "Auth bug");

        // A token with no matches anywhere yields zero, not a fallback OR.
        let expr = build_match_expr("authentication unobtanium").unwrap();
        let hits = search_items(&conn, &expr, &[], SearchPage::default()).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn type_filter_restricts_results() {
        let store = test_store();
        seed(&store, "issues", 1, "Login bug", "login");
        seed(&store, "docs", 1, "Login guide", "login");

        let conn = store.lock_conn().unwrap();
        let expr = build_match_expr("login").unwrap();
        let hits =
            search_items(&conn, &expr, &["docs".to_owned()], SearchPage::default()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0.type_name, "docs");
    }

    #[test]
    fn title_suggestions_count_frequency() {
        let store = test_store();
        seed(&store, "issues", 1, "Auth bug", "");
        seed(&store, "issues", 2, "Auth bug", "");
        seed(&store, "issues", 3, "Auth flow", "");

        let conn = store.lock_conn().unwrap();
        let got = title_suggestions(&conn, "Auth", &[], 10).unwrap();
        assert_eq!(got[0], ("Auth bug".to_owned(), 2));
        assert_eq!(got[1], ("Auth flow".to_owned(), 1));
    }

    #[test]
    fn items_by_tag_joins_full_rows() {
        let store = test_store();
        seed(&store, "issues", 1, "Tagged", "body text");
        {
            let conn = store.lock_conn().unwrap();
            set_item_tags(&conn, "issues", &ItemId::Seq(1), &["bug".into()]).unwrap();
        }
        let items = store.items_by_tag("bug", &[]).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content.as_deref(), Some("body text"));
    }
}
