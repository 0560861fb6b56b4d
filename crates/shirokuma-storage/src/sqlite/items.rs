//! Item row operations for [`IndexStore`].
//!
//! All helpers take a `&Connection` so they compose inside
//! [`IndexStore::run_in_transaction`] as well as direct calls. Tag and
//! relation hydration live in their own modules; the rows read here carry
//! empty `tags`/`related` vectors.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use shirokuma_core::enums::Priority;
use shirokuma_core::filter::ListFilter;
use shirokuma_core::id::ItemId;
use shirokuma_core::item::Item;

use crate::error::{Result, StorageError};
use crate::sqlite::store::IndexStore;

// ---------------------------------------------------------------------------
// Column list (shared between queries)
// ---------------------------------------------------------------------------

/// Item columns in a deterministic order, status resolved to its name.
pub(crate) const ITEM_COLUMNS: &str = r#"
    i.type, i.id, i.title, i.description, i.content,
    s.name AS status, i.priority, i.category, i.version,
    i.start_date, i.end_date, i.created_at, i.updated_at
"#;

/// FROM clause resolving `status_id` to the status name.
pub(crate) const ITEM_FROM: &str = "items i JOIN statuses s ON s.id = i.status_id";

// ---------------------------------------------------------------------------
// Row scanning and value formatting
// ---------------------------------------------------------------------------

/// Deserialises a row into an [`Item`]. Column order MUST match
/// [`ITEM_COLUMNS`]. Tags and relations are not hydrated here.
pub(crate) fn scan_item(row: &Row<'_>) -> rusqlite::Result<Item> {
    let type_name: String = row.get("type")?;
    let id: String = row.get("id")?;
    let title: String = row.get("title")?;
    let description: Option<String> = row.get("description")?;
    let content: Option<String> = row.get("content")?;
    let status: String = row.get("status")?;
    let priority_str: String = row.get("priority")?;
    let category: Option<String> = row.get("category")?;
    let version: Option<String> = row.get("version")?;
    let start_date_str: Option<String> = row.get("start_date")?;
    let end_date_str: Option<String> = row.get("end_date")?;
    let created_at_str: String = row.get("created_at")?;
    let updated_at_str: String = row.get("updated_at")?;

    Ok(Item {
        id: ItemId::parse(&id),
        type_name,
        title,
        description,
        content,
        status,
        priority: Priority::parse(&priority_str).unwrap_or_default(),
        category,
        version,
        start_date: start_date_str.as_deref().and_then(parse_date),
        end_date: end_date_str.as_deref().and_then(parse_date),
        tags: Vec::new(),
        related: Vec::new(),
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

/// Formats a `DateTime<Utc>` as ISO 8601 TEXT with millisecond precision.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parses an ISO 8601 TEXT string into a `DateTime<Utc>`.
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    s.parse::<DateTime<Utc>>().unwrap_or_else(|_| {
        chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ")
            .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ"))
            .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
            .map(|ndt| ndt.and_utc())
            .unwrap_or_else(|_| Utc::now())
    })
}

pub(crate) fn format_date(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

// ---------------------------------------------------------------------------
// Full-text index sync
// ---------------------------------------------------------------------------

fn fts_insert(conn: &Connection, item: &Item) -> Result<()> {
    conn.execute(
        "INSERT INTO items_fts (title, description, content, type, id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            item.title,
            item.description.as_deref().unwrap_or(""),
            item.content.as_deref().unwrap_or(""),
            item.type_name,
            item.id.to_string(),
        ],
    )?;
    Ok(())
}

fn fts_delete(conn: &Connection, type_name: &str, id: &ItemId) -> Result<()> {
    conn.execute(
        "DELETE FROM items_fts WHERE type = ?1 AND id = ?2",
        params![type_name, id.to_string()],
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Connection-level helpers
// ---------------------------------------------------------------------------

/// Inserts a single item row and its full-text entry.
pub(crate) fn insert_item(conn: &Connection, item: &Item, status_id: i64) -> Result<()> {
    let affected = conn.execute(
        "INSERT OR IGNORE INTO items
            (type, id, title, description, content, status_id, priority,
             category, version, start_date, end_date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            item.type_name,
            item.id.to_string(),
            item.title,
            item.description,
            item.content,
            status_id,
            item.priority.as_str(),
            item.category,
            item.version,
            item.start_date.as_ref().map(format_date),
            item.end_date.as_ref().map(format_date),
            format_datetime(&item.created_at),
            format_datetime(&item.updated_at),
        ],
    )?;
    if affected == 0 {
        return Err(StorageError::conflict(format!(
            "{} with ID {} already exists",
            item.type_name, item.id
        )));
    }
    fts_insert(conn, item)
}

/// Rewrites every column of an existing item row and refreshes its
/// full-text entry.
pub(crate) fn update_item_row(conn: &Connection, item: &Item, status_id: i64) -> Result<()> {
    let affected = conn.execute(
        "UPDATE items SET
            title = ?3, description = ?4, content = ?5, status_id = ?6,
            priority = ?7, category = ?8, version = ?9,
            start_date = ?10, end_date = ?11, created_at = ?12, updated_at = ?13
         WHERE type = ?1 AND id = ?2",
        params![
            item.type_name,
            item.id.to_string(),
            item.title,
            item.description,
            item.content,
            status_id,
            item.priority.as_str(),
            item.category,
            item.version,
            item.start_date.as_ref().map(format_date),
            item.end_date.as_ref().map(format_date),
            format_datetime(&item.created_at),
            format_datetime(&item.updated_at),
        ],
    )?;
    if affected == 0 {
        return Err(StorageError::not_found(
            item.type_name.clone(),
            item.id.to_string(),
        ));
    }
    fts_delete(conn, &item.type_name, &item.id)?;
    fts_insert(conn, item)
}

/// Deletes an item row together with its outbound join rows and full-text
/// entry. Inbound relation rows in other items are left dangling on purpose.
pub(crate) fn delete_item(conn: &Connection, type_name: &str, id: &ItemId) -> Result<()> {
    let id_str = id.to_string();
    let affected = conn.execute(
        "DELETE FROM items WHERE type = ?1 AND id = ?2",
        params![type_name, id_str],
    )?;
    if affected == 0 {
        return Err(StorageError::not_found(type_name, id_str));
    }
    conn.execute(
        "DELETE FROM item_tags WHERE item_type = ?1 AND item_id = ?2",
        params![type_name, id_str],
    )?;
    conn.execute(
        "DELETE FROM item_relations WHERE source_type = ?1 AND source_id = ?2",
        params![type_name, id_str],
    )?;
    fts_delete(conn, type_name, id)
}

/// Retrieves a single item row.
pub(crate) fn get_item(conn: &Connection, type_name: &str, id: &ItemId) -> Result<Item> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM {ITEM_FROM} WHERE i.type = ?1 AND i.id = ?2");
    conn.query_row(&sql, params![type_name, id.to_string()], scan_item)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                StorageError::not_found(type_name, id.to_string())
            }
            other => StorageError::Query(other),
        })
}

/// Returns `true` if the item exists.
pub(crate) fn item_exists(conn: &Connection, type_name: &str, id: &ItemId) -> Result<bool> {
    let exists: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM items WHERE type = ?1 AND id = ?2",
            params![type_name, id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(exists.is_some())
}

/// Lists item rows of one type with the standard filters applied.
///
/// For reserved types the filter dates match the id's date component and
/// ordering is lexicographic (chronological); normal types order by numeric
/// id.
pub(crate) fn list_items(
    conn: &Connection,
    type_name: &str,
    filter: &ListFilter,
    is_reserved: bool,
) -> Result<Vec<Item>> {
    let mut where_clauses: Vec<String> = vec!["i.type = ?1".to_owned()];
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> =
        vec![Box::new(type_name.to_owned())];
    let mut param_idx = 2;

    if !filter.statuses.is_empty() {
        let placeholders: Vec<String> = filter
            .statuses
            .iter()
            .enumerate()
            .map(|(i, _)| format!("?{}", param_idx + i))
            .collect();
        where_clauses.push(format!("s.name IN ({})", placeholders.join(",")));
        for status in &filter.statuses {
            param_values.push(Box::new(status.clone()));
        }
        param_idx += filter.statuses.len();
    }

    if !filter.include_closed_statuses {
        where_clauses.push("s.is_closable = 0".to_owned());
    }

    // The "date" of an item: explicit start_date for normal types, the id's
    // date component for sessions/dailies.
    let date_expr = if is_reserved {
        "substr(i.id, 1, 10)"
    } else {
        "i.start_date"
    };
    if let Some(ref start) = filter.start_date {
        where_clauses.push(format!("{date_expr} >= ?{param_idx}"));
        param_values.push(Box::new(format_date(start)));
        param_idx += 1;
    }
    if let Some(ref end) = filter.end_date {
        where_clauses.push(format!("{date_expr} <= ?{param_idx}"));
        param_values.push(Box::new(format_date(end)));
        param_idx += 1;
    }

    // Tags are ANDed: every named tag must be present.
    for tag in &filter.tags {
        where_clauses.push(format!(
            "EXISTS (SELECT 1 FROM item_tags it JOIN tags t ON t.id = it.tag_id
                     WHERE it.item_type = i.type AND it.item_id = i.id AND t.name = ?{param_idx})"
        ));
        param_values.push(Box::new(tag.clone()));
        param_idx += 1;
    }

    let order_sql = if is_reserved {
        "ORDER BY i.id"
    } else {
        "ORDER BY CAST(i.id AS INTEGER)"
    };

    let limit = filter.limit.map(|l| l as i64).unwrap_or(-1);
    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM {ITEM_FROM}
         WHERE {} {order_sql} LIMIT ?{param_idx} OFFSET ?{}",
        where_clauses.join(" AND "),
        param_idx + 1,
    );
    param_values.push(Box::new(limit));
    param_values.push(Box::new(filter.offset as i64));

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

/// Lists every item row of one type, unfiltered, in id order.
pub(crate) fn list_type_raw(conn: &Connection, type_name: &str) -> Result<Vec<Item>> {
    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM {ITEM_FROM}
         WHERE i.type = ?1 ORDER BY i.id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![type_name], scan_item)?;
    let mut items = Vec::new();
    for row in rows {
        items.push(row?);
    }
    Ok(items)
}

/// Counts items of one type.
pub(crate) fn count_items_of_type(conn: &Connection, type_name: &str) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM items WHERE type = ?1",
        params![type_name],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Item counts grouped by type, for stats.
pub(crate) fn count_by_type(conn: &Connection) -> Result<Vec<(String, i64)>> {
    let mut stmt =
        conn.prepare("SELECT type, COUNT(*) FROM items GROUP BY type ORDER BY type")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Item counts grouped by status name, for stats.
pub(crate) fn count_by_status(conn: &Connection) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT s.name, COUNT(*) FROM items i JOIN statuses s ON s.id = i.status_id
         GROUP BY s.name ORDER BY s.sort_order",
    )?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Truncates the mutable item-side tables ahead of a rebuild. Statuses and
/// the type registry survive.
pub(crate) fn clear_index(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM item_relations", [])?;
    conn.execute("DELETE FROM item_tags", [])?;
    conn.execute("DELETE FROM tags", [])?;
    conn.execute("DELETE FROM items", [])?;
    conn.execute("DELETE FROM items_fts", [])?;
    Ok(())
}

// ---------------------------------------------------------------------------
// IndexStore methods
// ---------------------------------------------------------------------------

impl IndexStore {
    /// Retrieves a single item row (tags/relations not hydrated).
    pub fn get_item_row(&self, type_name: &str, id: &ItemId) -> Result<Item> {
        let conn = self.lock_conn()?;
        get_item(&conn, type_name, id)
    }

    /// Returns `true` if the item exists in the index.
    pub fn item_exists(&self, type_name: &str, id: &ItemId) -> Result<bool> {
        let conn = self.lock_conn()?;
        item_exists(&conn, type_name, id)
    }

    /// Lists item rows of one type with filters applied.
    pub fn list_item_rows(
        &self,
        type_name: &str,
        filter: &ListFilter,
        is_reserved: bool,
    ) -> Result<Vec<Item>> {
        let conn = self.lock_conn()?;
        list_items(&conn, type_name, filter, is_reserved)
    }

    /// Lists every item row of one type, unfiltered.
    pub fn list_type_rows(&self, type_name: &str) -> Result<Vec<Item>> {
        let conn = self.lock_conn()?;
        list_type_raw(&conn, type_name)
    }

    /// Counts items of one type.
    pub fn count_items(&self, type_name: &str) -> Result<i64> {
        let conn = self.lock_conn()?;
        count_items_of_type(&conn, type_name)
    }

    /// Item counts grouped by type.
    pub fn stats_by_type(&self) -> Result<Vec<(String, i64)>> {
        let conn = self.lock_conn()?;
        count_by_type(&conn)
    }

    /// Item counts grouped by status.
    pub fn stats_by_status(&self) -> Result<Vec<(String, i64)>> {
        let conn = self.lock_conn()?;
        count_by_status(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::statuses::resolve_status;
    use shirokuma_core::item::ItemBuilder;

    fn test_store() -> IndexStore {
        IndexStore::open_in_memory().unwrap()
    }

    fn insert(store: &IndexStore, item: &Item) {
        let conn = store.lock_conn().unwrap();
        let status = resolve_status(&conn, &item.status).unwrap();
        insert_item(&conn, item, status.id).unwrap();
    }

    #[test]
    fn insert_and_get_item() {
        let store = test_store();
        let item = ItemBuilder::new("issues", "Auth Bug")
            .id(ItemId::Seq(1))
            .description("login fails")
            .build();
        insert(&store, &item);

        let got = store.get_item_row("issues", &ItemId::Seq(1)).unwrap();
        assert_eq!(got.title, "Auth Bug");
        assert_eq!(got.status, "Open");
        assert_eq!(got.description.as_deref(), Some("login fails"));
    }

    #[test]
    fn insert_duplicate_id_conflicts() {
        let store = test_store();
        let item = ItemBuilder::new("issues", "First").id(ItemId::Seq(1)).build();
        insert(&store, &item);

        let conn = store.lock_conn().unwrap();
        let status = resolve_status(&conn, "Open").unwrap();
        let dup = ItemBuilder::new("issues", "Second").id(ItemId::Seq(1)).build();
        let err = insert_item(&conn, &dup, status.id).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn get_missing_item_is_not_found() {
        let store = test_store();
        let err = store.get_item_row("issues", &ItemId::Seq(99)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn delete_item_removes_row_and_fts() {
        let store = test_store();
        let item = ItemBuilder::new("issues", "Short lived")
            .id(ItemId::Seq(1))
            .build();
        insert(&store, &item);

        let conn = store.lock_conn().unwrap();
        delete_item(&conn, "issues", &ItemId::Seq(1)).unwrap();
        let fts_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM items_fts", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fts_count, 0);
    }

    #[test]
    fn list_excludes_closable_statuses_by_default() {
        let store = test_store();
        let open = ItemBuilder::new("issues", "Open one").id(ItemId::Seq(1)).build();
        let closed = ItemBuilder::new("issues", "Done one")
            .id(ItemId::Seq(2))
            .status("Closed")
            .build();
        insert(&store, &open);
        insert(&store, &closed);

        let rows = store
            .list_item_rows("issues", &ListFilter::default(), false)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Open one");

        let all = store
            .list_item_rows(
                "issues",
                &ListFilter {
                    include_closed_statuses: true,
                    ..Default::default()
                },
                false,
            )
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn list_orders_numeric_ids_numerically() {
        let store = test_store();
        for n in [2, 10, 1] {
            let item = ItemBuilder::new("issues", format!("Item {n}"))
                .id(ItemId::Seq(n))
                .build();
            insert(&store, &item);
        }
        let rows = store
            .list_item_rows("issues", &ListFilter::default(), false)
            .unwrap();
        let ids: Vec<String> = rows.iter().map(|i| i.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "2", "10"]);
    }

    #[test]
    fn list_filters_reserved_types_by_id_date() {
        let store = test_store();
        for date in ["2025-01-14", "2025-01-15", "2025-01-16"] {
            let item = ItemBuilder::new("dailies", format!("Daily {date}"))
                .id(ItemId::Key(date.into()))
                .content("notes")
                .build();
            insert(&store, &item);
        }
        let filter = ListFilter {
            start_date: parse_date("2025-01-15"),
            end_date: parse_date("2025-01-16"),
            ..Default::default()
        };
        let rows = store.list_item_rows("dailies", &filter, true).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id.to_string(), "2025-01-15");
    }

    #[test]
    fn update_rewrites_row() {
        let store = test_store();
        let mut item = ItemBuilder::new("issues", "Before")
            .id(ItemId::Seq(1))
            .build();
        insert(&store, &item);

        item.title = "After".into();
        item.priority = Priority::High;
        let conn = store.lock_conn().unwrap();
        let status = resolve_status(&conn, "Open").unwrap();
        update_item_row(&conn, &item, status.id).unwrap();
        drop(conn);

        let got = store.get_item_row("issues", &ItemId::Seq(1)).unwrap();
        assert_eq!(got.title, "After");
        assert_eq!(got.priority, Priority::High);
    }
}
