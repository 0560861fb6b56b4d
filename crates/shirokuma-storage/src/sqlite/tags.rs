//! Tag operations for [`IndexStore`].
//!
//! Tag names are unique and stored as-is (Unicode allowed). The
//! `item_tags` join table carries a `position` column so an item's tag
//! order survives round trips.

use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

use shirokuma_core::id::ItemId;

use crate::error::{Result, StorageError};
use crate::sqlite::store::IndexStore;

/// A tag row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Connection-level helpers
// ---------------------------------------------------------------------------

/// Returns the id for `name`, registering the tag if it is unknown.
pub(crate) fn ensure_tag(conn: &Connection, name: &str) -> Result<i64> {
    conn.execute(
        "INSERT OR IGNORE INTO tags (name) VALUES (?1)",
        params![name],
    )?;
    let id = conn.query_row(
        "SELECT id FROM tags WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(id)
}

/// Replaces the tag set of an item, auto-registering unknown names and
/// recording insertion order.
pub(crate) fn set_item_tags(
    conn: &Connection,
    type_name: &str,
    id: &ItemId,
    tags: &[String],
) -> Result<()> {
    let id_str = id.to_string();
    conn.execute(
        "DELETE FROM item_tags WHERE item_type = ?1 AND item_id = ?2",
        params![type_name, id_str],
    )?;
    for (position, name) in tags.iter().enumerate() {
        let tag_id = ensure_tag(conn, name)?;
        conn.execute(
            "INSERT OR IGNORE INTO item_tags (item_type, item_id, tag_id, position)
             VALUES (?1, ?2, ?3, ?4)",
            params![type_name, id_str, tag_id, position as i64],
        )?;
    }
    Ok(())
}

/// Returns an item's tag names in insertion order.
pub(crate) fn get_item_tags(conn: &Connection, type_name: &str, id: &ItemId) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.name FROM item_tags it JOIN tags t ON t.id = it.tag_id
         WHERE it.item_type = ?1 AND it.item_id = ?2
         ORDER BY it.position",
    )?;
    let rows = stmt.query_map(params![type_name, id.to_string()], |row| row.get(0))?;
    let mut tags = Vec::new();
    for row in rows {
        tags.push(row?);
    }
    Ok(tags)
}

/// Registers a tag explicitly. Fails with a conflict if it already exists.
pub(crate) fn create_tag(conn: &Connection, name: &str) -> Result<Tag> {
    let affected = conn.execute(
        "INSERT OR IGNORE INTO tags (name) VALUES (?1)",
        params![name],
    )?;
    if affected == 0 {
        return Err(StorageError::conflict(format!(
            "tag \"{name}\" already exists"
        )));
    }
    let id = conn.query_row(
        "SELECT id FROM tags WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(Tag {
        id,
        name: name.to_owned(),
    })
}

/// Deletes a tag. The `ON DELETE CASCADE` on `item_tags.tag_id` removes it
/// from every item. Returns the `(type, id)` pairs that carried the tag so
/// the caller can re-project their Markdown files.
pub(crate) fn delete_tag(conn: &Connection, name: &str) -> Result<Vec<(String, ItemId)>> {
    let tag_id: Option<i64> = conn
        .query_row("SELECT id FROM tags WHERE name = ?1", params![name], |row| {
            row.get(0)
        })
        .optional()?;
    let Some(tag_id) = tag_id else {
        return Err(StorageError::not_found("tag", name));
    };

    let affected = items_with_tag_id(conn, tag_id)?;
    conn.execute("DELETE FROM tags WHERE id = ?1", params![tag_id])?;
    Ok(affected)
}

fn items_with_tag_id(conn: &Connection, tag_id: i64) -> Result<Vec<(String, ItemId)>> {
    let mut stmt =
        conn.prepare("SELECT item_type, item_id FROM item_tags WHERE tag_id = ?1")?;
    let rows = stmt.query_map(params![tag_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (t, i) = row?;
        out.push((t, ItemId::parse(&i)));
    }
    Ok(out)
}

/// Lists all tags in name order.
pub(crate) fn list_tags(conn: &Connection) -> Result<Vec<Tag>> {
    let mut stmt = conn.prepare("SELECT id, name FROM tags ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    let mut tags = Vec::new();
    for row in rows {
        tags.push(row?);
    }
    Ok(tags)
}

/// Lists tags whose name contains `pattern`.
pub(crate) fn search_tags(conn: &Connection, pattern: &str) -> Result<Vec<Tag>> {
    let mut stmt =
        conn.prepare("SELECT id, name FROM tags WHERE name LIKE ?1 ESCAPE '\\' ORDER BY name")?;
    let like = format!("%{}%", escape_like(pattern));
    let rows = stmt.query_map(params![like], |row| {
        Ok(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    let mut tags = Vec::new();
    for row in rows {
        tags.push(row?);
    }
    Ok(tags)
}

/// Escapes `%`/`_` for a LIKE pattern with `\` as the escape character.
pub(crate) fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

// ---------------------------------------------------------------------------
// IndexStore methods
// ---------------------------------------------------------------------------

impl IndexStore {
    /// Lists all registered tags.
    pub fn list_tags(&self) -> Result<Vec<Tag>> {
        let conn = self.lock_conn()?;
        list_tags(&conn)
    }

    /// Lists tags matching a substring pattern.
    pub fn search_tags(&self, pattern: &str) -> Result<Vec<Tag>> {
        let conn = self.lock_conn()?;
        search_tags(&conn, pattern)
    }

    /// Returns an item's tag names in insertion order.
    pub fn item_tags(&self, type_name: &str, id: &ItemId) -> Result<Vec<String>> {
        let conn = self.lock_conn()?;
        get_item_tags(&conn, type_name, id)
    }

    /// Total number of registered tags.
    pub fn count_tags(&self) -> Result<i64> {
        let conn = self.lock_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::items::insert_item;
    use crate::sqlite::statuses::resolve_status;
    use shirokuma_core::item::ItemBuilder;

    fn test_store() -> IndexStore {
        IndexStore::open_in_memory().unwrap()
    }

    #[test]
    fn tags_preserve_insertion_order() {
        let store = test_store();
        let conn = store.lock_conn().unwrap();
        let item = ItemBuilder::new("issues", "T").id(ItemId::Seq(1)).build();
        let status = resolve_status(&conn, "Open").unwrap();
        insert_item(&conn, &item, status.id).unwrap();

        set_item_tags(
            &conn,
            "issues",
            &ItemId::Seq(1),
            &["zulu".into(), "alpha".into(), "mike".into()],
        )
        .unwrap();
        let tags = get_item_tags(&conn, "issues", &ItemId::Seq(1)).unwrap();
        assert_eq!(tags, vec!["zulu", "alpha", "mike"]);
    }

    #[test]
    fn create_tag_conflicts_on_duplicate() {
        let store = test_store();
        let conn = store.lock_conn().unwrap();
        create_tag(&conn, "bug").unwrap();
        let err = create_tag(&conn, "bug").unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn delete_tag_cascades_to_items() {
        let store = test_store();
        let conn = store.lock_conn().unwrap();
        let item = ItemBuilder::new("docs", "D").id(ItemId::Seq(1)).build();
        let status = resolve_status(&conn, "Open").unwrap();
        insert_item(&conn, &item, status.id).unwrap();
        set_item_tags(&conn, "docs", &ItemId::Seq(1), &["api".into()]).unwrap();

        let affected = delete_tag(&conn, "api").unwrap();
        assert_eq!(affected, vec![("docs".to_owned(), ItemId::Seq(1))]);

        let tags = get_item_tags(&conn, "docs", &ItemId::Seq(1)).unwrap();
        assert!(tags.is_empty());
        assert!(list_tags(&conn).unwrap().is_empty());
    }

    #[test]
    fn delete_missing_tag_is_not_found() {
        let store = test_store();
        let conn = store.lock_conn().unwrap();
        let err = delete_tag(&conn, "ghost").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn unicode_tags_stored_as_is() {
        let store = test_store();
        let conn = store.lock_conn().unwrap();
        create_tag(&conn, "日本語").unwrap();
        let tags = search_tags(&conn, "日本").unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "日本語");
    }

    #[test]
    fn like_escaping() {
        assert_eq!(escape_like("50%_a"), "50\\%\\_a");
    }
}
