//! Relation edge operations for [`IndexStore`].
//!
//! Edges are directed `(source, target)` pairs of typed item keys. Targets
//! may dangle: deleting an item leaves inbound edges in place so the
//! orphaned reference stays observable.

use rusqlite::{Connection, params};

use shirokuma_core::id::ItemId;
use shirokuma_core::refs::ItemRef;

use crate::error::Result;
use crate::sqlite::store::IndexStore;

/// Replaces the outbound edge set of an item, recording insertion order.
pub(crate) fn set_item_relations(
    conn: &Connection,
    type_name: &str,
    id: &ItemId,
    related: &[ItemRef],
) -> Result<()> {
    let id_str = id.to_string();
    conn.execute(
        "DELETE FROM item_relations WHERE source_type = ?1 AND source_id = ?2",
        params![type_name, id_str],
    )?;
    for (position, target) in related.iter().enumerate() {
        conn.execute(
            "INSERT OR IGNORE INTO item_relations
                (source_type, source_id, target_type, target_id, position)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                type_name,
                id_str,
                target.type_name,
                target.id.to_string(),
                position as i64
            ],
        )?;
    }
    Ok(())
}

/// Returns the outbound edges of an item in insertion order.
pub(crate) fn get_item_relations(
    conn: &Connection,
    type_name: &str,
    id: &ItemId,
) -> Result<Vec<ItemRef>> {
    let mut stmt = conn.prepare(
        "SELECT target_type, target_id FROM item_relations
         WHERE source_type = ?1 AND source_id = ?2
         ORDER BY position",
    )?;
    let rows = stmt.query_map(params![type_name, id.to_string()], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    let mut refs = Vec::new();
    for row in rows {
        let (t, i) = row?;
        refs.push(ItemRef::new(t, ItemId::parse(&i)));
    }
    Ok(refs)
}

/// Returns the `(type, id)` keys of items holding an edge to the target.
pub(crate) fn inbound_sources(
    conn: &Connection,
    target_type: &str,
    target_id: &ItemId,
) -> Result<Vec<(String, ItemId)>> {
    let mut stmt = conn.prepare(
        "SELECT source_type, source_id FROM item_relations
         WHERE target_type = ?1 AND target_id = ?2",
    )?;
    let rows = stmt.query_map(params![target_type, target_id.to_string()], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (t, i) = row?;
        out.push((t, ItemId::parse(&i)));
    }
    Ok(out)
}

/// Rewrites every edge pointing at `(old_type, old_id)` to the new target.
/// Returns the number of rewritten edges.
pub(crate) fn retarget_relations(
    conn: &Connection,
    old_type: &str,
    old_id: &ItemId,
    new_type: &str,
    new_id: &ItemId,
) -> Result<usize> {
    let affected = conn.execute(
        "UPDATE item_relations SET target_type = ?3, target_id = ?4
         WHERE target_type = ?1 AND target_id = ?2",
        params![
            old_type,
            old_id.to_string(),
            new_type,
            new_id.to_string()
        ],
    )?;
    Ok(affected)
}

impl IndexStore {
    /// Returns the outbound edges of an item in insertion order.
    pub fn item_relations(&self, type_name: &str, id: &ItemId) -> Result<Vec<ItemRef>> {
        let conn = self.lock_conn()?;
        get_item_relations(&conn, type_name, id)
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

    fn seed_item(conn: &Connection, type_name: &str, id: ItemId) {
        let item = ItemBuilder::new(type_name, format!("{type_name}-{id}"))
            .id(id)
            .build();
        let status = resolve_status(conn, "Open").unwrap();
        insert_item(conn, &item, status.id).unwrap();
    }

    #[test]
    fn relations_roundtrip_in_order() {
        let store = test_store();
        let conn = store.lock_conn().unwrap();
        seed_item(&conn, "plans", ItemId::Seq(1));

        let refs = vec![
            ItemRef::parse("docs-2").unwrap(),
            ItemRef::parse("issues-1").unwrap(),
        ];
        set_item_relations(&conn, "plans", &ItemId::Seq(1), &refs).unwrap();
        let got = get_item_relations(&conn, "plans", &ItemId::Seq(1)).unwrap();
        assert_eq!(got, refs);
    }

    #[test]
    fn dangling_target_is_kept() {
        let store = test_store();
        let conn = store.lock_conn().unwrap();
        seed_item(&conn, "plans", ItemId::Seq(1));

        let refs = vec![ItemRef::parse("issues-999").unwrap()];
        set_item_relations(&conn, "plans", &ItemId::Seq(1), &refs).unwrap();
        let got = get_item_relations(&conn, "plans", &ItemId::Seq(1)).unwrap();
        assert_eq!(got[0].token(), "issues-999");
    }

    #[test]
    fn retarget_rewrites_inbound_edges() {
        let store = test_store();
        let conn = store.lock_conn().unwrap();
        seed_item(&conn, "plans", ItemId::Seq(1));
        seed_item(&conn, "plans", ItemId::Seq(2));

        let target = ItemRef::parse("issues-1").unwrap();
        set_item_relations(&conn, "plans", &ItemId::Seq(1), &[target.clone()]).unwrap();
        set_item_relations(&conn, "plans", &ItemId::Seq(2), &[target]).unwrap();

        let n = retarget_relations(&conn, "issues", &ItemId::Seq(1), "bugs", &ItemId::Seq(7))
            .unwrap();
        assert_eq!(n, 2);

        let got = get_item_relations(&conn, "plans", &ItemId::Seq(1)).unwrap();
        assert_eq!(got[0].token(), "bugs-7");
    }

    #[test]
    fn inbound_sources_finds_referrers() {
        let store = test_store();
        let conn = store.lock_conn().unwrap();
        seed_item(&conn, "plans", ItemId::Seq(1));
        set_item_relations(
            &conn,
            "plans",
            &ItemId::Seq(1),
            &[ItemRef::parse("issues-3").unwrap()],
        )
        .unwrap();

        let sources = inbound_sources(&conn, "issues", &ItemId::Seq(3)).unwrap();
        assert_eq!(sources, vec![("plans".to_owned(), ItemId::Seq(1))]);
    }
}
