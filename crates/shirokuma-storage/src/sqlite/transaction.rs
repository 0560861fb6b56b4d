//! Transaction wrapper for [`IndexStore`].
//!
//! Exposes the connection-level helpers from the operation modules behind a
//! closure-scoped transaction: commit on `Ok`, rollback on `Err` (or drop).
//! The repository layer runs every mutating operation through this so SQL
//! writes and staged Markdown writes share one commit point.

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use shirokuma_core::enums::{BaseType, TypeDef};
use shirokuma_core::filter::ListFilter;
use shirokuma_core::id::ItemId;
use shirokuma_core::item::Item;
use shirokuma_core::refs::ItemRef;
use shirokuma_core::state::CurrentState;
use shirokuma_core::status::Status;

use crate::error::{Result, StorageError};
use crate::sqlite::store::IndexStore;
use crate::sqlite::{items, relations, search, sequences, state, statuses, tags, types};

/// A live transaction over the index. All methods delegate to the same
/// connection-level helpers used outside transactions.
pub struct IndexTx<'a> {
    pub(crate) conn: &'a Connection,
}

impl IndexTx<'_> {
    // -- Items ---------------------------------------------------------------

    pub fn insert_item(&self, item: &Item, status_id: i64) -> Result<()> {
        items::insert_item(self.conn, item, status_id)
    }

    pub fn update_item_row(&self, item: &Item, status_id: i64) -> Result<()> {
        items::update_item_row(self.conn, item, status_id)
    }

    pub fn delete_item(&self, type_name: &str, id: &ItemId) -> Result<()> {
        items::delete_item(self.conn, type_name, id)
    }

    pub fn get_item(&self, type_name: &str, id: &ItemId) -> Result<Item> {
        items::get_item(self.conn, type_name, id)
    }

    pub fn item_exists(&self, type_name: &str, id: &ItemId) -> Result<bool> {
        items::item_exists(self.conn, type_name, id)
    }

    pub fn list_items(
        &self,
        type_name: &str,
        filter: &ListFilter,
        is_reserved: bool,
    ) -> Result<Vec<Item>> {
        items::list_items(self.conn, type_name, filter, is_reserved)
    }

    pub fn count_items(&self, type_name: &str) -> Result<i64> {
        items::count_items_of_type(self.conn, type_name)
    }

    pub fn clear_index(&self) -> Result<()> {
        items::clear_index(self.conn)
    }

    // -- Tags ----------------------------------------------------------------

    pub fn set_item_tags(&self, type_name: &str, id: &ItemId, tag_names: &[String]) -> Result<()> {
        tags::set_item_tags(self.conn, type_name, id, tag_names)
    }

    pub fn get_item_tags(&self, type_name: &str, id: &ItemId) -> Result<Vec<String>> {
        tags::get_item_tags(self.conn, type_name, id)
    }

    pub fn ensure_tag(&self, name: &str) -> Result<i64> {
        tags::ensure_tag(self.conn, name)
    }

    pub fn create_tag(&self, name: &str) -> Result<tags::Tag> {
        tags::create_tag(self.conn, name)
    }

    pub fn delete_tag(&self, name: &str) -> Result<Vec<(String, ItemId)>> {
        tags::delete_tag(self.conn, name)
    }

    // -- Relations -----------------------------------------------------------

    pub fn set_item_relations(
        &self,
        type_name: &str,
        id: &ItemId,
        related: &[ItemRef],
    ) -> Result<()> {
        relations::set_item_relations(self.conn, type_name, id, related)
    }

    pub fn get_item_relations(&self, type_name: &str, id: &ItemId) -> Result<Vec<ItemRef>> {
        relations::get_item_relations(self.conn, type_name, id)
    }

    pub fn inbound_sources(
        &self,
        target_type: &str,
        target_id: &ItemId,
    ) -> Result<Vec<(String, ItemId)>> {
        relations::inbound_sources(self.conn, target_type, target_id)
    }

    pub fn retarget_relations(
        &self,
        old_type: &str,
        old_id: &ItemId,
        new_type: &str,
        new_id: &ItemId,
    ) -> Result<usize> {
        relations::retarget_relations(self.conn, old_type, old_id, new_type, new_id)
    }

    // -- Sequences -----------------------------------------------------------

    pub fn next_id(&self, type_name: &str) -> Result<i64> {
        sequences::next_id(self.conn, type_name)
    }

    pub fn sequence_value(&self, type_name: &str) -> Result<i64> {
        sequences::current_value(self.conn, type_name)
    }

    pub fn set_sequence(&self, type_name: &str, value: i64) -> Result<()> {
        sequences::set_value(self.conn, type_name, value)
    }

    pub fn raise_sequence(&self, type_name: &str, value: i64) -> Result<()> {
        sequences::raise_to(self.conn, type_name, value)
    }

    pub fn all_sequences(&self) -> Result<Vec<(String, i64)>> {
        sequences::all_sequences(self.conn)
    }

    // -- Registry ------------------------------------------------------------

    pub fn get_type(&self, name: &str) -> Result<TypeDef> {
        types::get_type(self.conn, name)
    }

    pub fn list_types(&self) -> Result<Vec<TypeDef>> {
        types::list_types(self.conn)
    }

    pub fn insert_type(
        &self,
        name: &str,
        base_type: BaseType,
        description: Option<&str>,
    ) -> Result<()> {
        types::insert_type(self.conn, name, base_type, description)
    }

    pub fn update_type_description(&self, name: &str, description: &str) -> Result<()> {
        types::update_type_description(self.conn, name, description)
    }

    pub fn remove_type(&self, name: &str) -> Result<()> {
        types::remove_type(self.conn, name)
    }

    pub fn resolve_status(&self, name: &str) -> Result<Status> {
        statuses::resolve_status(self.conn, name)
    }

    // -- Search --------------------------------------------------------------

    pub fn items_by_tag(&self, tag: &str, type_filter: &[String]) -> Result<Vec<Item>> {
        search::items_by_tag(self.conn, tag, type_filter)
    }

    // -- Current state -------------------------------------------------------

    pub fn current_state(&self) -> Result<Option<(CurrentState, i64)>> {
        state::get_state(self.conn)
    }

    pub fn put_state(&self, value: &CurrentState, updated_at: DateTime<Utc>) -> Result<i64> {
        state::put_state(self.conn, value, updated_at)
    }
}

impl IndexStore {
    /// Runs a closure inside a database transaction. The closure's error
    /// rolls everything back. Generic over the error type so callers can
    /// thread their own error enums through, as long as storage errors
    /// convert into them.
    pub fn run_in_transaction<T, E>(
        &self,
        f: impl FnOnce(&IndexTx<'_>) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        E: From<StorageError>,
    {
        let conn = self.lock_conn().map_err(E::from)?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| E::from(StorageError::Transaction(format!("failed to begin: {e}"))))?;

        let index_tx = IndexTx { conn: &tx };
        match f(&index_tx) {
            Ok(value) => {
                tx.commit().map_err(|e| {
                    E::from(StorageError::Transaction(format!("failed to commit: {e}")))
                })?;
                Ok(value)
            }
            Err(e) => {
                // Transaction is rolled back on drop.
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shirokuma_core::item::ItemBuilder;

    fn test_store() -> IndexStore {
        IndexStore::open_in_memory().unwrap()
    }

    #[test]
    fn transaction_commit() {
        let store = test_store();
        store
            .run_in_transaction(|tx| {
                let id = tx.next_id("issues")?;
                let item = ItemBuilder::new("issues", "In transaction")
                    .id(ItemId::Seq(id))
                    .build();
                let status = tx.resolve_status("Open")?;
                tx.insert_item(&item, status.id)?;
                tx.set_item_tags("issues", &item.id, &["tx".into()])?;
                Ok::<(), StorageError>(())
            })
            .unwrap();

        let item = store.get_item_row("issues", &ItemId::Seq(1)).unwrap();
        assert_eq!(item.title, "In transaction");
        let tags = store.item_tags("issues", &ItemId::Seq(1)).unwrap();
        assert_eq!(tags, vec!["tx"]);
    }

    #[test]
    fn transaction_rollback_on_error() {
        let store = test_store();
        let result: Result<()> = store.run_in_transaction(|tx| {
            let id = tx.next_id("issues")?;
            let item = ItemBuilder::new("issues", "Should rollback")
                .id(ItemId::Seq(id))
                .build();
            let status = tx.resolve_status("Open")?;
            tx.insert_item(&item, status.id)?;
            Err(StorageError::integrity("test rollback"))
        });
        assert!(result.is_err());

        // Item AND sequence increment rolled back together.
        assert!(
            store
                .get_item_row("issues", &ItemId::Seq(1))
                .unwrap_err()
                .is_not_found()
        );
        assert_eq!(store.sequence_value("issues").unwrap(), 0);
    }
}
