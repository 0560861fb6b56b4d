//! Status lookups for [`IndexStore`].
//!
//! The status table is seeded once and read-only afterwards; there are no
//! create/update/delete entry points anywhere in this crate.

use rusqlite::{Connection, OptionalExtension, params};

use shirokuma_core::status::Status;

use crate::error::{Result, StorageError};
use crate::sqlite::store::IndexStore;

/// Resolves a status name to its row.
pub(crate) fn resolve_status(conn: &Connection, name: &str) -> Result<Status> {
    conn.query_row(
        "SELECT id, name, is_closable, sort_order FROM statuses WHERE name = ?1",
        params![name],
        scan_status,
    )
    .optional()?
    .ok_or_else(|| StorageError::not_found("status", name))
}

/// Lists every status in sort order.
pub(crate) fn list_statuses(conn: &Connection) -> Result<Vec<Status>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, is_closable, sort_order FROM statuses ORDER BY sort_order",
    )?;
    let rows = stmt.query_map([], scan_status)?;
    let mut statuses = Vec::new();
    for row in rows {
        statuses.push(row?);
    }
    Ok(statuses)
}

fn scan_status(row: &rusqlite::Row<'_>) -> rusqlite::Result<Status> {
    Ok(Status {
        id: row.get(0)?,
        name: row.get(1)?,
        is_closable: row.get::<_, i64>(2)? != 0,
        sort_order: row.get(3)?,
    })
}

impl IndexStore {
    /// Resolves a status name to its row.
    pub fn resolve_status(&self, name: &str) -> Result<Status> {
        let conn = self.lock_conn()?;
        resolve_status(&conn, name)
    }

    /// Lists every status in sort order.
    pub fn list_statuses(&self) -> Result<Vec<Status>> {
        let conn = self.lock_conn()?;
        list_statuses(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_known_status() {
        let store = IndexStore::open_in_memory().unwrap();
        let status = store.resolve_status("In Progress").unwrap();
        assert!(!status.is_closable);
        let closed = store.resolve_status("Closed").unwrap();
        assert!(closed.is_closable);
    }

    #[test]
    fn resolve_unknown_status_is_not_found() {
        let store = IndexStore::open_in_memory().unwrap();
        assert!(store.resolve_status("Bogus").unwrap_err().is_not_found());
    }

    #[test]
    fn list_in_sort_order() {
        let store = IndexStore::open_in_memory().unwrap();
        let statuses = store.list_statuses().unwrap();
        assert_eq!(statuses.first().map(|s| s.name.as_str()), Some("Open"));
        assert_eq!(statuses.last().map(|s| s.name.as_str()), Some("Rejected"));
    }
}
