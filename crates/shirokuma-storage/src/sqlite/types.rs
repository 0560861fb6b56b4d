//! Type registry rows for [`IndexStore`].

use rusqlite::{Connection, OptionalExtension, params};

use shirokuma_core::enums::{BaseType, TypeDef};

use crate::error::{Result, StorageError};
use crate::sqlite::sequences;
use crate::sqlite::store::IndexStore;

fn scan_type(row: &rusqlite::Row<'_>) -> rusqlite::Result<TypeDef> {
    let base_type_str: String = row.get(1)?;
    Ok(TypeDef {
        name: row.get(0)?,
        base_type: BaseType::parse(&base_type_str).unwrap_or(BaseType::Documents),
        is_reserved: row.get::<_, i64>(2)? != 0,
        description: row.get(3)?,
    })
}

/// Looks up a type definition.
pub(crate) fn get_type(conn: &Connection, name: &str) -> Result<TypeDef> {
    conn.query_row(
        "SELECT name, base_type, is_reserved, description FROM types WHERE name = ?1",
        params![name],
        scan_type,
    )
    .optional()?
    .ok_or_else(|| StorageError::not_found("type", name))
}

/// Lists every registered type, base types first, then by name.
pub(crate) fn list_types(conn: &Connection) -> Result<Vec<TypeDef>> {
    let mut stmt = conn.prepare(
        "SELECT name, base_type, is_reserved, description FROM types
         ORDER BY base_type, is_reserved, name",
    )?;
    let rows = stmt.query_map([], scan_type)?;
    let mut types = Vec::new();
    for row in rows {
        types.push(row?);
    }
    Ok(types)
}

/// Registers a new type with its sequence row. Fails with a conflict if the
/// name is taken.
pub(crate) fn insert_type(
    conn: &Connection,
    name: &str,
    base_type: BaseType,
    description: Option<&str>,
) -> Result<()> {
    let affected = conn.execute(
        "INSERT OR IGNORE INTO types (name, base_type, is_reserved, description)
         VALUES (?1, ?2, 0, ?3)",
        params![name, base_type.as_str(), description],
    )?;
    if affected == 0 {
        return Err(StorageError::conflict(format!(
            "type \"{name}\" already exists"
        )));
    }
    sequences::ensure_sequence(conn, name, base_type.as_str())
}

/// Updates a type's description (the name is immutable).
pub(crate) fn update_type_description(
    conn: &Connection,
    name: &str,
    description: &str,
) -> Result<()> {
    let affected = conn.execute(
        "UPDATE types SET description = ?2 WHERE name = ?1",
        params![name, description],
    )?;
    if affected == 0 {
        return Err(StorageError::not_found("type", name));
    }
    Ok(())
}

/// Removes a type and its sequence row. The caller checks emptiness and
/// reservation first.
pub(crate) fn remove_type(conn: &Connection, name: &str) -> Result<()> {
    let affected = conn.execute("DELETE FROM types WHERE name = ?1", params![name])?;
    if affected == 0 {
        return Err(StorageError::not_found("type", name));
    }
    sequences::drop_sequence(conn, name)
}

impl IndexStore {
    /// Looks up a type definition.
    pub fn get_type(&self, name: &str) -> Result<TypeDef> {
        let conn = self.lock_conn()?;
        get_type(&conn, name)
    }

    /// Lists every registered type.
    pub fn list_types(&self) -> Result<Vec<TypeDef>> {
        let conn = self.lock_conn()?;
        list_types(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> IndexStore {
        IndexStore::open_in_memory().unwrap()
    }

    #[test]
    fn default_types_registered() {
        let store = test_store();
        let issues = store.get_type("issues").unwrap();
        assert_eq!(issues.base_type, BaseType::Tasks);
        assert!(!issues.is_reserved);
        let docs = store.get_type("docs").unwrap();
        assert_eq!(docs.base_type, BaseType::Documents);
    }

    #[test]
    fn insert_type_creates_sequence() {
        let store = test_store();
        let conn = store.lock_conn().unwrap();
        insert_type(&conn, "bugs", BaseType::Tasks, Some("Bug tracker")).unwrap();
        drop(conn);
        assert_eq!(store.sequence_value("bugs").unwrap(), 0);
    }

    #[test]
    fn duplicate_type_conflicts() {
        let store = test_store();
        let conn = store.lock_conn().unwrap();
        let err = insert_type(&conn, "issues", BaseType::Tasks, None).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn remove_type_drops_sequence() {
        let store = test_store();
        let conn = store.lock_conn().unwrap();
        insert_type(&conn, "notes", BaseType::Documents, None).unwrap();
        remove_type(&conn, "notes").unwrap();
        assert!(get_type(&conn, "notes").unwrap_err().is_not_found());
        assert!(sequences::current_value(&conn, "notes").unwrap_err().is_not_found());
    }
}
