//! Per-type monotonic id allocator.
//!
//! The sequences table is the only source of new ids for normal types.
//! Counters never decrement: deleting the max item does not free its id,
//! and rebuild only ever raises a counter to the observed maximum.

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{Result, StorageError};
use crate::sqlite::store::IndexStore;

/// Allocates the next id for a type by incrementing its counter.
pub(crate) fn next_id(conn: &Connection, type_name: &str) -> Result<i64> {
    let affected = conn.execute(
        "UPDATE sequences SET current_value = current_value + 1 WHERE type = ?1",
        params![type_name],
    )?;
    if affected == 0 {
        return Err(StorageError::not_found("sequence", type_name));
    }
    let value = conn.query_row(
        "SELECT current_value FROM sequences WHERE type = ?1",
        params![type_name],
        |row| row.get(0),
    )?;
    Ok(value)
}

/// Reads a counter without touching it.
pub(crate) fn current_value(conn: &Connection, type_name: &str) -> Result<i64> {
    conn.query_row(
        "SELECT current_value FROM sequences WHERE type = ?1",
        params![type_name],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| StorageError::not_found("sequence", type_name))
}

/// Forces a counter to a value. Only rebuild/import call this.
pub(crate) fn set_value(conn: &Connection, type_name: &str, value: i64) -> Result<()> {
    let affected = conn.execute(
        "UPDATE sequences SET current_value = ?2 WHERE type = ?1",
        params![type_name, value],
    )?;
    if affected == 0 {
        return Err(StorageError::not_found("sequence", type_name));
    }
    Ok(())
}

/// Raises a counter to at least `value` (used when importing with
/// preserved ids).
pub(crate) fn raise_to(conn: &Connection, type_name: &str, value: i64) -> Result<()> {
    conn.execute(
        "UPDATE sequences SET current_value = MAX(current_value, ?2) WHERE type = ?1",
        params![type_name, value],
    )?;
    Ok(())
}

/// Registers a sequence row for a new type, starting at zero.
pub(crate) fn ensure_sequence(conn: &Connection, type_name: &str, base_type: &str) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO sequences (type, base_type, current_value) VALUES (?1, ?2, 0)",
        params![type_name, base_type],
    )?;
    Ok(())
}

/// Removes the sequence row of a deleted type.
pub(crate) fn drop_sequence(conn: &Connection, type_name: &str) -> Result<()> {
    conn.execute("DELETE FROM sequences WHERE type = ?1", params![type_name])?;
    Ok(())
}

/// Reads every counter as `(type, current_value)`.
pub(crate) fn all_sequences(conn: &Connection) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare("SELECT type, current_value FROM sequences ORDER BY type")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

impl IndexStore {
    /// Reads a sequence counter.
    pub fn sequence_value(&self, type_name: &str) -> Result<i64> {
        let conn = self.lock_conn()?;
        current_value(&conn, type_name)
    }
}
