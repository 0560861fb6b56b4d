//! The current-state singleton row.
//!
//! Exactly one logical document lives in `system_state`, keyed by the
//! constant id 1. Tags and related references are JSON columns on the row
//! (not the item join tables) so the state document never leaks into item
//! list/search surfaces. The revision counter numbers the Markdown history
//! files.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use shirokuma_core::refs::ItemRef;
use shirokuma_core::state::{CurrentState, StateMetadata};

use crate::error::Result;
use crate::sqlite::items::{format_datetime, parse_datetime};
use crate::sqlite::store::IndexStore;

/// Reads the state row, if one has ever been written.
pub(crate) fn get_state(conn: &Connection) -> Result<Option<(CurrentState, i64)>> {
    let row: Option<(String, String, String, String, i64, Option<String>)> = conn
        .query_row(
            "SELECT content, tags, related, metadata, revision, updated_at
             FROM system_state WHERE id = 1",
            [],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            },
        )
        .optional()?;

    let Some((content, tags_json, related_json, metadata_json, revision, updated_at)) = row
    else {
        return Ok(None);
    };

    let tags: Vec<String> = serde_json::from_str(&tags_json).unwrap_or_default();
    let related: Vec<ItemRef> = serde_json::from_str(&related_json).unwrap_or_default();
    let metadata: StateMetadata = serde_json::from_str(&metadata_json).unwrap_or_default();

    Ok(Some((
        CurrentState {
            content,
            tags,
            related,
            metadata,
            updated_at: updated_at.as_deref().map(parse_datetime),
        },
        revision,
    )))
}

/// Overwrites the state row, bumping the revision. Returns the new revision.
pub(crate) fn put_state(
    conn: &Connection,
    state: &CurrentState,
    updated_at: DateTime<Utc>,
) -> Result<i64> {
    let tags_json = serde_json::to_string(&state.tags)?;
    let related_json = serde_json::to_string(&state.related)?;
    let metadata_json = serde_json::to_string(&state.metadata)?;
    conn.execute(
        "INSERT INTO system_state (id, content, tags, related, metadata, revision, updated_at)
         VALUES (1, ?1, ?2, ?3, ?4, 1, ?5)
         ON CONFLICT(id) DO UPDATE SET
            content = excluded.content,
            tags = excluded.tags,
            related = excluded.related,
            metadata = excluded.metadata,
            revision = system_state.revision + 1,
            updated_at = excluded.updated_at",
        params![
            state.content,
            tags_json,
            related_json,
            metadata_json,
            format_datetime(&updated_at),
        ],
    )?;
    let revision = conn.query_row(
        "SELECT revision FROM system_state WHERE id = 1",
        [],
        |row| row.get(0),
    )?;
    Ok(revision)
}

impl IndexStore {
    /// Reads the current-state row, if any.
    pub fn current_state(&self) -> Result<Option<(CurrentState, i64)>> {
        let conn = self.lock_conn()?;
        get_state(&conn)
    }
}
