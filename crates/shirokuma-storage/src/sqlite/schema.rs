//! DDL statements and migrations for the SQLite index.
//!
//! Timestamps are stored as TEXT in ISO 8601 format with millisecond
//! precision. Booleans are INTEGER (0/1). Item ids are TEXT so the sequence
//! ids of normal types and the date/timestamp keys of the reserved types
//! share one column; `(type, id)` is the primary key.

/// Current schema version. Bumped whenever DDL or migrations change.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Core DDL statements executed during `init_schema`.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    // -- Statuses ------------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS statuses (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL UNIQUE,
        is_closable INTEGER NOT NULL DEFAULT 0,
        sort_order  INTEGER NOT NULL DEFAULT 0
    )
    "#,
    // -- Type registry -------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS types (
        name        TEXT PRIMARY KEY,
        base_type   TEXT NOT NULL,
        is_reserved INTEGER NOT NULL DEFAULT 0,
        description TEXT
    )
    "#,
    // -- Sequences (monotonic per-type id allocator) -------------------------
    r#"
    CREATE TABLE IF NOT EXISTS sequences (
        type          TEXT PRIMARY KEY,
        base_type     TEXT NOT NULL,
        current_value INTEGER NOT NULL DEFAULT 0
    )
    "#,
    // -- Items ---------------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS items (
        type        TEXT NOT NULL,
        id          TEXT NOT NULL,
        title       TEXT NOT NULL,
        description TEXT,
        content     TEXT,
        status_id   INTEGER NOT NULL REFERENCES statuses(id),
        priority    TEXT NOT NULL DEFAULT 'MEDIUM',
        category    TEXT,
        version     TEXT,
        start_date  TEXT,
        end_date    TEXT,
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL,
        PRIMARY KEY (type, id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_items_status ON items(status_id)",
    "CREATE INDEX IF NOT EXISTS idx_items_type ON items(type)",
    "CREATE INDEX IF NOT EXISTS idx_items_updated_at ON items(updated_at)",
    // -- Tags ----------------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS tags (
        id   INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS item_tags (
        item_type TEXT NOT NULL,
        item_id   TEXT NOT NULL,
        tag_id    INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        position  INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (item_type, item_id, tag_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_item_tags_tag ON item_tags(tag_id)",
    // -- Relations (directed edges, targets may dangle) ----------------------
    r#"
    CREATE TABLE IF NOT EXISTS item_relations (
        source_type TEXT NOT NULL,
        source_id   TEXT NOT NULL,
        target_type TEXT NOT NULL,
        target_id   TEXT NOT NULL,
        position    INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (source_type, source_id, target_type, target_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_item_relations_target ON item_relations(target_type, target_id)",
    // -- Current-state singleton ---------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS system_state (
        id         INTEGER PRIMARY KEY CHECK (id = 1),
        content    TEXT NOT NULL DEFAULT '',
        tags       TEXT NOT NULL DEFAULT '[]',
        related    TEXT NOT NULL DEFAULT '[]',
        metadata   TEXT NOT NULL DEFAULT '{}',
        revision   INTEGER NOT NULL DEFAULT 0,
        updated_at TEXT
    )
    "#,
    // -- Meta (schema version, migration bookkeeping) ------------------------
    r#"
    CREATE TABLE IF NOT EXISTS meta (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )
    "#,
    // -- Full-text index -----------------------------------------------------
    // Maintained manually in the same transaction as item writes; rebuild is
    // a plain delete-all + re-insert.
    r#"
    CREATE VIRTUAL TABLE IF NOT EXISTS items_fts USING fts5(
        title,
        description,
        content,
        type UNINDEXED,
        id UNINDEXED,
        tokenize='unicode61'
    )
    "#,
];

/// Schema migrations applied after initial DDL.
///
/// Each migration is a `(name, sql)` pair, tracked in the `meta` table under
/// the key `migration:<name>` so it runs at most once.
pub const MIGRATIONS: &[(&str, &str)] = &[];
