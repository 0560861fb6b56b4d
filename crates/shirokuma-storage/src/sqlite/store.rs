//! [`IndexStore`] -- SQLite-backed index implementation.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::{debug, info};

use shirokuma_core::enums::{BaseType, DEFAULT_TYPES, RESERVED_TYPES};
use shirokuma_core::status::DEFAULT_STATUSES;

use crate::error::{Result, StorageError};
use crate::sqlite::schema;

/// SQLite-backed index.
///
/// Wraps a [`rusqlite::Connection`] in a `Mutex`. All public methods acquire
/// the lock, execute SQL, and release it; mutating flows go through
/// [`IndexStore::run_in_transaction`] (see `transaction.rs`).
pub struct IndexStore {
    /// The mutex-protected SQLite connection.
    pub(crate) conn: Mutex<Connection>,
}

impl IndexStore {
    /// Opens (or creates) the index database at the given path.
    ///
    /// Enables WAL mode and foreign keys, then initialises the schema and
    /// seeds statuses, default types and sequences.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(?path, "opening index database");

        let conn = Connection::open(path).map_err(|e| {
            StorageError::Connection(format!("failed to open {}: {e}", path.display()))
        })?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.configure_connection()?;
        store.init_schema()?;

        Ok(store)
    }

    /// Opens an in-memory index (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        debug!("opening in-memory index database");
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("failed to open in-memory db: {e}")))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.configure_connection()?;
        store.init_schema()?;

        Ok(store)
    }

    /// Sets connection pragmas (WAL mode, foreign keys, busy timeout).
    fn configure_connection(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(|e| StorageError::Connection(format!("failed to set pragmas: {e}")))?;
        Ok(())
    }

    /// Creates all tables and indexes if they do not exist, seeds reference
    /// data, then runs migrations.
    fn init_schema(&self) -> Result<()> {
        let conn = self.lock_conn()?;

        // Check if schema is already at current version.
        let version: std::result::Result<i32, _> = conn.query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| {
                let v: String = row.get(0)?;
                Ok(v.parse::<i32>().unwrap_or(0))
            },
        );
        if let Ok(v) = version {
            if v >= schema::CURRENT_SCHEMA_VERSION {
                debug!(version = v, "schema already at current version, skipping init");
                return Ok(());
            }
        }

        for stmt in schema::SCHEMA_STATEMENTS {
            conn.execute_batch(stmt)
                .map_err(|e| StorageError::Migration {
                    name: "init_schema".into(),
                    reason: format!("{e}\nStatement: {}", truncate(stmt, 120)),
                })?;
        }

        Self::seed_statuses(&conn)?;
        Self::seed_types(&conn)?;
        Self::run_migrations_on_conn(&conn)?;

        conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
            rusqlite::params![schema::CURRENT_SCHEMA_VERSION.to_string()],
        )
        .map_err(|e| StorageError::Migration {
            name: "schema_version".into(),
            reason: e.to_string(),
        })?;

        info!(
            "schema initialized (version {})",
            schema::CURRENT_SCHEMA_VERSION
        );
        Ok(())
    }

    /// Inserts the fixed status table. The status set is closed: no tool or
    /// command mutates it after this.
    fn seed_statuses(conn: &Connection) -> Result<()> {
        for (order, (name, is_closable)) in DEFAULT_STATUSES.iter().enumerate() {
            conn.execute(
                "INSERT OR IGNORE INTO statuses (name, is_closable, sort_order)
                 VALUES (?1, ?2, ?3)",
                rusqlite::params![name, *is_closable as i32, order as i64 + 1],
            )?;
        }
        Ok(())
    }

    /// Registers the default and reserved types with their sequences.
    fn seed_types(conn: &Connection) -> Result<()> {
        for &(name, base_type, description) in DEFAULT_TYPES {
            conn.execute(
                "INSERT OR IGNORE INTO types (name, base_type, is_reserved, description)
                 VALUES (?1, ?2, 0, ?3)",
                rusqlite::params![name, base_type.as_str(), description],
            )?;
            conn.execute(
                "INSERT OR IGNORE INTO sequences (type, base_type, current_value)
                 VALUES (?1, ?2, 0)",
                rusqlite::params![name, base_type.as_str()],
            )?;
        }
        // Reserved types carry the sentinel sequence value 0 forever; their
        // ids derive from timestamps/dates instead.
        for &name in RESERVED_TYPES {
            conn.execute(
                "INSERT OR IGNORE INTO types (name, base_type, is_reserved, description)
                 VALUES (?1, ?2, 1, NULL)",
                rusqlite::params![name, BaseType::Tasks.as_str()],
            )?;
            conn.execute(
                "INSERT OR IGNORE INTO sequences (type, base_type, current_value)
                 VALUES (?1, ?2, 0)",
                rusqlite::params![name, BaseType::Tasks.as_str()],
            )?;
        }
        Ok(())
    }

    /// Applies pending migrations tracked via the `meta` table.
    fn run_migrations_on_conn(conn: &Connection) -> Result<()> {
        for &(name, sql) in schema::MIGRATIONS {
            let key = format!("migration:{name}");
            let already_applied: bool = conn
                .query_row(
                    "SELECT COUNT(*) FROM meta WHERE key = ?1",
                    rusqlite::params![key],
                    |row| row.get::<_, i32>(0),
                )
                .unwrap_or(0)
                > 0;

            if already_applied {
                debug!(name, "migration already applied, skipping");
                continue;
            }

            debug!(name, "applying migration");
            conn.execute_batch(sql)
                .map_err(|e| StorageError::Migration {
                    name: name.to_string(),
                    reason: e.to_string(),
                })?;

            conn.execute(
                "INSERT INTO meta (key, value) VALUES (?1, ?2)",
                rusqlite::params![key, "applied"],
            )
            .map_err(|e| StorageError::Migration {
                name: name.to_string(),
                reason: format!("failed to mark migration: {e}"),
            })?;
        }
        Ok(())
    }

    /// Acquires the connection lock. Helper used by all operation modules.
    pub(crate) fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Connection(format!("mutex poisoned: {e}")))
    }
}

impl std::fmt::Debug for IndexStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexStore").finish_non_exhaustive()
    }
}

/// Truncates a string for error messages.
fn truncate(s: &str, max: usize) -> String {
    if s.len() > max {
        format!("{}...", &s[..max])
    } else {
        s.to_string()
    }
}
