//! SQLite index backend for the shirokuma knowledge base.
//!
//! The index is the query side of the dual-write pair: every item row here
//! has a Markdown counterpart, and the whole database can be reconstructed
//! from the Markdown tree. The [`sqlite::IndexStore`] wraps a single
//! connection; mutating operations run through
//! [`sqlite::IndexStore::run_in_transaction`] so the repository layer can
//! combine SQL writes with staged file writes atomically.

pub mod error;
pub mod sqlite;

pub use error::{Result, StorageError};
pub use sqlite::IndexStore;
pub use sqlite::tags::Tag;
