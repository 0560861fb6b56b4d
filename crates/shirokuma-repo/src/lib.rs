//! Repository layer for the shirokuma knowledge base.
//!
//! Combines the SQLite index ([`shirokuma_storage`]) and the Markdown tree
//! ([`shirokuma_markdown`]) behind one API with dual-write atomicity:
//! every mutation is one SQL transaction plus a staged set of file writes
//! that becomes visible only after the commit. Reads go straight to the
//! index.

pub mod error;
pub mod export;
pub mod rebuild;
pub mod registry;
pub mod repository;
pub mod search;
pub mod state;

pub use error::{ErrorKind, RepoError, Result};
pub use export::{ExportReport, ImportOptions, ImportReport};
pub use rebuild::RebuildReport;
pub use registry::TypeInfo;
pub use repository::{ChangeTypeResult, CreateItem, Repository, UpdateItem};
pub use search::{SearchHit, TagSearchResults};
pub use state::{StateUpdate, StateView};
