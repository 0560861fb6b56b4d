//! Markdown projection for the shirokuma knowledge base.
//!
//! Every item in the index has a mirror file on disk: a front-matter block
//! followed by the item's `content` verbatim. The tree is the durable side
//! of the dual write -- the whole index can be rebuilt from it. This crate
//! owns the file format, the directory layout and the staged atomic writes;
//! it never touches the database.

pub mod document;
pub mod files;
pub mod front_matter;
pub mod layout;

pub use document::ItemDoc;
pub use files::{Staging, atomic_write, walk_markdown_files};
pub use front_matter::{MarkdownError, split_document};

/// Convenience alias used throughout the markdown crate.
pub type Result<T> = std::result::Result<T, MarkdownError>;
