//! Core types and traits for the shirokuma knowledge base.
//!
//! This crate defines the domain model shared by the storage index, the
//! Markdown projector and the repository layer: the [`item::Item`] entity,
//! id and reference types, the priority/base-type enums, the fixed status
//! table, validation rules and list filters.

pub mod enums;
pub mod filter;
pub mod id;
pub mod item;
pub mod refs;
pub mod state;
pub mod status;
pub mod validation;

pub use enums::{BaseType, Priority};
pub use id::ItemId;
pub use item::{Item, ItemBuilder, ItemDetail, ListItem};
pub use refs::ItemRef;
