//! Terminal output helpers for the shirokuma CLI.

pub mod styles;
pub mod table;
pub mod terminal;

pub use table::Table;
