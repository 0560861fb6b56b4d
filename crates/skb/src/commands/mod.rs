//! Command handlers for the `skb` CLI.

pub mod completion;
pub mod config_cmd;
pub mod create;
pub mod delete;
pub mod export;
pub mod get;
pub mod import;
pub mod list;
pub mod move_type;
pub mod rebuild;
pub mod search;
pub mod serve;
pub mod state_cmd;
pub mod stats;
pub mod tags_cmd;
pub mod types_cmd;
pub mod update;

use shirokuma_core::id::ItemId;

/// Parses a CLI id argument into an [`ItemId`].
pub(crate) fn parse_id(raw: &str) -> ItemId {
    ItemId::parse(raw)
}
