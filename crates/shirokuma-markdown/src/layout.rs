//! Directory layout of the projection tree.
//!
//! ```text
//! <root>/<base_type>/<type>/<type>-<id>.md     normal items
//! <root>/sessions/<YYYY-MM-DD>/<id>.md         sessions
//! <root>/dailies/<YYYY-MM-DD>.md               dailies
//! <root>/.system/current_state/<n>.md          state history (+ latest.md)
//! <root>/.system/staging/                      in-flight staged writes
//! ```

use std::path::PathBuf;

use shirokuma_core::enums::BaseType;
use shirokuma_core::id::{self, ItemId};

/// Directory holding system files (state history, staging).
pub const SYSTEM_DIR: &str = ".system";
/// State history directory under [`SYSTEM_DIR`].
pub const CURRENT_STATE_DIR: &str = "current_state";
/// Staging directory under [`SYSTEM_DIR`].
pub const STAGING_DIR: &str = "staging";
/// Name of the latest-state copy.
pub const LATEST_STATE_FILE: &str = "latest.md";

/// Relative path of an item's projection file.
pub fn item_rel_path(type_name: &str, base_type: BaseType, item_id: &ItemId) -> PathBuf {
    match type_name {
        "sessions" => {
            let date = id::date_component(item_id).unwrap_or_else(|| "unknown".to_owned());
            PathBuf::from("sessions").join(date).join(format!("{item_id}.md"))
        }
        "dailies" => PathBuf::from("dailies").join(format!("{item_id}.md")),
        _ => PathBuf::from(base_type.as_str())
            .join(type_name)
            .join(format!("{type_name}-{item_id}.md")),
    }
}

/// Relative path of a numbered state history file.
pub fn state_rel_path(revision: i64) -> PathBuf {
    PathBuf::from(SYSTEM_DIR)
        .join(CURRENT_STATE_DIR)
        .join(format!("{revision}.md"))
}

/// Relative path of the latest-state copy.
pub fn latest_state_rel_path() -> PathBuf {
    PathBuf::from(SYSTEM_DIR)
        .join(CURRENT_STATE_DIR)
        .join(LATEST_STATE_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_item_path() {
        let p = item_rel_path("issues", BaseType::Tasks, &ItemId::Seq(7));
        assert_eq!(p, PathBuf::from("tasks/issues/issues-7.md"));
        let p = item_rel_path("docs", BaseType::Documents, &ItemId::Seq(2));
        assert_eq!(p, PathBuf::from("documents/docs/docs-2.md"));
    }

    #[test]
    fn session_path_groups_by_date() {
        let id = ItemId::Key("2025-01-15-10.30.00.123".into());
        let p = item_rel_path("sessions", BaseType::Tasks, &id);
        assert_eq!(
            p,
            PathBuf::from("sessions/2025-01-15/2025-01-15-10.30.00.123.md")
        );
    }

    #[test]
    fn daily_path_is_flat() {
        let id = ItemId::Key("2025-01-15".into());
        let p = item_rel_path("dailies", BaseType::Tasks, &id);
        assert_eq!(p, PathBuf::from("dailies/2025-01-15.md"));
    }

    #[test]
    fn state_paths() {
        assert_eq!(
            state_rel_path(3),
            PathBuf::from(".system/current_state/3.md")
        );
        assert_eq!(
            latest_state_rel_path(),
            PathBuf::from(".system/current_state/latest.md")
        );
    }
}
