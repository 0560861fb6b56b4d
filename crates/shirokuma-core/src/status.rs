//! The closed status table.
//!
//! Statuses are seeded once at first init and are not mutable through any
//! tool or command. `is_closable` marks terminal lifecycle states, which
//! default listing filters out.

use serde::{Deserialize, Serialize};

/// A status row from the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: i64,
    pub name: String,
    pub is_closable: bool,
    pub sort_order: i64,
}

/// Statuses seeded on first run, in sort order: `(name, is_closable)`.
pub const DEFAULT_STATUSES: &[(&str, bool)] = &[
    ("Open", false),
    ("Specification", false),
    ("Waiting", false),
    ("Ready", false),
    ("In Progress", false),
    ("Review", false),
    ("Testing", false),
    ("Pending", false),
    ("Completed", true),
    ("Closed", true),
    ("Canceled", true),
    ("Rejected", true),
];

/// The status assigned on create when none is given.
pub const DEFAULT_STATUS_NAME: &str = "Open";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closable_statuses_are_the_last_four() {
        let closable: Vec<&str> = DEFAULT_STATUSES
            .iter()
            .filter(|(_, c)| *c)
            .map(|(n, _)| *n)
            .collect();
        assert_eq!(closable, vec!["Completed", "Closed", "Canceled", "Rejected"]);
    }

    #[test]
    fn default_status_is_seeded() {
        assert!(DEFAULT_STATUSES.iter().any(|(n, _)| *n == DEFAULT_STATUS_NAME));
    }
}
