//! Filter and paging options for list and search operations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Filter for `get_items`. All fields are optional restrictions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListFilter {
    /// Restrict to these status names.
    #[serde(default)]
    pub statuses: Vec<String>,

    /// Include items whose status is closable. Off by default.
    #[serde(default)]
    pub include_closed_statuses: bool,

    /// Matches against `start_date` (or the id date for sessions/dailies).
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Matches against `end_date` (or the id date for sessions/dailies).
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    /// Require every listed tag (AND).
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub limit: Option<u32>,

    #[serde(default)]
    pub offset: u32,
}

/// Default page size for full-text search.
pub const SEARCH_DEFAULT_LIMIT: u32 = 20;
/// Maximum page size for full-text search.
pub const SEARCH_MAX_LIMIT: u32 = 100;
/// Maximum number of suggestions returned by `search_suggest`.
pub const SUGGEST_MAX_LIMIT: u32 = 20;

/// Paging for full-text search, clamped to the documented bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchPage {
    pub limit: u32,
    pub offset: u32,
}

impl Default for SearchPage {
    fn default() -> Self {
        Self {
            limit: SEARCH_DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl SearchPage {
    /// Builds a page from optional wire parameters, clamping `limit` into
    /// `1..=SEARCH_MAX_LIMIT`.
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        let limit = limit
            .unwrap_or(SEARCH_DEFAULT_LIMIT)
            .clamp(1, SEARCH_MAX_LIMIT);
        Self {
            limit,
            offset: offset.unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_page_clamps_limit() {
        assert_eq!(SearchPage::new(None, None).limit, 20);
        assert_eq!(SearchPage::new(Some(500), None).limit, 100);
        assert_eq!(SearchPage::new(Some(0), None).limit, 1);
        assert_eq!(SearchPage::new(Some(50), Some(10)).offset, 10);
    }

    #[test]
    fn list_filter_defaults() {
        let f = ListFilter::default();
        assert!(!f.include_closed_statuses);
        assert!(f.statuses.is_empty());
        assert_eq!(f.offset, 0);
    }
}
