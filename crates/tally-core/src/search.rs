//! # Navigation Search
//!
//! Case-insensitive substring search over the dashboard's navigation labels.
//! Debouncing keystrokes is the shell's concern; this index answers one
//! query at a time.

use serde::Serialize;
use ts_rs::TS;

use crate::authz::Screen;

/// Subtitle attached to every navigation hit.
pub const NAVIGATION_SUBTITLE: &str = "Navigation";

/// One hit in the search dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub path: String,
}

/// A static, ordered index of navigation entries.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    entries: Vec<Screen>,
}

impl Default for SearchIndex {
    fn default() -> Self {
        Self::navigation()
    }
}

impl SearchIndex {
    /// Index over every screen, in navigation order.
    pub fn navigation() -> Self {
        SearchIndex {
            entries: Screen::ALL.to_vec(),
        }
    }

    /// Returns matches in index order. A blank query matches nothing.
    ///
    /// ```rust
    /// use tally_core::search::SearchIndex;
    ///
    /// let index = SearchIndex::navigation();
    /// let hits = index.search("PRODUCTS");
    /// assert_eq!(hits.len(), 3);
    /// assert_eq!(hits[0].id, "nav-/products");
    /// assert!(index.search("   ").is_empty());
    /// ```
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.entries
            .iter()
            .filter(|screen| screen.title().to_lowercase().contains(&needle))
            .map(|screen| SearchResult {
                id: format!("nav-{}", screen.path()),
                title: screen.title().to_string(),
                subtitle: NAVIGATION_SUBTITLE.to_string(),
                path: screen.path().to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_match() {
        let index = SearchIndex::navigation();
        let hits = index.search("manage");
        let titles: Vec<_> = hits.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["Manage Branch", "Manage Employees"]);
        assert!(hits.iter().all(|h| h.subtitle == "Navigation"));
    }

    #[test]
    fn test_query_is_trimmed() {
        let index = SearchIndex::navigation();
        let hits = index.search("  trash ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, "/trash");
    }

    #[test]
    fn test_no_match() {
        assert!(SearchIndex::navigation().search("invoices").is_empty());
        assert!(SearchIndex::navigation().search("").is_empty());
    }
}
