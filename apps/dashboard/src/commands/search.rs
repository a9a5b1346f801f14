//! # Navigation Search Command

use tally_core::search::SearchResult;
use tally_core::validation::validate_search_query;

use crate::error::ScreenError;
use crate::state::Dashboard;

/// Matches screen titles. A blank query yields no results.
pub fn search_navigation(app: &Dashboard, query: &str) -> Result<Vec<SearchResult>, ScreenError> {
    let query = validate_search_query(query)?;
    Ok(app.search_index().search(&query))
}
