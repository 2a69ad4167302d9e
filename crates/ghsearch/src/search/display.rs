use crate::github::UserSummary;

use super::favorites::Favorites;

/// What the search screen should show, in rendering priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayState {
    /// No search has been issued yet.
    NotYetSearched,
    /// A fetch is in flight.
    Loading,
    /// The latest fetch failed; the message is on the snapshot.
    Failed,
    /// The latest fetch succeeded but nothing is displayed.
    EmptyResult,
    /// There are rows to show.
    Results,
}

impl DisplayState {
    /// Evaluate the display state. Earlier conditions win.
    pub fn evaluate(
        has_searched: bool,
        is_loading: bool,
        has_error: bool,
        displayed_is_empty: bool,
    ) -> Self {
        if !has_searched {
            Self::NotYetSearched
        } else if is_loading {
            Self::Loading
        } else if has_error {
            Self::Failed
        } else if displayed_is_empty {
            Self::EmptyResult
        } else {
            Self::Results
        }
    }
}

/// The list the display layer reads.
///
/// Keeps `all_users` order; favorites only filter.
pub fn project(
    all_users: &[UserSummary],
    favorites: &Favorites,
    favorites_only: bool,
) -> Vec<UserSummary> {
    if !favorites_only {
        return all_users.to_vec();
    }
    all_users
        .iter()
        .filter(|u| favorites.contains(u))
        .cloned()
        .collect()
}
