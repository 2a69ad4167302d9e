use std::collections::BTreeMap;

use crate::github::UserSummary;

/// Session-scoped set of favorited users.
///
/// Membership is keyed by the user's `id`, not by full structural equality,
/// so a user whose avatar URL changed between two searches still toggles off.
/// The stored record is the one most recently toggled on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Favorites {
    by_id: BTreeMap<u64, UserSummary>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the user if present, insert otherwise.
    ///
    /// Returns `true` when the user is a favorite after the call.
    pub fn toggle(&mut self, user: &UserSummary) -> bool {
        if self.by_id.remove(&user.id).is_some() {
            false
        } else {
            self.by_id.insert(user.id, user.clone());
            true
        }
    }

    pub fn contains(&self, user: &UserSummary) -> bool {
        self.contains_id(user.id)
    }

    pub fn contains_id(&self, id: u64) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Favorited users in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &UserSummary> {
        self.by_id.values()
    }
}
