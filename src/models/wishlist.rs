use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifier of a movie in the external catalog (TMDB movie id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub u64);

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The user's saved movies, in insertion order
///
/// Never contains the same id twice. Membership is a linear scan; a personal
/// wishlist stays in the tens of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<MovieId>", into = "Vec<MovieId>")]
pub struct Wishlist {
    entries: Vec<MovieId>,
}

impl Wishlist {
    /// Creates an empty wishlist
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a wishlist from persisted entries, keeping the first occurrence of any repeat
    pub fn from_entries(entries: impl IntoIterator<Item = MovieId>) -> Self {
        let mut wishlist = Self::new();
        for id in entries {
            wishlist.add(id);
        }
        wishlist
    }

    /// Appends `id` unless already present. Returns whether the wishlist changed.
    pub fn add(&mut self, id: MovieId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.entries.push(id);
        true
    }

    /// Removes `id` if present. Returns whether the wishlist changed.
    pub fn remove(&mut self, id: MovieId) -> bool {
        match self.entries.iter().position(|entry| *entry == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: MovieId) -> bool {
        self.entries.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[MovieId] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = MovieId> + '_ {
        self.entries.iter().copied()
    }
}

impl From<Vec<MovieId>> for Wishlist {
    fn from(entries: Vec<MovieId>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<Wishlist> for Vec<MovieId> {
    fn from(wishlist: Wishlist) -> Self {
        wishlist.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(wishlist: &Wishlist) -> Vec<u64> {
        wishlist.iter().map(|id| id.0).collect()
    }

    #[test]
    fn test_add_appends_in_insertion_order() {
        let mut wishlist = Wishlist::new();
        assert!(wishlist.add(MovieId(157336)));
        assert!(wishlist.add(MovieId(27205)));
        assert_eq!(ids(&wishlist), vec![157336, 27205]);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut wishlist = Wishlist::new();
        assert!(wishlist.add(MovieId(550)));
        assert!(!wishlist.add(MovieId(550)));
        assert_eq!(wishlist.len(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut wishlist = Wishlist::from_entries([MovieId(550)]);
        assert!(!wishlist.remove(MovieId(999)));
        assert_eq!(ids(&wishlist), vec![550]);
    }

    #[test]
    fn test_remove_keeps_remaining_order() {
        let mut wishlist = Wishlist::from_entries([MovieId(550), MovieId(680), MovieId(13)]);
        assert!(wishlist.remove(MovieId(680)));
        assert_eq!(ids(&wishlist), vec![550, 13]);
    }

    #[test]
    fn test_from_entries_collapses_duplicates() {
        let wishlist = Wishlist::from_entries([MovieId(1), MovieId(2), MovieId(1), MovieId(3)]);
        assert_eq!(ids(&wishlist), vec![1, 2, 3]);
    }

    #[test]
    fn test_mixed_operations_never_duplicate() {
        let mut wishlist = Wishlist::new();
        let ops: [(bool, u64); 10] = [
            (true, 1),
            (true, 2),
            (true, 1),
            (false, 2),
            (true, 2),
            (true, 2),
            (false, 9),
            (true, 3),
            (false, 1),
            (true, 1),
        ];
        for (add, id) in ops {
            if add {
                wishlist.add(MovieId(id));
            } else {
                wishlist.remove(MovieId(id));
            }
            let mut seen = ids(&wishlist);
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), wishlist.len());
        }
        assert_eq!(ids(&wishlist), vec![2, 3, 1]);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let wishlist = Wishlist::from_entries([MovieId(27205), MovieId(157336)]);
        assert_eq!(serde_json::to_string(&wishlist).unwrap(), "[27205,157336]");
    }

    #[test]
    fn test_deserialize_collapses_duplicates() {
        let wishlist: Wishlist = serde_json::from_str("[550,550,680]").unwrap();
        assert_eq!(wishlist.len(), 2);
        assert_eq!(ids(&wishlist), vec![550, 680]);
    }
}
