use core::fmt::{self, Debug};
use core::hash::{BuildHasher, Hash};

use hashbrown::Equivalent;

use crate::hash::{FixedHashState, HashMap};

// -----------------------------------------------------------------------------
// BiMap

/// A two-way unique map between "left" and "right" values.
///
/// Internally two hash maps are stored, one per direction, and they always
/// describe the same relation: `get_by_left(l) == Some(r)` if and only if
/// `get_by_right(r) == Some(l)`.
///
/// No left value maps to two right values and no right value maps to two
/// left values. [`insert`](BiMap::insert) never fails: a pair that collides
/// with an existing left *or* right value evicts the stale pair(s) from both
/// directions first.
///
/// Iteration order is unspecified.
///
/// # Examples
///
/// ```
/// use cj_utils::BiMap;
///
/// let mut map = BiMap::<&str, u32>::new();
/// map.insert("a", 1);
/// map.insert("b", 2);
///
/// // ("a", 1) and ("b", 2) are both evicted.
/// assert!(map.insert("a", 2));
///
/// assert_eq!(map.len(), 1);
/// assert_eq!(map.get_by_left(&"a"), Some(&2));
/// assert_eq!(map.get_by_right(&1), None);
/// assert_eq!(map.get_by_left(&"b"), None);
/// ```
pub struct BiMap<L, R, S = FixedHashState> {
    forward: HashMap<L, R, S>,
    reverse: HashMap<R, L, S>,
}

impl<L, R> BiMap<L, R, FixedHashState> {
    /// Creates an empty `BiMap`.
    #[inline]
    pub const fn new() -> Self {
        Self {
            forward: HashMap::with_hasher(FixedHashState),
            reverse: HashMap::with_hasher(FixedHashState),
        }
    }

    /// Creates an empty `BiMap` with room for `capacity` pairs.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            forward: HashMap::with_capacity_and_hasher(capacity, FixedHashState),
            reverse: HashMap::with_capacity_and_hasher(capacity, FixedHashState),
        }
    }
}

impl<L, R, S> BiMap<L, R, S>
where
    L: Hash + Eq + Clone,
    R: Hash + Eq + Clone,
    S: BuildHasher,
{
    /// Inserts the pair `(left, right)`.
    ///
    /// Any existing pair sharing `left` or `right` is removed from both
    /// directions before the new pair is stored.
    ///
    /// Returns `true` if at least one pair was evicted, including the case
    /// where the exact same pair was already present.
    pub fn insert(&mut self, left: L, right: R) -> bool {
        let mut evicted = false;

        if let Some(stale_right) = self.forward.remove(&left) {
            self.reverse.remove(&stale_right);
            evicted = true;
        }
        if let Some(stale_left) = self.reverse.remove(&right) {
            self.forward.remove(&stale_left);
            evicted = true;
        }

        self.forward.insert(left.clone(), right.clone());
        self.reverse.insert(right, left);
        evicted
    }

    /// Returns the right value paired with `left`.
    #[inline]
    pub fn get_by_left<Q>(&self, left: &Q) -> Option<&R>
    where
        Q: ?Sized + Hash + Equivalent<L>,
    {
        self.forward.get(left)
    }

    /// Returns the left value paired with `right`.
    #[inline]
    pub fn get_by_right<Q>(&self, right: &Q) -> Option<&L>
    where
        Q: ?Sized + Hash + Equivalent<R>,
    {
        self.reverse.get(right)
    }

    /// Removes the pair owning `left`, returning its right value.
    pub fn remove_by_left<Q>(&mut self, left: &Q) -> Option<R>
    where
        Q: ?Sized + Hash + Equivalent<L>,
    {
        let right = self.forward.remove(left)?;
        self.reverse.remove(&right);
        Some(right)
    }

    /// Removes the pair owning `right`, returning its left value.
    pub fn remove_by_right<Q>(&mut self, right: &Q) -> Option<L>
    where
        Q: ?Sized + Hash + Equivalent<R>,
    {
        let left = self.reverse.remove(right)?;
        self.forward.remove(&left);
        Some(left)
    }

    /// Returns `true` if a pair owns `left`.
    #[inline]
    pub fn contains_left<Q>(&self, left: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<L>,
    {
        self.forward.contains_key(left)
    }

    /// Returns `true` if a pair owns `right`.
    #[inline]
    pub fn contains_right<Q>(&self, right: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<R>,
    {
        self.reverse.contains_key(right)
    }
}

impl<L, R, S> BiMap<L, R, S> {
    /// An iterator visiting all pairs in arbitrary order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&L, &R)> {
        self.forward.iter()
    }

    /// An iterator visiting all left values in arbitrary order.
    #[inline]
    pub fn lefts(&self) -> impl ExactSizeIterator<Item = &L> {
        self.forward.keys()
    }

    /// An iterator visiting all right values in arbitrary order.
    #[inline]
    pub fn rights(&self) -> impl ExactSizeIterator<Item = &R> {
        self.reverse.keys()
    }

    /// Returns the number of pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Returns `true` if the map holds no pair.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Removes every pair, keeping the allocated memory.
    #[inline]
    pub fn clear(&mut self) {
        self.forward.clear();
        self.reverse.clear();
    }
}

// -----------------------------------------------------------------------------
// Traits

impl<L, R, S: Default> Default for BiMap<L, R, S> {
    #[inline]
    fn default() -> Self {
        Self {
            forward: HashMap::default(),
            reverse: HashMap::default(),
        }
    }
}

impl<L: Clone, R: Clone, S: Clone> Clone for BiMap<L, R, S> {
    fn clone(&self) -> Self {
        Self {
            forward: self.forward.clone(),
            reverse: self.reverse.clone(),
        }
    }
}

impl<L: Debug, R: Debug, S> Debug for BiMap<L, R, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.forward.iter()).finish()
    }
}

impl<L, R, S> Extend<(L, R)> for BiMap<L, R, S>
where
    L: Hash + Eq + Clone,
    R: Hash + Eq + Clone,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (L, R)>>(&mut self, iter: I) {
        for (left, right) in iter {
            self.insert(left, right);
        }
    }
}

impl<L, R, S> FromIterator<(L, R)> for BiMap<L, R, S>
where
    L: Hash + Eq + Clone,
    R: Hash + Eq + Clone,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (L, R)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::BiMap;
    use alloc::string::{String, ToString};

    #[test]
    fn insert_and_lookup() {
        let mut map = BiMap::<String, u32>::new();
        assert!(!map.insert("x".to_string(), 1));
        assert!(!map.insert("y".to_string(), 2));

        assert_eq!(map.get_by_left("x"), Some(&1));
        assert_eq!(map.get_by_right(&2).map(String::as_str), Some("y"));
        assert!(map.contains_left("y"));
        assert!(!map.contains_right(&3));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn left_collision_evicts_reverse() {
        let mut map = BiMap::<&str, u32>::new();
        map.insert("k", 1);

        assert!(map.insert("k", 2));
        assert_eq!(map.get_by_left(&"k"), Some(&2));
        assert_eq!(map.get_by_right(&1), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn right_collision_evicts_forward() {
        let mut map = BiMap::<&str, u32>::new();
        map.insert("old", 7);

        assert!(map.insert("new", 7));
        assert_eq!(map.get_by_left(&"old"), None);
        assert_eq!(map.get_by_right(&7), Some(&"new"));
    }

    #[test]
    fn double_collision_evicts_both_pairs() {
        let mut map = BiMap::<&str, u32>::new();
        map.insert("a", 1);
        map.insert("b", 2);

        assert!(map.insert("a", 2));
        assert_eq!(map.len(), 1);
        assert!(!map.contains_left(&"b"));
        assert!(!map.contains_right(&1));
        assert_eq!(map.rights().count(), map.lefts().count());
    }

    #[test]
    fn reinsert_same_pair_reports_conflict() {
        let mut map = BiMap::<&str, u32>::new();
        map.insert("a", 1);
        assert!(map.insert("a", 1));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn remove_from_either_side() {
        let mut map: BiMap<&str, u32> = [("a", 1), ("b", 2)].into_iter().collect();

        assert_eq!(map.remove_by_left(&"a"), Some(1));
        assert!(!map.contains_right(&1));
        assert_eq!(map.remove_by_left(&"a"), None);

        assert_eq!(map.remove_by_right(&2), Some("b"));
        assert!(!map.contains_left(&"b"));
        assert!(map.is_empty());
    }

    #[test]
    fn clear_empties_both_directions() {
        let mut map: BiMap<u8, u8> = (0..10).map(|i| (i, i + 100)).collect();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.rights().len(), 0);
    }
}
