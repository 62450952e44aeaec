//! An ordered multimap with logarithmic rank queries.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::iter::FusedIterator;

use crate::comparator::{Comparator, NaturalOrder};
use crate::error::Result;
use crate::raw::{Cursor, RawIter, RawTree};

/// An ordered multimap based on a weight-carrying B+ tree.
///
/// A key may map to any number of values. Entries are sorted by key, and the
/// values of one key keep their insertion order, so [`get_all`] replays them
/// the way they went in. The cached subtree weights answer the counting
/// questions in O(log n): [`count_key`] measures a key's multiplicity
/// without touching its entries, [`rank_of_key`] locates a key's first entry
/// among all entries, and [`get_index`] selects an entry by global rank.
///
/// It is a logic error for a key to be modified in such a way that its
/// ordering relative to any other key, as seen by the multimap's comparator,
/// changes while it is in the multimap.
///
/// [`get_all`]: RankedMultimap::get_all
/// [`count_key`]: RankedMultimap::count_key
/// [`rank_of_key`]: RankedMultimap::rank_of_key
/// [`get_index`]: RankedMultimap::get_index
///
/// # Examples
///
/// ```
/// use ranked_tree::RankedMultimap;
///
/// let mut index = RankedMultimap::new();
/// index.insert("rust", 3);
/// index.insert("tree", 7);
/// index.insert("rust", 11);
///
/// assert_eq!(index.count_key(&"rust"), 2);
///
/// // values of one key come back in insertion order
/// let pages: Vec<_> = index.get_all(&"rust").copied().collect();
/// assert_eq!(pages, [3, 11]);
/// ```
pub struct RankedMultimap<K, V, C = NaturalOrder> {
    raw: RawTree<K, V, C>,
}

/// An iterator over the entries of a `RankedMultimap`, sorted by key.
///
/// This `struct` is created by the [`iter`] method on [`RankedMultimap`].
/// See its documentation for more.
///
/// [`iter`]: RankedMultimap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V, C = NaturalOrder> {
    inner: RawIter<'a, K, V, C>,
}

/// An owning iterator over the entries of a `RankedMultimap`, sorted by key.
///
/// This `struct` is created by the [`into_iter`] method on
/// [`RankedMultimap`] (provided by the [`IntoIterator`] trait). See its
/// documentation for more.
///
/// [`into_iter`]: IntoIterator::into_iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

/// An iterator over the values of one key in a `RankedMultimap`, in
/// insertion order.
///
/// This `struct` is created by the [`get_all`] method on [`RankedMultimap`].
/// See its documentation for more.
///
/// [`get_all`]: RankedMultimap::get_all
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct GetAll<'a, K, V, C = NaturalOrder> {
    inner: RawIter<'a, K, V, C>,
}

impl<K, V> RankedMultimap<K, V> {
    /// Makes a new, empty `RankedMultimap` ordered by the key type's [`Ord`]
    /// implementation.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMultimap;
    ///
    /// let mut map = RankedMultimap::new();
    /// map.insert(1, "a");
    /// map.insert(1, "b");
    /// assert_eq!(map.len(), 2);
    /// ```
    #[must_use]
    pub fn new() -> RankedMultimap<K, V> {
        RankedMultimap { raw: RawTree::new(NaturalOrder) }
    }

    /// Makes a new, empty `RankedMultimap` with the given branching order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrderOutOfRange`](crate::Error::OrderOutOfRange) when
    /// `order` falls outside `MIN_ORDER..=MAX_ORDER`.
    pub fn with_order(order: usize) -> Result<RankedMultimap<K, V>> {
        Ok(RankedMultimap { raw: RawTree::with_order(order, NaturalOrder)? })
    }
}

impl<K, V, C> RankedMultimap<K, V, C> {
    /// Makes a new, empty `RankedMultimap` ordered by `cmp`.
    #[must_use]
    pub fn with_comparator(cmp: C) -> RankedMultimap<K, V, C> {
        RankedMultimap { raw: RawTree::new(cmp) }
    }

    /// Makes a new, empty `RankedMultimap` with the given branching order,
    /// ordered by `cmp`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrderOutOfRange`](crate::Error::OrderOutOfRange) when
    /// `order` falls outside `MIN_ORDER..=MAX_ORDER`.
    pub fn with_order_and_comparator(order: usize, cmp: C) -> Result<RankedMultimap<K, V, C>> {
        Ok(RankedMultimap { raw: RawTree::with_order(order, cmp)? })
    }

    /// Returns the multimap's branching order.
    #[must_use]
    pub fn order(&self) -> usize {
        self.raw.order()
    }

    /// Changes the multimap's branching order. Only an empty multimap can
    /// change shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrderOutOfRange`](crate::Error::OrderOutOfRange) when
    /// `order` falls outside `MIN_ORDER..=MAX_ORDER`, and
    /// [`Error::OrderLocked`](crate::Error::OrderLocked) when the multimap is
    /// not empty.
    pub fn set_order(&mut self, order: usize) -> Result<()> {
        self.raw.set_order(order)
    }

    /// Returns the number of entries in the multimap, counting every value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.weight()
    }

    /// Returns `true` if the multimap contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the multimap, removing all entries. The branching order is
    /// kept.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Gets an iterator over all entries, sorted by key, values of one key
    /// in insertion order.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMultimap;
    ///
    /// let mut map = RankedMultimap::new();
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(2, "c");
    ///
    /// let entries: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
    /// assert_eq!(entries, [(1, "a"), (2, "b"), (2, "c")]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter { inner: RawIter::all(&self.raw) }
    }

    /// Returns the entry at rank `index` among all entries in key order, or
    /// `None` if `index` is out of bounds.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMultimap;
    ///
    /// let mut map = RankedMultimap::new();
    /// map.insert("b", 2);
    /// map.insert("a", 1);
    ///
    /// assert_eq!(map.get_index(0), Some((&"a", &1)));
    /// assert_eq!(map.get_index(2), None);
    /// ```
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.raw.entry_at(index)
    }

    /// Returns a cursor parked before the first entry.
    ///
    /// Cursors borrow nothing; any structural mutation of the multimap makes
    /// stepping fail with
    /// [`Error::StaleCursor`](crate::Error::StaleCursor).
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.raw.cursor_front()
    }

    /// Returns a cursor parked after the last entry.
    #[must_use]
    pub fn cursor_back(&self) -> Cursor {
        self.raw.cursor_back()
    }

    /// Yields the entry after `cursor` and advances it, or `Ok(None)` at the
    /// end.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleCursor`](crate::Error::StaleCursor) if the
    /// multimap has been structurally mutated since the cursor was created.
    pub fn cursor_next(&self, cursor: &mut Cursor) -> Result<Option<(&K, &V)>> {
        self.raw.cursor_next(cursor)
    }

    /// Yields the entry before `cursor` and moves it back, or `Ok(None)` at
    /// the front.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleCursor`](crate::Error::StaleCursor) if the
    /// multimap has been structurally mutated since the cursor was created.
    pub fn cursor_prev(&self, cursor: &mut Cursor) -> Result<Option<(&K, &V)>> {
        self.raw.cursor_prev(cursor)
    }
}

impl<K: Clone, V, C: Comparator<K>> RankedMultimap<K, V, C> {
    /// Inserts a key-value pair. Existing values under the same key are
    /// kept; the new pair lands after them, preserving insertion order.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMultimap;
    ///
    /// let mut map = RankedMultimap::new();
    /// map.insert(1, "first");
    /// map.insert(1, "second");
    ///
    /// let values: Vec<_> = map.get_all(&1).copied().collect();
    /// assert_eq!(values, ["first", "second"]);
    /// ```
    pub fn insert(&mut self, key: K, value: V) {
        self.raw.insert_rightmost(key, value);
    }

    /// Returns `true` if the multimap has at least one entry for `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMultimap;
    ///
    /// let mut map = RankedMultimap::new();
    /// map.insert(1, "a");
    /// assert!(map.contains_key(&1));
    /// assert!(!map.contains_key(&2));
    /// ```
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.raw.find(key).is_some()
    }

    /// Returns how many entries `key` has.
    ///
    /// Computed as the difference of the two rank bounds, so the cost stays
    /// O(log n) however many values the key holds.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMultimap;
    ///
    /// let mut map = RankedMultimap::new();
    /// map.insert(1, "a");
    /// map.insert(1, "b");
    /// assert_eq!(map.count_key(&1), 2);
    /// assert_eq!(map.count_key(&2), 0);
    /// ```
    #[must_use]
    pub fn count_key(&self, key: &K) -> usize {
        self.raw.rank_upper_bound(key) - self.raw.rank_lower_bound(key)
    }

    /// Gets an iterator over the values of `key`, in insertion order. Empty
    /// if the key is absent.
    ///
    /// The window is located by rank bounds, so building the iterator costs
    /// O(log n) regardless of how many values the key holds.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMultimap;
    ///
    /// let mut map = RankedMultimap::new();
    /// map.insert("tag", 3);
    /// map.insert("tag", 1);
    ///
    /// let values: Vec<_> = map.get_all(&"tag").copied().collect();
    /// assert_eq!(values, [3, 1]);
    /// assert_eq!(map.get_all(&"other").count(), 0);
    /// ```
    pub fn get_all(&self, key: &K) -> GetAll<'_, K, V, C> {
        let start = self.raw.rank_lower_bound(key);
        let end = self.raw.rank_upper_bound(key);
        GetAll { inner: RawIter::between(&self.raw, start, end) }
    }

    /// Removes the first entry for `key` whose value equals `value`,
    /// scanning the key's values in insertion order. Returns whether an
    /// entry was removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMultimap;
    ///
    /// let mut map = RankedMultimap::new();
    /// map.insert(1, "a");
    /// map.insert(1, "b");
    ///
    /// assert!(map.remove(&1, &"b"));
    /// assert!(!map.remove(&1, &"b"));
    /// assert_eq!(map.count_key(&1), 1);
    /// ```
    pub fn remove(&mut self, key: &K, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.raw.remove_first_match(key, |candidate| candidate == value).is_some()
    }

    /// Removes every entry for `key`, returning how many went.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMultimap;
    ///
    /// let mut map = RankedMultimap::new();
    /// map.insert(1, "a");
    /// map.insert(1, "b");
    /// map.insert(2, "c");
    ///
    /// assert_eq!(map.remove_all(&1), 2);
    /// assert_eq!(map.remove_all(&1), 0);
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn remove_all(&mut self, key: &K) -> usize {
        self.raw.remove_all(key)
    }

    /// Returns the global rank of the first entry for `key`, or `None` if
    /// the key is absent.
    ///
    /// The rank counts the entries with strictly smaller keys, so the ranks
    /// `rank_of_key(&k)..rank_of_key(&k) + count_key(&k)` all belong to `k`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMultimap;
    ///
    /// let mut map = RankedMultimap::new();
    /// map.insert("a", 1);
    /// map.insert("b", 2);
    /// map.insert("b", 3);
    ///
    /// assert_eq!(map.rank_of_key(&"b"), Some(1));
    /// assert_eq!(map.rank_of_key(&"c"), None);
    /// ```
    #[must_use]
    pub fn rank_of_key(&self, key: &K) -> Option<usize> {
        let rank = self.raw.rank_lower_bound(key);
        (rank < self.raw.rank_upper_bound(key)).then_some(rank)
    }

    /// Recomputes every structural invariant from scratch and returns the
    /// violations found; an empty list means a healthy multimap.
    #[must_use]
    pub fn check_invariants(&self) -> Vec<String> {
        self.raw.check_invariants()
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for RankedMultimap<K, V, C> {
    fn clone(&self) -> Self {
        RankedMultimap { raw: self.raw.clone() }
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for RankedMultimap<K, V, C> {
    fn eq(&self, other: &RankedMultimap<K, V, C>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for RankedMultimap<K, V, C> {}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for RankedMultimap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C: Default> Default for RankedMultimap<K, V, C> {
    /// Creates an empty multimap ordered by the default comparator.
    fn default() -> RankedMultimap<K, V, C> {
        RankedMultimap::with_comparator(C::default())
    }
}

impl<K: Clone, V, C: Comparator<K> + Default> FromIterator<(K, V)> for RankedMultimap<K, V, C> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> RankedMultimap<K, V, C> {
        let mut map = RankedMultimap::with_comparator(C::default());
        map.extend(iter);
        map
    }
}

impl<K: Clone, V, C: Comparator<K>> Extend<(K, V)> for RankedMultimap<K, V, C> {
    #[inline]
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        iter.into_iter().for_each(move |(k, v)| {
            self.insert(k, v);
        });
    }
}

impl<K: Ord + Clone, V, const N: usize> From<[(K, V); N]> for RankedMultimap<K, V> {
    /// Converts a `[(K, V); N]` into a `RankedMultimap<K, V>`, keeping every
    /// pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMultimap;
    ///
    /// let map = RankedMultimap::from([(1, "a"), (1, "b")]);
    /// assert_eq!(map.count_key(&1), 2);
    /// ```
    fn from(arr: [(K, V); N]) -> RankedMultimap<K, V> {
        arr.into_iter().collect()
    }
}

impl<'a, K, V, C> IntoIterator for &'a RankedMultimap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C>;

    fn into_iter(self) -> Iter<'a, K, V, C> {
        self.iter()
    }
}

impl<K, V, C> IntoIterator for RankedMultimap<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Consumes the multimap into an iterator over its entries, sorted by
    /// key, values of one key in insertion order.
    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter { inner: self.raw.drain_to_vec().into_iter() }
    }
}

impl<'a, K, V, C> Iterator for Iter<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.inner.len(), Some(self.inner.len()))
    }
}

impl<'a, K, V, C> DoubleEndedIterator for Iter<'a, K, V, C> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        self.inner.next_back()
    }
}

impl<K, V, C> ExactSizeIterator for Iter<'_, K, V, C> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, C> FusedIterator for Iter<'_, K, V, C> {}

impl<K, V, C> Clone for Iter<'_, K, V, C> {
    fn clone(&self) -> Self {
        Iter { inner: self.inner.clone() }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for Iter<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<'a, K, V, C> Iterator for GetAll<'a, K, V, C> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.inner.len(), Some(self.inner.len()))
    }
}

impl<'a, K, V, C> DoubleEndedIterator for GetAll<'a, K, V, C> {
    fn next_back(&mut self) -> Option<&'a V> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V, C> ExactSizeIterator for GetAll<'_, K, V, C> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, C> FusedIterator for GetAll<'_, K, V, C> {}

impl<K, V, C> Clone for GetAll<'_, K, V, C> {
    fn clone(&self) -> Self {
        GetAll { inner: self.inner.clone() }
    }
}

impl<K, V: fmt::Debug, C> fmt::Debug for GetAll<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
