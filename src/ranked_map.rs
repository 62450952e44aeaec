//! An ordered map with logarithmic rank queries.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::iter::FusedIterator;
use core::ops::{Index, IndexMut, RangeBounds};

use crate::comparator::{Comparator, NaturalOrder};
use crate::error::Result;
use crate::order_statistic::Rank;
use crate::raw::{Cursor, RawIter, RawTree};

/// An ordered map based on a weight-carrying B+ tree.
///
/// Entries are kept in key order, so iterators produce them sorted and the
/// smallest and largest entries are always one call away. On top of the usual
/// ordered-map surface, every branch node caches the size of its subtrees,
/// which makes *positional* queries logarithmic too: [`get_index`] finds the
/// entry at a given rank, [`rank_of`] finds the rank of a given key, and
/// [`remove_index`] deletes by position, all in O(log n) without walking the
/// entries in between.
///
/// Keys are compared through a [`Comparator`]. The default,
/// [`NaturalOrder`], uses the key type's [`Ord`] implementation; a custom
/// ordering (including a plain closure) can be supplied with
/// [`with_comparator`]. Each key appears at most once. For duplicate keys see
/// [`RankedBag`](crate::RankedBag) and
/// [`RankedMultimap`](crate::RankedMultimap).
///
/// It is a logic error for a key to be modified in such a way that its
/// ordering relative to any other key, as seen by the map's comparator,
/// changes while it is in the map. This is normally only possible through
/// [`Cell`](core::cell::Cell), [`RefCell`](core::cell::RefCell), global
/// state, I/O, or unsafe code. The same applies to a comparator that does not
/// implement a total order. The behavior resulting from either logic error is
/// not specified and may include panics, incorrect results, and
/// non-termination, but stays confined to the map that observed it.
///
/// [`get_index`]: RankedMap::get_index
/// [`rank_of`]: RankedMap::rank_of
/// [`remove_index`]: RankedMap::remove_index
/// [`with_comparator`]: RankedMap::with_comparator
///
/// # Examples
///
/// ```
/// use ranked_tree::{Rank, RankedMap};
///
/// let mut standings = RankedMap::new();
///
/// standings.insert("Ada", 91);
/// standings.insert("Grace", 84);
/// standings.insert("Edsger", 79);
///
/// // keyed lookups work like any ordered map.
/// assert_eq!(standings.get(&"Grace"), Some(&84));
///
/// // positional queries are what the cached weights buy.
/// assert_eq!(standings.get_index(0), Some((&"Ada", &91)));
/// assert_eq!(standings.rank_of(&"Grace"), Some(2));
/// assert_eq!(standings[Rank(1)], 79);
/// ```
///
/// A `RankedMap` with a known list of entries can be initialized from an
/// array:
///
/// ```
/// use ranked_tree::RankedMap;
///
/// let squares = RankedMap::from([(1, 1), (2, 4), (3, 9)]);
/// assert_eq!(squares.len(), 3);
/// ```
pub struct RankedMap<K, V, C = NaturalOrder> {
    raw: RawTree<K, V, C>,
}

/// An iterator over the entries of a `RankedMap`.
///
/// This `struct` is created by the [`iter`] method on [`RankedMap`]. See its
/// documentation for more.
///
/// # Examples
///
/// ```
/// use ranked_tree::RankedMap;
///
/// let map = RankedMap::from([(1, "a"), (2, "b")]);
/// let mut iter = map.iter();
/// assert_eq!(iter.next(), Some((&1, &"a")));
/// assert_eq!(iter.next_back(), Some((&2, &"b")));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: RankedMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V, C = NaturalOrder> {
    inner: RawIter<'a, K, V, C>,
}

/// An owning iterator over the entries of a `RankedMap`.
///
/// This `struct` is created by the [`into_iter`] method on [`RankedMap`]
/// (provided by the [`IntoIterator`] trait). See its documentation for more.
///
/// [`into_iter`]: IntoIterator::into_iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

/// An iterator over the keys of a `RankedMap`.
///
/// This `struct` is created by the [`keys`] method on [`RankedMap`]. See its
/// documentation for more.
///
/// # Examples
///
/// ```
/// use ranked_tree::RankedMap;
///
/// let map = RankedMap::from([(2, "b"), (1, "a")]);
/// let keys: Vec<_> = map.keys().copied().collect();
/// assert_eq!(keys, [1, 2]);
/// ```
///
/// [`keys`]: RankedMap::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V, C = NaturalOrder> {
    inner: RawIter<'a, K, V, C>,
}

/// An iterator over the values of a `RankedMap`, in order by key.
///
/// This `struct` is created by the [`values`] method on [`RankedMap`]. See
/// its documentation for more.
///
/// # Examples
///
/// ```
/// use ranked_tree::RankedMap;
///
/// let map = RankedMap::from([(2, "b"), (1, "a")]);
/// let values: Vec<_> = map.values().copied().collect();
/// assert_eq!(values, ["a", "b"]);
/// ```
///
/// [`values`]: RankedMap::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V, C = NaturalOrder> {
    inner: RawIter<'a, K, V, C>,
}

/// An iterator over a sub-range of entries in a `RankedMap`.
///
/// This `struct` is created by the [`range`] method on [`RankedMap`]. See its
/// documentation for more.
///
/// # Examples
///
/// ```
/// use ranked_tree::RankedMap;
///
/// let map = RankedMap::from([(3, "c"), (5, "e"), (8, "h")]);
/// let mut range = map.range(4..);
/// assert_eq!(range.next(), Some((&5, &"e")));
/// assert_eq!(range.next_back(), Some((&8, &"h")));
/// assert_eq!(range.next(), None);
/// ```
///
/// [`range`]: RankedMap::range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, K, V, C = NaturalOrder> {
    inner: RawIter<'a, K, V, C>,
}

impl<K, V> RankedMap<K, V> {
    /// Makes a new, empty `RankedMap` ordered by the key type's [`Ord`]
    /// implementation.
    ///
    /// Allocates the single empty leaf that serves as the root.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let mut map = RankedMap::new();
    ///
    /// // entries can now be inserted into the empty map
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub fn new() -> RankedMap<K, V> {
        RankedMap { raw: RawTree::new(NaturalOrder) }
    }

    /// Makes a new, empty `RankedMap` with the given branching order.
    ///
    /// The order is the maximum number of children a branch node may have; a
    /// node then holds up to `order - 1` keys. Larger orders mean shallower
    /// trees and better cache behavior for big maps, smaller orders less
    /// memory slack for tiny ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrderOutOfRange`](crate::Error::OrderOutOfRange) when
    /// `order` falls outside `MIN_ORDER..=MAX_ORDER`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let mut map = RankedMap::with_order(16).unwrap();
    /// map.insert(1, "a");
    ///
    /// assert!(RankedMap::<i32, &str>::with_order(3).is_err());
    /// ```
    pub fn with_order(order: usize) -> Result<RankedMap<K, V>> {
        Ok(RankedMap { raw: RawTree::with_order(order, NaturalOrder)? })
    }
}

impl<K, V, C> RankedMap<K, V, C> {
    /// Makes a new, empty `RankedMap` ordered by `cmp`.
    ///
    /// Any closure of type `Fn(&K, &K) -> Ordering` works as a comparator, as
    /// does any type implementing [`Comparator`]. The comparator must define
    /// a total order over the keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// // a map sorted by descending key
    /// let mut map = RankedMap::with_comparator(|a: &i32, b: &i32| b.cmp(a));
    /// map.insert(1, "one");
    /// map.insert(2, "two");
    /// assert_eq!(map.first_key_value(), Some((&2, &"two")));
    /// ```
    #[must_use]
    pub fn with_comparator(cmp: C) -> RankedMap<K, V, C> {
        RankedMap { raw: RawTree::new(cmp) }
    }

    /// Makes a new, empty `RankedMap` with the given branching order, ordered
    /// by `cmp`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrderOutOfRange`](crate::Error::OrderOutOfRange) when
    /// `order` falls outside `MIN_ORDER..=MAX_ORDER`.
    pub fn with_order_and_comparator(order: usize, cmp: C) -> Result<RankedMap<K, V, C>> {
        Ok(RankedMap { raw: RawTree::with_order(order, cmp)? })
    }

    /// Returns the map's branching order.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::{RankedMap, DEFAULT_ORDER};
    ///
    /// let map = RankedMap::<i32, i32>::new();
    /// assert_eq!(map.order(), DEFAULT_ORDER);
    /// ```
    #[must_use]
    pub fn order(&self) -> usize {
        self.raw.order()
    }

    /// Changes the map's branching order. Only an empty map can change
    /// shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrderOutOfRange`](crate::Error::OrderOutOfRange) when
    /// `order` falls outside `MIN_ORDER..=MAX_ORDER`, and
    /// [`Error::OrderLocked`](crate::Error::OrderLocked) when the map is not
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::{Error, RankedMap};
    ///
    /// let mut map = RankedMap::new();
    /// assert_eq!(map.set_order(16), Ok(()));
    ///
    /// map.insert(1, "a");
    /// assert_eq!(map.set_order(32), Err(Error::OrderLocked));
    /// ```
    pub fn set_order(&mut self, order: usize) -> Result<()> {
        self.raw.set_order(order)
    }

    /// Returns the number of entries in the map.
    ///
    /// # Complexity
    ///
    /// O(1) - reads the cached root weight.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let mut a = RankedMap::new();
    /// assert_eq!(a.len(), 0);
    /// a.insert(1, "a");
    /// assert_eq!(a.len(), 1);
    /// ```
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.weight()
    }

    /// Returns `true` if the map contains no entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let mut a = RankedMap::new();
    /// assert!(a.is_empty());
    /// a.insert(1, "a");
    /// assert!(!a.is_empty());
    /// ```
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the map, removing all entries. The branching order is kept.
    ///
    /// # Complexity
    ///
    /// O(n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let mut a = RankedMap::new();
    /// a.insert(1, "a");
    /// a.clear();
    /// assert!(a.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the first entry in the map. Its key is the minimum under the
    /// map's comparator.
    ///
    /// # Complexity
    ///
    /// O(1) - uses the cached leftmost leaf.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let mut map = RankedMap::new();
    /// assert_eq!(map.first_key_value(), None);
    /// map.insert(1, "b");
    /// map.insert(2, "a");
    /// assert_eq!(map.first_key_value(), Some((&1, &"b")));
    /// ```
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first()
    }

    /// Returns the last entry in the map. Its key is the maximum under the
    /// map's comparator.
    ///
    /// # Complexity
    ///
    /// O(1) - uses the cached rightmost leaf.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let mut map = RankedMap::new();
    /// assert_eq!(map.last_key_value(), None);
    /// map.insert(1, "b");
    /// map.insert(2, "a");
    /// assert_eq!(map.last_key_value(), Some((&2, &"a")));
    /// ```
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last()
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// # Complexity
    ///
    /// O(log n) to create, amortized O(1) per step.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let map = RankedMap::from([(3, "c"), (1, "a"), (2, "b")]);
    ///
    /// let (first_key, first_value) = map.iter().next().unwrap();
    /// assert_eq!((*first_key, *first_value), (1, "a"));
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter { inner: RawIter::all(&self.raw) }
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let map = RankedMap::from([(2, "b"), (1, "a")]);
    /// let keys: Vec<_> = map.keys().copied().collect();
    /// assert_eq!(keys, [1, 2]);
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V, C> {
        Keys { inner: RawIter::all(&self.raw) }
    }

    /// Gets an iterator over the values of the map, in order by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let map = RankedMap::from([(1, "hello"), (2, "goodbye")]);
    /// let values: Vec<_> = map.values().copied().collect();
    /// assert_eq!(values, ["hello", "goodbye"]);
    /// ```
    pub fn values(&self) -> Values<'_, K, V, C> {
        Values { inner: RawIter::all(&self.raw) }
    }

    /// Returns the entry at rank `index` in sorted order, or `None` if
    /// `index` is out of bounds. Ranks are zero-based.
    ///
    /// The descent is driven purely by the cached subtree weights; no key
    /// comparisons happen.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let mut map = RankedMap::new();
    /// map.insert("a", 10);
    /// map.insert("c", 30);
    /// map.insert("b", 20);
    ///
    /// assert_eq!(map.get_index(1), Some((&"b", &20)));
    /// assert_eq!(map.get_index(3), None);
    /// ```
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.raw.entry_at(index)
    }

    /// Returns the key and a mutable reference to the value at rank `index`
    /// in sorted order, or `None` if `index` is out of bounds.
    ///
    /// The key comes back as a shared reference because mutating it could
    /// break the map's ordering.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let mut map = RankedMap::new();
    /// map.insert("a", 1);
    /// map.insert("b", 2);
    ///
    /// if let Some((_, value)) = map.get_index_mut(1) {
    ///     *value += 10;
    /// }
    /// assert_eq!(map.get(&"b"), Some(&12));
    /// ```
    pub fn get_index_mut(&mut self, index: usize) -> Option<(&K, &mut V)> {
        self.raw.entry_at_mut(index)
    }

    /// Returns a cursor parked before the first entry.
    ///
    /// A cursor is a detached position: it borrows nothing, so the map stays
    /// fully usable between steps. The trade-off is that any structural
    /// mutation (insert of a new key, any removal, `clear`, `set_order`)
    /// invalidates it; stepping a stale cursor reports
    /// [`Error::StaleCursor`](crate::Error::StaleCursor) instead of walking
    /// possibly moved entries. Replacing the value of an existing key keeps
    /// the shape and keeps cursors valid.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::{Error, RankedMap};
    ///
    /// let mut map = RankedMap::from([(1, "a"), (2, "b")]);
    ///
    /// let mut cursor = map.cursor();
    /// assert_eq!(map.cursor_next(&mut cursor), Ok(Some((&1, &"a"))));
    ///
    /// map.insert(1, "A"); // value replaced in place: cursor still fresh
    /// assert_eq!(map.cursor_next(&mut cursor), Ok(Some((&2, &"b"))));
    ///
    /// map.insert(3, "c"); // new key: structure changed
    /// assert_eq!(map.cursor_next(&mut cursor), Err(Error::StaleCursor));
    /// ```
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.raw.cursor_front()
    }

    /// Returns a cursor parked after the last entry, for walking backwards
    /// with [`cursor_prev`](RankedMap::cursor_prev).
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let map = RankedMap::from([(1, "a"), (2, "b")]);
    ///
    /// let mut cursor = map.cursor_back();
    /// assert_eq!(map.cursor_prev(&mut cursor), Ok(Some((&2, &"b"))));
    /// assert_eq!(map.cursor_prev(&mut cursor), Ok(Some((&1, &"a"))));
    /// assert_eq!(map.cursor_prev(&mut cursor), Ok(None));
    /// ```
    #[must_use]
    pub fn cursor_back(&self) -> Cursor {
        self.raw.cursor_back()
    }

    /// Yields the entry after `cursor` and advances it, or `Ok(None)` at the
    /// end.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleCursor`](crate::Error::StaleCursor) if the map
    /// has been structurally mutated since the cursor was created.
    pub fn cursor_next(&self, cursor: &mut Cursor) -> Result<Option<(&K, &V)>> {
        self.raw.cursor_next(cursor)
    }

    /// Yields the entry before `cursor` and moves it back, or `Ok(None)` at
    /// the front.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleCursor`](crate::Error::StaleCursor) if the map
    /// has been structurally mutated since the cursor was created.
    pub fn cursor_prev(&self, cursor: &mut Cursor) -> Result<Option<(&K, &V)>> {
        self.raw.cursor_prev(cursor)
    }
}

impl<K: Clone, V, C: Comparator<K>> RankedMap<K, V, C> {
    /// Returns `true` if the map contains an entry for `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let mut map = RankedMap::new();
    /// map.insert(1, "a");
    /// assert!(map.contains_key(&1));
    /// assert!(!map.contains_key(&2));
    /// ```
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.raw.find(key).is_some()
    }

    /// Returns a reference to the value for `key`, if any.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let mut map = RankedMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        let (handle, slot) = self.raw.find(key)?;
        Some(self.raw.leaf(handle).value(slot))
    }

    /// Returns the stored key-value pair for `key`, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let mut map = RankedMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get_key_value(&1), Some((&1, &"a")));
    /// assert_eq!(map.get_key_value(&2), None);
    /// ```
    #[must_use]
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let (handle, slot) = self.raw.find(key)?;
        Some(self.raw.leaf(handle).entry(slot))
    }

    /// Returns a mutable reference to the value for `key`, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let mut map = RankedMap::new();
    /// map.insert(1, "a");
    /// if let Some(x) = map.get_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(map[&1], "b");
    /// ```
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.raw.find_value_mut(key)
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the key was not present, `None` is returned. If it was, the value
    /// is replaced in place and the old value is returned; the key itself is
    /// not updated, the tree's shape does not change, and detached cursors
    /// stay valid.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let mut map = RankedMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    ///
    /// map.insert(37, "b");
    /// assert_eq!(map.insert(37, "c"), Some("b"));
    /// assert_eq!(map[&37], "c");
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.raw.insert_unique(key, value)
    }

    /// Removes `key` from the map, returning its value if it was present.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let mut map = RankedMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes `key` from the map, returning the stored key and value if it
    /// was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let mut map = RankedMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove_entry(&1), Some((1, "a")));
    /// assert_eq!(map.remove_entry(&1), None);
    /// ```
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        self.raw.remove_key(key)
    }

    /// Removes and returns the first entry in the map, the one with the
    /// minimum key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// Draining entries in ascending order, while keeping a usable map each
    /// iteration.
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let mut map = RankedMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    /// while let Some((key, _value)) = map.pop_first() {
    ///     assert!(map.iter().all(|(k, _)| *k > key));
    /// }
    /// assert!(map.is_empty());
    /// ```
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.raw.remove_index(0)
    }

    /// Removes and returns the last entry in the map, the one with the
    /// maximum key.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let mut map = RankedMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    /// assert_eq!(map.pop_last(), Some((2, "b")));
    /// assert_eq!(map.pop_last(), Some((1, "a")));
    /// assert_eq!(map.pop_last(), None);
    /// ```
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let last = self.len().checked_sub(1)?;
        self.raw.remove_index(last)
    }

    /// Removes and returns the entry at rank `index` in sorted order, or
    /// `None` if `index` is out of bounds.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let mut map = RankedMap::from([(1, "a"), (2, "b"), (3, "c")]);
    /// assert_eq!(map.remove_index(1), Some((2, "b")));
    /// assert_eq!(map.remove_index(5), None);
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn remove_index(&mut self, index: usize) -> Option<(K, V)> {
        self.raw.remove_index(index)
    }

    /// Returns the zero-based rank of `key` in sorted order, or `None` if
    /// the key is not present.
    ///
    /// The rank is the number of entries with smaller keys, so
    /// `map.get_index(map.rank_of(&k)?)` gets back to the same entry.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let mut map = RankedMap::new();
    /// map.insert("apple", 3);
    /// map.insert("pear", 5);
    /// map.insert("plum", 1);
    ///
    /// assert_eq!(map.rank_of(&"pear"), Some(1));
    /// assert_eq!(map.rank_of(&"quince"), None);
    /// ```
    #[must_use]
    pub fn rank_of(&self, key: &K) -> Option<usize> {
        self.raw.rank_of(key)
    }

    /// Gets an iterator over a sub-range of entries in the map, in sorted
    /// order. Any argument that implements [`RangeBounds`] works, such as
    /// `4..7`, `4..=6`, or `(Excluded(4), Unbounded)`.
    ///
    /// The window's endpoints are located by rank, so building the iterator
    /// costs O(log n) no matter how many entries the range spans.
    ///
    /// # Panics
    ///
    /// Panics if the range's start is greater than its end, or if the bounds
    /// are equal and both excluded.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let mut map = RankedMap::new();
    /// map.insert(3, "a");
    /// map.insert(5, "b");
    /// map.insert(8, "c");
    ///
    /// for (key, value) in map.range(4..=8) {
    ///     println!("{key}: {value}");
    /// }
    /// assert_eq!(map.range(4..).next(), Some((&5, &"b")));
    /// ```
    pub fn range<R: RangeBounds<K>>(&self, range: R) -> Range<'_, K, V, C> {
        let (start, end) = self.raw.rank_window(&range);
        Range { inner: RawIter::between(&self.raw, start, end) }
    }

    /// Recomputes every structural invariant from scratch and returns the
    /// violations found; an empty list means a healthy map. A diagnostic
    /// tool for tests, far too slow for production paths.
    #[must_use]
    pub fn check_invariants(&self) -> Vec<String> {
        self.raw.check_invariants()
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for RankedMap<K, V, C> {
    fn clone(&self) -> Self {
        RankedMap { raw: self.raw.clone() }
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for RankedMap<K, V, C> {
    fn eq(&self, other: &RankedMap<K, V, C>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for RankedMap<K, V, C> {}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for RankedMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C: Default> Default for RankedMap<K, V, C> {
    /// Creates an empty map ordered by the default comparator.
    fn default() -> RankedMap<K, V, C> {
        RankedMap::with_comparator(C::default())
    }
}

impl<K: Clone, V, C: Comparator<K> + Default> FromIterator<(K, V)> for RankedMap<K, V, C> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> RankedMap<K, V, C> {
        let mut map = RankedMap::with_comparator(C::default());
        map.extend(iter);
        map
    }
}

impl<K: Clone, V, C: Comparator<K>> Extend<(K, V)> for RankedMap<K, V, C> {
    #[inline]
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        iter.into_iter().for_each(move |(k, v)| {
            self.insert(k, v);
        });
    }
}

impl<'a, K: Copy, V: Copy, C: Comparator<K>> Extend<(&'a K, &'a V)> for RankedMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        self.extend(iter.into_iter().map(|(&key, &value)| (key, value)));
    }
}

impl<K: Ord + Clone, V, const N: usize> From<[(K, V); N]> for RankedMap<K, V> {
    /// Converts a `[(K, V); N]` into a `RankedMap<K, V>`. Later duplicates
    /// win, exactly as with repeated [`insert`](RankedMap::insert) calls.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedMap;
    ///
    /// let map1 = RankedMap::from([(1, 2), (3, 4)]);
    /// let map2: RankedMap<_, _> = [(1, 2), (3, 4)].into();
    /// assert_eq!(map1, map2);
    /// ```
    fn from(arr: [(K, V); N]) -> RankedMap<K, V> {
        arr.into_iter().collect()
    }
}

impl<'a, K, V, C> IntoIterator for &'a RankedMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C>;

    fn into_iter(self) -> Iter<'a, K, V, C> {
        self.iter()
    }
}

impl<K, V, C> IntoIterator for RankedMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Consumes the map into an iterator over its entries, sorted by key.
    ///
    /// The entries are drained along the leaf chain in one O(n) pass, not
    /// removed one at a time.
    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter { inner: self.raw.drain_to_vec().into_iter() }
    }
}

/// Indexes the map by key.
///
/// # Panics
///
/// Panics if the key is not present in the map.
impl<K: Clone, V, C: Comparator<K>> Index<&K> for RankedMap<K, V, C> {
    type Output = V;

    fn index(&self, key: &K) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

/// Indexes the map by rank, the position in sorted order.
///
/// # Panics
///
/// Panics if the rank is out of bounds.
///
/// # Examples
///
/// ```
/// use ranked_tree::{Rank, RankedMap};
///
/// let map = RankedMap::from([("a", 1), ("b", 2)]);
/// assert_eq!(map[Rank(0)], 1);
/// assert_eq!(map[Rank(1)], 2);
/// ```
impl<K, V, C> Index<Rank> for RankedMap<K, V, C> {
    type Output = V;

    fn index(&self, rank: Rank) -> &V {
        self.get_index(rank.0).map(|(_, value)| value).expect("index out of bounds")
    }
}

/// Mutably indexes the map by rank, the position in sorted order.
///
/// # Panics
///
/// Panics if the rank is out of bounds.
///
/// # Examples
///
/// ```
/// use ranked_tree::{Rank, RankedMap};
///
/// let mut map = RankedMap::from([("a", 1), ("b", 2)]);
/// map[Rank(1)] += 10;
/// assert_eq!(map.get(&"b"), Some(&12));
/// ```
impl<K, V, C> IndexMut<Rank> for RankedMap<K, V, C> {
    fn index_mut(&mut self, rank: Rank) -> &mut V {
        self.get_index_mut(rank.0).map(|(_, value)| value).expect("index out of bounds")
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

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice()).finish()
    }
}

impl<'a, K, V, C> Iterator for Keys<'a, K, V, C> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.inner.len(), Some(self.inner.len()))
    }
}

impl<'a, K, V, C> DoubleEndedIterator for Keys<'a, K, V, C> {
    fn next_back(&mut self) -> Option<&'a K> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V, C> ExactSizeIterator for Keys<'_, K, V, C> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, C> FusedIterator for Keys<'_, K, V, C> {}

impl<K, V, C> Clone for Keys<'_, K, V, C> {
    fn clone(&self) -> Self {
        Keys { inner: self.inner.clone() }
    }
}

impl<K: fmt::Debug, V, C> fmt::Debug for Keys<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V, C> Iterator for Values<'a, K, V, C> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.inner.len(), Some(self.inner.len()))
    }
}

impl<'a, K, V, C> DoubleEndedIterator for Values<'a, K, V, C> {
    fn next_back(&mut self) -> Option<&'a V> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V, C> ExactSizeIterator for Values<'_, K, V, C> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, C> FusedIterator for Values<'_, K, V, C> {}

impl<K, V, C> Clone for Values<'_, K, V, C> {
    fn clone(&self) -> Self {
        Values { inner: self.inner.clone() }
    }
}

impl<K, V: fmt::Debug, C> fmt::Debug for Values<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V, C> Iterator for Range<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.inner.len(), Some(self.inner.len()))
    }
}

impl<'a, K, V, C> DoubleEndedIterator for Range<'a, K, V, C> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        self.inner.next_back()
    }
}

impl<K, V, C> ExactSizeIterator for Range<'_, K, V, C> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, C> FusedIterator for Range<'_, K, V, C> {}

impl<K, V, C> Clone for Range<'_, K, V, C> {
    fn clone(&self) -> Self {
        Range { inner: self.inner.clone() }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for Range<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
