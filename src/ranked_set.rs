//! An ordered set with logarithmic rank queries.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::iter::FusedIterator;
use core::ops::RangeBounds;

use crate::comparator::{Comparator, NaturalOrder};
use crate::error::Result;
use crate::raw::Cursor;
use crate::ranked_map::{self, RankedMap};

/// An ordered set based on a weight-carrying B+ tree.
///
/// Elements are kept sorted under the set's [`Comparator`] (by default the
/// element type's [`Ord`]), and each element appears at most once. Beyond the
/// usual ordered-set surface, the cached subtree weights answer positional
/// questions in O(log n): [`get_index`] finds the k-th smallest element and
/// [`rank_of`] counts how many elements precede a given one.
///
/// It is a logic error for an element to be modified in such a way that its
/// ordering relative to any other element, as seen by the set's comparator,
/// changes while it is in the set. The behavior resulting from such a logic
/// error is not specified and may include panics, incorrect results, and
/// non-termination, but stays confined to the set that observed it.
///
/// [`get_index`]: RankedSet::get_index
/// [`rank_of`]: RankedSet::rank_of
///
/// # Examples
///
/// ```
/// use ranked_tree::RankedSet;
///
/// let mut finish_times = RankedSet::new();
///
/// finish_times.insert(148);
/// finish_times.insert(131);
/// finish_times.insert(155);
///
/// // ordinary membership...
/// assert!(finish_times.contains(&131));
///
/// // ...and positional queries in one descent.
/// assert_eq!(finish_times.get_index(0), Some(&131));
/// assert_eq!(finish_times.rank_of(&148), Some(1));
/// ```
pub struct RankedSet<T, C = NaturalOrder> {
    map: RankedMap<T, (), C>,
}

/// An iterator over the elements of a `RankedSet`, in sorted order.
///
/// This `struct` is created by the [`iter`] method on [`RankedSet`]. See its
/// documentation for more.
///
/// [`iter`]: RankedSet::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T, C = NaturalOrder> {
    inner: ranked_map::Keys<'a, T, (), C>,
}

/// An owning iterator over the elements of a `RankedSet`, in sorted order.
///
/// This `struct` is created by the [`into_iter`] method on [`RankedSet`]
/// (provided by the [`IntoIterator`] trait). See its documentation for more.
///
/// [`into_iter`]: IntoIterator::into_iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoIter<T> {
    inner: ranked_map::IntoIter<T, ()>,
}

/// An iterator over a sub-range of elements in a `RankedSet`.
///
/// This `struct` is created by the [`range`] method on [`RankedSet`]. See its
/// documentation for more.
///
/// [`range`]: RankedSet::range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, T, C = NaturalOrder> {
    inner: ranked_map::Range<'a, T, (), C>,
}

impl<T> RankedSet<T> {
    /// Makes a new, empty `RankedSet` ordered by the element type's [`Ord`]
    /// implementation.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedSet;
    ///
    /// let mut set: RankedSet<i32> = RankedSet::new();
    /// set.insert(1);
    /// ```
    #[must_use]
    pub fn new() -> RankedSet<T> {
        RankedSet { map: RankedMap::new() }
    }

    /// Makes a new, empty `RankedSet` with the given branching order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrderOutOfRange`](crate::Error::OrderOutOfRange) when
    /// `order` falls outside `MIN_ORDER..=MAX_ORDER`.
    pub fn with_order(order: usize) -> Result<RankedSet<T>> {
        Ok(RankedSet { map: RankedMap::with_order(order)? })
    }
}

impl<T, C> RankedSet<T, C> {
    /// Makes a new, empty `RankedSet` ordered by `cmp`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedSet;
    ///
    /// let mut set = RankedSet::with_comparator(|a: &i32, b: &i32| b.cmp(a));
    /// set.insert(1);
    /// set.insert(3);
    /// set.insert(2);
    ///
    /// let descending: Vec<_> = set.iter().copied().collect();
    /// assert_eq!(descending, [3, 2, 1]);
    /// ```
    #[must_use]
    pub fn with_comparator(cmp: C) -> RankedSet<T, C> {
        RankedSet { map: RankedMap::with_comparator(cmp) }
    }

    /// Makes a new, empty `RankedSet` with the given branching order, ordered
    /// by `cmp`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrderOutOfRange`](crate::Error::OrderOutOfRange) when
    /// `order` falls outside `MIN_ORDER..=MAX_ORDER`.
    pub fn with_order_and_comparator(order: usize, cmp: C) -> Result<RankedSet<T, C>> {
        Ok(RankedSet { map: RankedMap::with_order_and_comparator(order, cmp)? })
    }

    /// Returns the set's branching order.
    #[must_use]
    pub fn order(&self) -> usize {
        self.map.order()
    }

    /// Changes the set's branching order. Only an empty set can change
    /// shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrderOutOfRange`](crate::Error::OrderOutOfRange) when
    /// `order` falls outside `MIN_ORDER..=MAX_ORDER`, and
    /// [`Error::OrderLocked`](crate::Error::OrderLocked) when the set is not
    /// empty.
    pub fn set_order(&mut self, order: usize) -> Result<()> {
        self.map.set_order(order)
    }

    /// Returns the number of elements in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedSet;
    ///
    /// let mut v = RankedSet::new();
    /// assert_eq!(v.len(), 0);
    /// v.insert(1);
    /// assert_eq!(v.len(), 1);
    /// ```
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set contains no elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedSet;
    ///
    /// let mut v = RankedSet::new();
    /// assert!(v.is_empty());
    /// v.insert(1);
    /// assert!(!v.is_empty());
    /// ```
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Clears the set, removing all elements. The branching order is kept.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns a reference to the first (minimum) element, if any.
    ///
    /// # Complexity
    ///
    /// O(1) - uses the cached leftmost leaf.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// assert_eq!(set.first(), None);
    /// set.insert(2);
    /// set.insert(1);
    /// assert_eq!(set.first(), Some(&1));
    /// ```
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.map.first_key_value().map(|(element, _)| element)
    }

    /// Returns a reference to the last (maximum) element, if any.
    ///
    /// # Complexity
    ///
    /// O(1) - uses the cached rightmost leaf.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.map.last_key_value().map(|(element, _)| element)
    }

    /// Gets an iterator over the elements of the set, in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedSet;
    ///
    /// let set = RankedSet::from([3, 1, 2]);
    /// let elements: Vec<_> = set.iter().copied().collect();
    /// assert_eq!(elements, [1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T, C> {
        Iter { inner: self.map.keys() }
    }

    /// Returns the element at rank `index` in sorted order, or `None` if
    /// `index` is out of bounds. Ranks are zero-based.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedSet;
    ///
    /// let set = RankedSet::from([30, 10, 20]);
    /// assert_eq!(set.get_index(1), Some(&20));
    /// assert_eq!(set.get_index(3), None);
    /// ```
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&T> {
        self.map.get_index(index).map(|(element, _)| element)
    }

    /// Returns a cursor parked before the first element.
    ///
    /// Cursors borrow nothing; any structural mutation of the set makes
    /// stepping fail with
    /// [`Error::StaleCursor`](crate::Error::StaleCursor).
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.map.cursor()
    }

    /// Returns a cursor parked after the last element.
    #[must_use]
    pub fn cursor_back(&self) -> Cursor {
        self.map.cursor_back()
    }

    /// Yields the element after `cursor` and advances it, or `Ok(None)` at
    /// the end.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleCursor`](crate::Error::StaleCursor) if the set
    /// has been structurally mutated since the cursor was created.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::{Error, RankedSet};
    ///
    /// let mut set = RankedSet::from([1, 2]);
    ///
    /// let mut cursor = set.cursor();
    /// assert_eq!(set.cursor_next(&mut cursor), Ok(Some(&1)));
    ///
    /// set.insert(3);
    /// assert_eq!(set.cursor_next(&mut cursor), Err(Error::StaleCursor));
    /// ```
    pub fn cursor_next(&self, cursor: &mut Cursor) -> Result<Option<&T>> {
        Ok(self.map.cursor_next(cursor)?.map(|(element, _)| element))
    }

    /// Yields the element before `cursor` and moves it back, or `Ok(None)`
    /// at the front.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleCursor`](crate::Error::StaleCursor) if the set
    /// has been structurally mutated since the cursor was created.
    pub fn cursor_prev(&self, cursor: &mut Cursor) -> Result<Option<&T>> {
        Ok(self.map.cursor_prev(cursor)?.map(|(element, _)| element))
    }
}

impl<T: Clone, C: Comparator<T>> RankedSet<T, C> {
    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted:
    ///
    /// - If the set did not previously contain an equal value, `true` is
    ///   returned.
    /// - If it did, `false` is returned and the set is not modified: the
    ///   original value is not replaced.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    ///
    /// assert!(set.insert(2));
    /// assert!(!set.insert(2));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        self.map.insert(value, ()).is_none()
    }

    /// Returns `true` if the set contains an element equal to `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedSet;
    ///
    /// let set = RankedSet::from([1, 2, 3]);
    /// assert!(set.contains(&1));
    /// assert!(!set.contains(&4));
    /// ```
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.map.contains_key(value)
    }

    /// Returns a reference to the stored element equal to `value`, if any.
    ///
    /// This is useful when the comparator treats distinguishable values as
    /// equal and the caller wants the one the set kept.
    #[must_use]
    pub fn get(&self, value: &T) -> Option<&T> {
        self.map.get_key_value(value).map(|(element, _)| element)
    }

    /// Removes `value` from the set. Returns whether it was present.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// set.insert(2);
    /// assert!(set.remove(&2));
    /// assert!(!set.remove(&2));
    /// ```
    pub fn remove(&mut self, value: &T) -> bool {
        self.map.remove(value).is_some()
    }

    /// Removes and returns the first (minimum) element, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedSet;
    ///
    /// let mut set = RankedSet::from([2, 1]);
    /// assert_eq!(set.pop_first(), Some(1));
    /// assert_eq!(set.pop_first(), Some(2));
    /// assert_eq!(set.pop_first(), None);
    /// ```
    pub fn pop_first(&mut self) -> Option<T> {
        self.map.pop_first().map(|(element, ())| element)
    }

    /// Removes and returns the last (maximum) element, if any.
    pub fn pop_last(&mut self) -> Option<T> {
        self.map.pop_last().map(|(element, ())| element)
    }

    /// Returns the zero-based rank of `value` in sorted order, or `None` if
    /// the set has no equal element. The rank counts the elements that
    /// precede it.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedSet;
    ///
    /// let set = RankedSet::from([10, 20, 30]);
    /// assert_eq!(set.rank_of(&20), Some(1));
    /// assert_eq!(set.rank_of(&25), None);
    /// ```
    #[must_use]
    pub fn rank_of(&self, value: &T) -> Option<usize> {
        self.map.rank_of(value)
    }

    /// Gets an iterator over a sub-range of elements in the set, in sorted
    /// order.
    ///
    /// # Panics
    ///
    /// Panics if the range's start is greater than its end, or if the bounds
    /// are equal and both excluded.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedSet;
    ///
    /// let set = RankedSet::from([3, 5, 8]);
    /// let in_window: Vec<_> = set.range(4..=8).copied().collect();
    /// assert_eq!(in_window, [5, 8]);
    /// ```
    pub fn range<R: RangeBounds<T>>(&self, range: R) -> Range<'_, T, C> {
        Range { inner: self.map.range(range) }
    }

    /// Recomputes every structural invariant from scratch and returns the
    /// violations found; an empty list means a healthy set.
    #[must_use]
    pub fn check_invariants(&self) -> Vec<String> {
        self.map.check_invariants()
    }
}

impl<T: Clone, C: Clone> Clone for RankedSet<T, C> {
    fn clone(&self) -> Self {
        RankedSet { map: self.map.clone() }
    }
}

impl<T: PartialEq, C> PartialEq for RankedSet<T, C> {
    fn eq(&self, other: &RankedSet<T, C>) -> bool {
        self.map == other.map
    }
}

impl<T: Eq, C> Eq for RankedSet<T, C> {}

impl<T: fmt::Debug, C> fmt::Debug for RankedSet<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C: Default> Default for RankedSet<T, C> {
    /// Creates an empty set ordered by the default comparator.
    fn default() -> RankedSet<T, C> {
        RankedSet { map: RankedMap::default() }
    }
}

impl<T: Clone, C: Comparator<T> + Default> FromIterator<T> for RankedSet<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> RankedSet<T, C> {
        let mut set = RankedSet::with_comparator(C::default());
        set.extend(iter);
        set
    }
}

impl<T: Clone, C: Comparator<T>> Extend<T> for RankedSet<T, C> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(move |element| {
            self.insert(element);
        });
    }
}

impl<'a, T: Copy, C: Comparator<T>> Extend<&'a T> for RankedSet<T, C> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T: Ord + Clone, const N: usize> From<[T; N]> for RankedSet<T> {
    /// Converts a `[T; N]` into a `RankedSet<T>`. Duplicates collapse to one
    /// element.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedSet;
    ///
    /// let set1 = RankedSet::from([1, 2, 3, 4]);
    /// let set2: RankedSet<_> = [1, 2, 3, 4].into();
    /// assert_eq!(set1, set2);
    /// ```
    fn from(arr: [T; N]) -> RankedSet<T> {
        arr.into_iter().collect()
    }
}

impl<'a, T, C> IntoIterator for &'a RankedSet<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, C>;

    fn into_iter(self) -> Iter<'a, T, C> {
        self.iter()
    }
}

impl<T, C> IntoIterator for RankedSet<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Consumes the set into an iterator over its elements, in sorted order.
    fn into_iter(self) -> IntoIter<T> {
        IntoIter { inner: self.map.into_iter() }
    }
}

impl<'a, T, C> Iterator for Iter<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T, C> DoubleEndedIterator for Iter<'a, T, C> {
    fn next_back(&mut self) -> Option<&'a T> {
        self.inner.next_back()
    }
}

impl<T, C> ExactSizeIterator for Iter<'_, T, C> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T, C> FusedIterator for Iter<'_, T, C> {}

impl<T, C> Clone for Iter<'_, T, C> {
    fn clone(&self) -> Self {
        Iter { inner: self.inner.clone() }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for Iter<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next().map(|(element, _)| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back().map(|(element, _)| element)
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<'a, T, C> Iterator for Range<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next().map(|(element, _)| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T, C> DoubleEndedIterator for Range<'a, T, C> {
    fn next_back(&mut self) -> Option<&'a T> {
        self.inner.next_back().map(|(element, _)| element)
    }
}

impl<T, C> ExactSizeIterator for Range<'_, T, C> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T, C> FusedIterator for Range<'_, T, C> {}

impl<T, C> Clone for Range<'_, T, C> {
    fn clone(&self) -> Self {
        Range { inner: self.inner.clone() }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for Range<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
