//! An ordered multiset with logarithmic rank queries.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::iter::FusedIterator;
use core::ops::Index;

use crate::comparator::{Comparator, NaturalOrder};
use crate::error::Result;
use crate::order_statistic::Rank;
use crate::raw::{Cursor, RawIter, RawTree};

/// An ordered multiset (bag) based on a weight-carrying B+ tree.
///
/// Unlike [`RankedSet`](crate::RankedSet), a bag keeps every inserted
/// element, equal ones included, in sorted order. Equal elements stay in
/// insertion order among themselves. The cached subtree weights make the
/// counting queries cheap: [`count`] measures a value's multiplicity and
/// [`rank_of`] its first position, both in O(log n), and [`get_index`]
/// selects the k-th smallest element overall.
///
/// It is a logic error for an element to be modified in such a way that its
/// ordering relative to any other element, as seen by the bag's comparator,
/// changes while it is in the bag.
///
/// [`count`]: RankedBag::count
/// [`rank_of`]: RankedBag::rank_of
/// [`get_index`]: RankedBag::get_index
///
/// # Examples
///
/// ```
/// use ranked_tree::RankedBag;
///
/// let mut latencies = RankedBag::new();
/// for sample in [12, 7, 12, 31, 12] {
///     latencies.insert(sample);
/// }
///
/// assert_eq!(latencies.len(), 5);
/// assert_eq!(latencies.count(&12), 3);
///
/// // the median sample, by rank
/// assert_eq!(latencies.get_index(latencies.len() / 2), Some(&12));
/// ```
pub struct RankedBag<T, C = NaturalOrder> {
    raw: RawTree<T, (), C>,
}

/// An iterator over the elements of a `RankedBag`, in sorted order with
/// duplicates adjacent.
///
/// This `struct` is created by the [`iter`] method on [`RankedBag`]. See its
/// documentation for more.
///
/// [`iter`]: RankedBag::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T, C = NaturalOrder> {
    inner: RawIter<'a, T, (), C>,
}

/// An owning iterator over the elements of a `RankedBag`, in sorted order.
///
/// This `struct` is created by the [`into_iter`] method on [`RankedBag`]
/// (provided by the [`IntoIterator`] trait). See its documentation for more.
///
/// [`into_iter`]: IntoIterator::into_iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoIter<T> {
    inner: alloc::vec::IntoIter<(T, ())>,
}

impl<T> RankedBag<T> {
    /// Makes a new, empty `RankedBag` ordered by the element type's [`Ord`]
    /// implementation.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedBag;
    ///
    /// let mut bag: RankedBag<i32> = RankedBag::new();
    /// bag.insert(1);
    /// bag.insert(1);
    /// assert_eq!(bag.len(), 2);
    /// ```
    #[must_use]
    pub fn new() -> RankedBag<T> {
        RankedBag { raw: RawTree::new(NaturalOrder) }
    }

    /// Makes a new, empty `RankedBag` with the given branching order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrderOutOfRange`](crate::Error::OrderOutOfRange) when
    /// `order` falls outside `MIN_ORDER..=MAX_ORDER`.
    pub fn with_order(order: usize) -> Result<RankedBag<T>> {
        Ok(RankedBag { raw: RawTree::with_order(order, NaturalOrder)? })
    }
}

impl<T, C> RankedBag<T, C> {
    /// Makes a new, empty `RankedBag` ordered by `cmp`.
    #[must_use]
    pub fn with_comparator(cmp: C) -> RankedBag<T, C> {
        RankedBag { raw: RawTree::new(cmp) }
    }

    /// Makes a new, empty `RankedBag` with the given branching order, ordered
    /// by `cmp`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrderOutOfRange`](crate::Error::OrderOutOfRange) when
    /// `order` falls outside `MIN_ORDER..=MAX_ORDER`.
    pub fn with_order_and_comparator(order: usize, cmp: C) -> Result<RankedBag<T, C>> {
        Ok(RankedBag { raw: RawTree::with_order(order, cmp)? })
    }

    /// Returns the bag's branching order.
    #[must_use]
    pub fn order(&self) -> usize {
        self.raw.order()
    }

    /// Changes the bag's branching order. Only an empty bag can change
    /// shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrderOutOfRange`](crate::Error::OrderOutOfRange) when
    /// `order` falls outside `MIN_ORDER..=MAX_ORDER`, and
    /// [`Error::OrderLocked`](crate::Error::OrderLocked) when the bag is not
    /// empty.
    pub fn set_order(&mut self, order: usize) -> Result<()> {
        self.raw.set_order(order)
    }

    /// Returns the number of elements in the bag, duplicates counted.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedBag;
    ///
    /// let bag = RankedBag::from([1, 1, 2]);
    /// assert_eq!(bag.len(), 3);
    /// ```
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.weight()
    }

    /// Returns `true` if the bag contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the bag, removing all elements. The branching order is kept.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns a reference to the first (minimum) element, if any.
    ///
    /// # Complexity
    ///
    /// O(1) - uses the cached leftmost leaf.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.raw.first().map(|(element, _)| element)
    }

    /// Returns a reference to the last (maximum) element, if any.
    ///
    /// # Complexity
    ///
    /// O(1) - uses the cached rightmost leaf.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.raw.last().map(|(element, _)| element)
    }

    /// Gets an iterator over the elements of the bag, in sorted order with
    /// equal elements adjacent and in insertion order.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedBag;
    ///
    /// let bag = RankedBag::from([2, 1, 2]);
    /// let elements: Vec<_> = bag.iter().copied().collect();
    /// assert_eq!(elements, [1, 2, 2]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T, C> {
        Iter { inner: RawIter::all(&self.raw) }
    }

    /// Returns the element at rank `index` in sorted order, or `None` if
    /// `index` is out of bounds. Duplicates occupy consecutive ranks.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedBag;
    ///
    /// let bag = RankedBag::from([3, 5, 5, 7]);
    /// assert_eq!(bag.get_index(1), Some(&5));
    /// assert_eq!(bag.get_index(2), Some(&5));
    /// assert_eq!(bag.get_index(4), None);
    /// ```
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&T> {
        self.raw.entry_at(index).map(|(element, _)| element)
    }

    /// Returns a cursor parked before the first element.
    ///
    /// Cursors borrow nothing; any structural mutation of the bag makes
    /// stepping fail with
    /// [`Error::StaleCursor`](crate::Error::StaleCursor).
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.raw.cursor_front()
    }

    /// Returns a cursor parked after the last element.
    #[must_use]
    pub fn cursor_back(&self) -> Cursor {
        self.raw.cursor_back()
    }

    /// Yields the element after `cursor` and advances it, or `Ok(None)` at
    /// the end.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleCursor`](crate::Error::StaleCursor) if the bag
    /// has been structurally mutated since the cursor was created.
    pub fn cursor_next(&self, cursor: &mut Cursor) -> Result<Option<&T>> {
        Ok(self.raw.cursor_next(cursor)?.map(|(element, _)| element))
    }

    /// Yields the element before `cursor` and moves it back, or `Ok(None)`
    /// at the front.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleCursor`](crate::Error::StaleCursor) if the bag
    /// has been structurally mutated since the cursor was created.
    pub fn cursor_prev(&self, cursor: &mut Cursor) -> Result<Option<&T>> {
        Ok(self.raw.cursor_prev(cursor)?.map(|(element, _)| element))
    }
}

impl<T: Clone, C: Comparator<T>> RankedBag<T, C> {
    /// Adds a value to the bag, keeping any equal values already present.
    ///
    /// The new value lands after every equal one, so equal elements come
    /// back out in insertion order.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedBag;
    ///
    /// let mut bag = RankedBag::new();
    /// bag.insert(5);
    /// bag.insert(5);
    /// assert_eq!(bag.count(&5), 2);
    /// ```
    pub fn insert(&mut self, value: T) {
        self.raw.insert_rightmost(value, ());
    }

    /// Returns `true` if the bag contains at least one element equal to
    /// `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedBag;
    ///
    /// let bag = RankedBag::from([1, 2, 2]);
    /// assert!(bag.contains(&2));
    /// assert!(!bag.contains(&3));
    /// ```
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.raw.find(value).is_some()
    }

    /// Returns how many elements equal `value`.
    ///
    /// Computed as the difference of the two rank bounds, so the cost stays
    /// O(log n) however large the multiplicity.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedBag;
    ///
    /// let bag = RankedBag::from([3, 5, 5, 7]);
    /// assert_eq!(bag.count(&5), 2);
    /// assert_eq!(bag.count(&4), 0);
    /// ```
    #[must_use]
    pub fn count(&self, value: &T) -> usize {
        self.raw.rank_upper_bound(value) - self.raw.rank_lower_bound(value)
    }

    /// Removes and returns the leftmost element equal to `value`, the oldest
    /// of its duplicates.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedBag;
    ///
    /// let mut bag = RankedBag::from([5, 5]);
    /// assert_eq!(bag.remove_one(&5), Some(5));
    /// assert_eq!(bag.count(&5), 1);
    /// assert_eq!(bag.remove_one(&7), None);
    /// ```
    pub fn remove_one(&mut self, value: &T) -> Option<T> {
        self.raw.remove_first_match(value, |_| true).map(|(element, ())| element)
    }

    /// Removes every element equal to `value`, returning how many went.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedBag;
    ///
    /// let mut bag = RankedBag::from([1, 2, 2, 3]);
    /// assert_eq!(bag.remove_all(&2), 2);
    /// assert_eq!(bag.remove_all(&2), 0);
    /// assert_eq!(bag.len(), 2);
    /// ```
    pub fn remove_all(&mut self, value: &T) -> usize {
        self.raw.remove_all(value)
    }

    /// Removes and returns the first (minimum) element, if any. Among equal
    /// minima the oldest goes first.
    pub fn pop_first(&mut self) -> Option<T> {
        self.raw.remove_index(0).map(|(element, ())| element)
    }

    /// Removes and returns the last (maximum) element, if any.
    pub fn pop_last(&mut self) -> Option<T> {
        let last = self.len().checked_sub(1)?;
        self.raw.remove_index(last).map(|(element, ())| element)
    }

    /// Returns the zero-based rank of the first element equal to `value`, or
    /// `None` if there is none.
    ///
    /// The rank is the number of strictly smaller elements, so the ranks
    /// `rank_of(&v)..rank_of(&v) + count(&v)` all hold `v`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedBag;
    ///
    /// let bag = RankedBag::from([3, 5, 5, 7]);
    /// assert_eq!(bag.rank_of(&5), Some(1));
    /// assert_eq!(bag.rank_of(&7), Some(3));
    /// assert_eq!(bag.rank_of(&6), None);
    /// ```
    #[must_use]
    pub fn rank_of(&self, value: &T) -> Option<usize> {
        let rank = self.raw.rank_lower_bound(value);
        (rank < self.raw.rank_upper_bound(value)).then_some(rank)
    }

    /// Recomputes every structural invariant from scratch and returns the
    /// violations found; an empty list means a healthy bag.
    #[must_use]
    pub fn check_invariants(&self) -> Vec<String> {
        self.raw.check_invariants()
    }
}

impl<T: Clone, C: Clone> Clone for RankedBag<T, C> {
    fn clone(&self) -> Self {
        RankedBag { raw: self.raw.clone() }
    }
}

impl<T: PartialEq, C> PartialEq for RankedBag<T, C> {
    fn eq(&self, other: &RankedBag<T, C>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, C> Eq for RankedBag<T, C> {}

impl<T: fmt::Debug, C> fmt::Debug for RankedBag<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C: Default> Default for RankedBag<T, C> {
    /// Creates an empty bag ordered by the default comparator.
    fn default() -> RankedBag<T, C> {
        RankedBag::with_comparator(C::default())
    }
}

impl<T: Clone, C: Comparator<T> + Default> FromIterator<T> for RankedBag<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> RankedBag<T, C> {
        let mut bag = RankedBag::with_comparator(C::default());
        bag.extend(iter);
        bag
    }
}

impl<T: Clone, C: Comparator<T>> Extend<T> for RankedBag<T, C> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(move |element| {
            self.insert(element);
        });
    }
}

impl<'a, T: Copy, C: Comparator<T>> Extend<&'a T> for RankedBag<T, C> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T: Ord + Clone, const N: usize> From<[T; N]> for RankedBag<T> {
    /// Converts a `[T; N]` into a `RankedBag<T>`, keeping duplicates.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_tree::RankedBag;
    ///
    /// let bag = RankedBag::from([1, 2, 2]);
    /// assert_eq!(bag.count(&2), 2);
    /// ```
    fn from(arr: [T; N]) -> RankedBag<T> {
        arr.into_iter().collect()
    }
}

impl<'a, T, C> IntoIterator for &'a RankedBag<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, C>;

    fn into_iter(self) -> Iter<'a, T, C> {
        self.iter()
    }
}

impl<T, C> IntoIterator for RankedBag<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Consumes the bag into an iterator over its elements, in sorted order.
    ///
    /// The elements are drained along the leaf chain in one O(n) pass.
    fn into_iter(mut self) -> IntoIter<T> {
        IntoIter { inner: self.raw.drain_to_vec().into_iter() }
    }
}

/// Indexes the bag by rank, the position in sorted order.
///
/// # Panics
///
/// Panics if the rank is out of bounds.
///
/// # Examples
///
/// ```
/// use ranked_tree::{Rank, RankedBag};
///
/// let bag = RankedBag::from([3, 5, 5, 7]);
/// assert_eq!(bag[Rank(2)], 5);
/// ```
impl<T, C> Index<Rank> for RankedBag<T, C> {
    type Output = T;

    fn index(&self, rank: Rank) -> &T {
        self.get_index(rank.0).expect("index out of bounds")
    }
}

impl<'a, T, C> Iterator for Iter<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next().map(|(element, _)| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.inner.len(), Some(self.inner.len()))
    }
}

impl<'a, T, C> DoubleEndedIterator for Iter<'a, T, C> {
    fn next_back(&mut self) -> Option<&'a T> {
        self.inner.next_back().map(|(element, _)| element)
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
        self.inner.next().map(|(element, ())| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back().map(|(element, ())| element)
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for IntoIter<T> {}
