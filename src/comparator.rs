use core::cmp::Ordering;

/// A strict total order over keys of type `K`.
///
/// Every container in this crate carries a comparator as a type parameter,
/// defaulting to [`NaturalOrder`]. Closures of type
/// `Fn(&K, &K) -> Ordering` implement this trait, so an ad-hoc ordering can
/// be supplied without a named type:
///
/// ```
/// use ranked_tree::RankedSet;
///
/// let mut descending = RankedSet::with_comparator(|a: &i32, b: &i32| b.cmp(a));
/// descending.insert(1);
/// descending.insert(3);
/// descending.insert(2);
/// assert_eq!(descending.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
/// ```
///
/// The comparator must be a strict total order. Behavior is unspecified (but
/// memory-safe) if it is not: entries may become unreachable or appear out of
/// order.
pub trait Comparator<K: ?Sized> {
    /// Compares two keys.
    fn cmp(&self, lhs: &K, rhs: &K) -> Ordering;
}

/// The default comparator: the key type's own [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    #[inline]
    fn cmp(&self, lhs: &K, rhs: &K) -> Ordering {
        lhs.cmp(rhs)
    }
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn cmp(&self, lhs: &K, rhs: &K) -> Ordering {
        self(lhs, rhs)
    }
}
