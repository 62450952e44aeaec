/// A zero-based position in the sorted order of a container.
///
/// Wrapping the position in a newtype keeps positional indexing visibly
/// distinct from key lookup at the call site.
///
/// # Examples
///
/// ```
/// use ranked_tree::{Rank, RankedMap};
///
/// let mut map = RankedMap::new();
/// map.insert("a", 10);
/// map.insert("b", 20);
///
/// assert_eq!(map[Rank(0)], 10);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);
