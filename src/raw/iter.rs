use super::handle::Handle;
use super::tree::RawTree;

/// Double-ended, exact-size walk over a window of the leaf chain.
///
/// Holds a shared borrow of the tree for its whole lifetime, so the window
/// can never be invalidated mid-walk. Every public container iterator wraps
/// one of these.
pub(crate) struct RawIter<'a, K, V, C> {
    tree: &'a RawTree<K, V, C>,
    front: Option<(Handle, usize)>,
    back: Option<(Handle, usize)>,
    remaining: usize,
}

impl<'a, K, V, C> RawIter<'a, K, V, C> {
    /// Walks every entry in key order.
    pub(crate) fn all(tree: &'a RawTree<K, V, C>) -> Self {
        Self::between(tree, 0, tree.weight())
    }

    /// Walks the entries whose ranks fall in `start..end`.
    pub(crate) fn between(tree: &'a RawTree<K, V, C>, start: usize, end: usize) -> Self {
        debug_assert!(start <= end && end <= tree.weight());
        if start >= end {
            return Self { tree, front: None, back: None, remaining: 0 };
        }
        Self {
            tree,
            front: Some(tree.leaf_at_index(start)),
            back: Some(tree.leaf_at_index(end - 1)),
            remaining: end - start,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.remaining
    }

    pub(crate) fn next(&mut self) -> Option<(&'a K, &'a V)> {
        if self.remaining == 0 {
            return None;
        }
        let (handle, slot) = self.front?;
        self.remaining -= 1;
        self.front = self.tree.entry_after(handle, slot);
        Some(self.tree.leaf(handle).entry(slot))
    }

    pub(crate) fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        if self.remaining == 0 {
            return None;
        }
        let (handle, slot) = self.back?;
        self.remaining -= 1;
        self.back = self.tree.entry_before(Some((handle, slot)));
        Some(self.tree.leaf(handle).entry(slot))
    }
}

// A derive would demand `K: Clone` and friends; the walk itself is plain
// position state over a shared borrow.
impl<K, V, C> Clone for RawIter<'_, K, V, C> {
    fn clone(&self) -> Self {
        Self { tree: self.tree, front: self.front, back: self.back, remaining: self.remaining }
    }
}
