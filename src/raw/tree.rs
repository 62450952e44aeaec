use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::ops::{Bound, RangeBounds};

use crate::comparator::Comparator;
use crate::error::{Error, Result};

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Leaf, Node};
use super::path::{Bias, Path};

/// Smallest accepted branching order.
pub const MIN_ORDER: usize = 4;

/// Largest accepted branching order.
pub const MAX_ORDER: usize = 256;

/// Branching order every container starts with. A node then holds up to
/// `DEFAULT_ORDER - 1` keys.
pub const DEFAULT_ORDER: usize = 128;

/// The order-statistic B+ tree backing every container in this crate.
///
/// Entries live in leaves chained in key order; branches route by anchor
/// keys (copies of subtree-leftmost keys) and cache per-child subtree
/// weights, which is what makes rank queries logarithmic. The containers own
/// duplicate-vs-unique semantics; the tree itself never rejects a key.
#[derive(Clone)]
pub(crate) struct RawTree<K, V, C> {
    pub(super) nodes: Arena<Node<K, V>>,
    pub(super) root: Handle,
    pub(super) leftmost: Handle,
    pub(super) rightmost: Handle,
    pub(super) order: usize,
    pub(super) stage: u64,
    pub(super) cmp: C,
}

/// A detached position inside a container, usable across separate borrows.
///
/// A cursor records the container's stage when created; any structural
/// mutation afterwards makes every stepping call fail with
/// [`Error::StaleCursor`](crate::Error::StaleCursor) until a fresh cursor is
/// made. In-place value replacement does not invalidate cursors.
#[derive(Clone, Copy, Debug)]
pub struct Cursor {
    stage: u64,
    /// Entry immediately after the cursor's gap; `None` past the last entry.
    ahead: Option<(Handle, usize)>,
}

impl<K, V, C> RawTree<K, V, C> {
    /// An empty tree at [`DEFAULT_ORDER`]. The root starts as (and, when the
    /// tree drains, returns to being) a lone empty leaf.
    pub(crate) fn new(cmp: C) -> Self {
        let mut nodes = Arena::new();
        let root = nodes.alloc(Node::Leaf(Leaf::empty()));
        Self { nodes, root, leftmost: root, rightmost: root, order: DEFAULT_ORDER, stage: 0, cmp }
    }

    /// An empty tree with a caller-chosen branching order.
    pub(crate) fn with_order(order: usize, cmp: C) -> Result<Self> {
        if (MIN_ORDER..=MAX_ORDER).contains(&order) {
            let mut tree = Self::new(cmp);
            tree.order = order;
            Ok(tree)
        } else {
            Err(Error::OrderOutOfRange(order))
        }
    }

    /// Total number of entries.
    pub(crate) fn weight(&self) -> usize {
        self.nodes.get(self.root).weight()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.weight() == 0
    }

    pub(crate) const fn order(&self) -> usize {
        self.order
    }

    /// Changes the branching order. Only an empty tree can change shape, and
    /// only within `[MIN_ORDER, MAX_ORDER]`.
    pub(crate) fn set_order(&mut self, order: usize) -> Result<()> {
        if !(MIN_ORDER..=MAX_ORDER).contains(&order) {
            Err(Error::OrderOutOfRange(order))
        } else if self.is_empty() {
            self.order = order;
            self.stage += 1;
            Ok(())
        } else {
            Err(Error::OrderLocked)
        }
    }

    pub(crate) fn leaf(&self, handle: Handle) -> &Leaf<K, V> {
        self.nodes.get(handle).as_leaf()
    }

    pub(crate) const fn max_keys(&self) -> usize {
        self.order - 1
    }

    pub(crate) const fn min_leaf_keys(&self) -> usize {
        (self.order - 1).div_ceil(2)
    }

    pub(crate) const fn min_branch_keys(&self) -> usize {
        self.order.div_ceil(2) - 1
    }

    /// Drops every entry, resetting to a lone empty root leaf. The arena is
    /// released wholesale; no per-node walk.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        let root = self.nodes.alloc(Node::Leaf(Leaf::empty()));
        self.root = root;
        self.leftmost = root;
        self.rightmost = root;
        self.stage += 1;
    }

    /// Empties the tree in one pass, returning the entries in order. Walks
    /// the leaf chain instead of rebalancing per removal.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let mut entries = Vec::with_capacity(self.weight());
        let mut current = Some(self.leftmost);
        while let Some(handle) = current {
            let leaf = self.nodes.take(handle).into_leaf();
            current = leaf.right();
            entries.extend(leaf.into_entries());
        }
        self.clear();
        entries
    }

    pub(crate) fn first(&self) -> Option<(&K, &V)> {
        let leaf = self.nodes.get(self.leftmost).as_leaf();
        (!leaf.is_empty()).then(|| leaf.entry(0))
    }

    pub(crate) fn last(&self) -> Option<(&K, &V)> {
        let leaf = self.nodes.get(self.rightmost).as_leaf();
        (!leaf.is_empty()).then(|| leaf.entry(leaf.len() - 1))
    }

    /// Leaf position of the entry at global rank `index`, by weight descent.
    /// No comparisons; the caller guarantees `index < weight`.
    pub(super) fn leaf_at_index(&self, mut index: usize) -> (Handle, usize) {
        debug_assert!(index < self.weight());
        let mut current = self.root;
        loop {
            match self.nodes.get(current) {
                Node::Branch(branch) => {
                    let mut child = 0;
                    while index >= branch.child_weight(child) {
                        index -= branch.child_weight(child);
                        child += 1;
                    }
                    current = branch.child(child);
                }
                Node::Leaf(_) => return (current, index),
            }
        }
    }

    /// Entry at global rank `index`.
    pub(crate) fn entry_at(&self, index: usize) -> Option<(&K, &V)> {
        if index >= self.weight() {
            return None;
        }
        let (handle, slot) = self.leaf_at_index(index);
        Some(self.nodes.get(handle).as_leaf().entry(slot))
    }

    /// Entry at global rank `index`, value borrowed mutably.
    pub(crate) fn entry_at_mut(&mut self, index: usize) -> Option<(&K, &mut V)> {
        if index >= self.weight() {
            return None;
        }
        let (handle, slot) = self.leaf_at_index(index);
        Some(self.nodes.get_mut(handle).as_leaf_mut().entry_mut(slot))
    }

    /// Swaps the value at an occupied slot, leaving the structure (and the
    /// stage) untouched.
    pub(crate) fn replace_at(&mut self, handle: Handle, slot: usize, value: V) -> V {
        self.nodes.get_mut(handle).as_leaf_mut().replace_value(slot, value)
    }

    /// The entry after `(handle, slot)` in key order, following the chain
    /// across leaf boundaries.
    pub(crate) fn entry_after(&self, handle: Handle, slot: usize) -> Option<(Handle, usize)> {
        let leaf = self.nodes.get(handle).as_leaf();
        if slot + 1 < leaf.len() {
            Some((handle, slot + 1))
        } else {
            leaf.right().map(|next| (next, 0))
        }
    }

    /// The entry before the given position, where `None` means one past the
    /// end. Returns `None` once the front is passed.
    pub(crate) fn entry_before(&self, position: Option<(Handle, usize)>) -> Option<(Handle, usize)> {
        match position {
            None => {
                let leaf = self.nodes.get(self.rightmost).as_leaf();
                (!leaf.is_empty()).then(|| (self.rightmost, leaf.len() - 1))
            }
            Some((handle, 0)) => {
                let prev = self.nodes.get(handle).as_leaf().left()?;
                Some((prev, self.nodes.get(prev).as_leaf().len() - 1))
            }
            Some((handle, slot)) => Some((handle, slot - 1)),
        }
    }

    /// A cursor parked in the gap before the first entry.
    pub(crate) fn cursor_front(&self) -> Cursor {
        let leaf = self.nodes.get(self.leftmost).as_leaf();
        let ahead = (!leaf.is_empty()).then_some((self.leftmost, 0));
        Cursor { stage: self.stage, ahead }
    }

    /// A cursor parked in the gap after the last entry.
    pub(crate) const fn cursor_back(&self) -> Cursor {
        Cursor { stage: self.stage, ahead: None }
    }

    fn cursor_check(&self, cursor: &Cursor) -> Result<()> {
        if cursor.stage == self.stage { Ok(()) } else { Err(Error::StaleCursor) }
    }

    /// Yields the entry after the cursor's gap and moves the gap over it.
    pub(crate) fn cursor_next(&self, cursor: &mut Cursor) -> Result<Option<(&K, &V)>> {
        self.cursor_check(cursor)?;
        let Some((handle, slot)) = cursor.ahead else {
            return Ok(None);
        };
        cursor.ahead = self.entry_after(handle, slot);
        Ok(Some(self.nodes.get(handle).as_leaf().entry(slot)))
    }

    /// Yields the entry before the cursor's gap and moves the gap back over
    /// it.
    pub(crate) fn cursor_prev(&self, cursor: &mut Cursor) -> Result<Option<(&K, &V)>> {
        self.cursor_check(cursor)?;
        let Some((handle, slot)) = self.entry_before(cursor.ahead) else {
            return Ok(None);
        };
        cursor.ahead = Some((handle, slot));
        Ok(Some(self.nodes.get(handle).as_leaf().entry(slot)))
    }
}

impl<K: Clone, V, C: Comparator<K>> RawTree<K, V, C> {
    /// Finds an exact match for `key` under unique-key semantics.
    ///
    /// Routes with rightmost bias: an anchor equal to the key names the
    /// leftmost key of the child right of it, so equal anchors must descend
    /// right or an exact match sitting at a leaf's front would be missed.
    pub(crate) fn find(&self, key: &K) -> Option<(Handle, usize)> {
        let mut current = self.root;
        loop {
            match self.nodes.get(current) {
                Node::Branch(branch) => {
                    current = branch.child(branch.route_rightmost(&self.cmp, key));
                }
                Node::Leaf(leaf) => {
                    return match leaf.search(&self.cmp, key) {
                        Ok(slot) => Some((current, slot)),
                        Err(_) => None,
                    };
                }
            }
        }
    }

    pub(crate) fn find_value_mut(&mut self, key: &K) -> Option<&mut V> {
        let (handle, slot) = self.find(key)?;
        Some(self.nodes.get_mut(handle).as_leaf_mut().value_mut(slot))
    }

    /// Rank of an exact, unique match for `key`.
    pub(crate) fn rank_of(&self, key: &K) -> Option<usize> {
        let mut rank = 0;
        let mut current = self.root;
        loop {
            match self.nodes.get(current) {
                Node::Branch(branch) => {
                    let child = branch.route_rightmost(&self.cmp, key);
                    rank += branch.weight_before(child);
                    current = branch.child(child);
                }
                Node::Leaf(leaf) => {
                    return match leaf.search(&self.cmp, key) {
                        Ok(slot) => Some(rank + slot),
                        Err(_) => None,
                    };
                }
            }
        }
    }

    /// Number of entries strictly less than `key`: the rank the key's first
    /// occurrence has, or would take on insertion.
    pub(crate) fn rank_lower_bound(&self, key: &K) -> usize {
        let mut rank = 0;
        let mut current = self.root;
        loop {
            match self.nodes.get(current) {
                Node::Branch(branch) => {
                    let child = branch.route_leftmost(&self.cmp, key);
                    rank += branch.weight_before(child);
                    current = branch.child(child);
                }
                Node::Leaf(leaf) => return rank + leaf.lower_bound(&self.cmp, key),
            }
        }
    }

    /// Number of entries not greater than `key`. The difference from
    /// [`Self::rank_lower_bound`] is the key's multiplicity.
    pub(crate) fn rank_upper_bound(&self, key: &K) -> usize {
        let mut rank = 0;
        let mut current = self.root;
        loop {
            match self.nodes.get(current) {
                Node::Branch(branch) => {
                    let child = branch.route_rightmost(&self.cmp, key);
                    rank += branch.weight_before(child);
                    current = branch.child(child);
                }
                Node::Leaf(leaf) => return rank + leaf.upper_bound(&self.cmp, key),
            }
        }
    }

    /// Resolves `range` to the half-open window of ranks it covers.
    ///
    /// # Panics
    ///
    /// Panics if the start bound exceeds the end bound, or if both bounds are
    /// `Excluded` and equal, mirroring the standard library's range contract.
    pub(crate) fn rank_window<R: RangeBounds<K>>(&self, range: &R) -> (usize, usize) {
        if let (Bound::Included(low) | Bound::Excluded(low), Bound::Included(high) | Bound::Excluded(high)) =
            (range.start_bound(), range.end_bound())
        {
            match self.cmp.cmp(low, high) {
                Ordering::Greater => panic!("range start is greater than range end"),
                Ordering::Equal
                    if matches!(range.start_bound(), Bound::Excluded(_))
                        && matches!(range.end_bound(), Bound::Excluded(_)) =>
                {
                    panic!("range start and end are equal and excluded")
                }
                _ => {}
            }
        }
        let start = match range.start_bound() {
            Bound::Included(key) => self.rank_lower_bound(key),
            Bound::Excluded(key) => self.rank_upper_bound(key),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(key) => self.rank_upper_bound(key),
            Bound::Excluded(key) => self.rank_lower_bound(key),
            Bound::Unbounded => self.weight(),
        };
        (start, end)
    }

    /// Writes `key`/`value` at `slot` of the path's leaf, splitting on
    /// overflow. The caller guarantees the slot is the comparator-correct
    /// position in a current path.
    pub(crate) fn insert_at(&mut self, path: Path, slot: usize, key: K, value: V) {
        self.stage += 1;
        let tip = path.tip();
        self.nodes.get_mut(tip).as_leaf_mut().insert(slot, key, value);
        self.add_weights(path.frames(), 1);

        let len = self.nodes.get(tip).as_leaf().len();
        if len <= self.max_keys() {
            return;
        }

        // An append onto the rightmost leaf splits at the tail, keeping the
        // left side full; interior inserts split at the midpoint so both
        // halves meet minimum fill.
        let appending = slot + 1 == len && self.nodes.get(tip).as_leaf().right().is_none();
        let at = if appending { len - 1 } else { len.div_ceil(2) };

        let old_right = self.nodes.get(tip).as_leaf().right();
        let mut right = self.nodes.get_mut(tip).as_leaf_mut().split_off(at);
        right.set_left(Some(tip));
        right.set_right(old_right);
        let anchor = right.first_key().clone();
        let right_handle = self.nodes.alloc(Node::Leaf(right));
        self.nodes.get_mut(tip).as_leaf_mut().set_right(Some(right_handle));
        match old_right {
            Some(next) => self.nodes.get_mut(next).as_leaf_mut().set_left(Some(right_handle)),
            None => self.rightmost = right_handle,
        }
        self.promote(path.into_frames(), anchor, right_handle, appending);
    }

    /// Removes and returns the entry at `slot` of the path's leaf. The
    /// caller guarantees the slot is occupied in a current path.
    pub(crate) fn remove_at(&mut self, path: Path, slot: usize) -> (K, V) {
        self.stage += 1;
        let tip = path.tip();
        let entry = self.nodes.get_mut(tip).as_leaf_mut().remove(slot);
        self.sub_weights(path.frames(), 1);

        let len = self.nodes.get(tip).as_leaf().len();
        if len == 0 {
            let Some(prev) = self.nodes.get(tip).as_leaf().left() else {
                // The lone leaf of a now-empty tree stays as the root.
                return entry;
            };
            // Only the rightmost leaf can drain; prune it from the chain.
            self.nodes.get_mut(prev).as_leaf_mut().set_right(None);
            self.rightmost = prev;
            self.nodes.free(tip);
            self.demote(path.into_frames());
            return entry;
        }

        if slot == 0 {
            let first = self.nodes.get(tip).as_leaf().first_key().clone();
            self.set_pivot(path.frames(), first);
        }
        if len < self.min_leaf_keys() && self.nodes.get(tip).as_leaf().right().is_some() {
            self.rebalance_leaf(path);
        }
        entry
    }

    /// Unique-key insert: replaces the value in place when `key` is already
    /// present and returns the previous value.
    pub(crate) fn insert_unique(&mut self, key: K, value: V) -> Option<V> {
        let path = self.descend(&key, Bias::Rightmost);
        match self.nodes.get(path.tip()).as_leaf().search(&self.cmp, &key) {
            Ok(slot) => Some(self.replace_at(path.tip(), slot, value)),
            Err(slot) => {
                self.insert_at(path, slot, key, value);
                None
            }
        }
    }

    /// Duplicate-friendly insert: lands after every equal key, preserving
    /// insertion order among equals.
    pub(crate) fn insert_rightmost(&mut self, key: K, value: V) {
        let path = self.descend(&key, Bias::Rightmost);
        let slot = self.nodes.get(path.tip()).as_leaf().upper_bound(&self.cmp, &key);
        self.insert_at(path, slot, key, value);
    }

    /// Unique-key removal.
    pub(crate) fn remove_key(&mut self, key: &K) -> Option<(K, V)> {
        let path = self.descend(key, Bias::Rightmost);
        match self.nodes.get(path.tip()).as_leaf().search(&self.cmp, key) {
            Ok(slot) => Some(self.remove_at(path, slot)),
            Err(_) => None,
        }
    }

    /// Removes the leftmost entry equal to `key` whose value satisfies
    /// `is_match`, scanning the run of equal keys in order.
    pub(crate) fn remove_first_match(
        &mut self,
        key: &K,
        mut is_match: impl FnMut(&V) -> bool,
    ) -> Option<(K, V)> {
        let mut path = self.descend(key, Bias::Leftmost);
        let mut slot = self.nodes.get(path.tip()).as_leaf().lower_bound(&self.cmp, key);
        loop {
            if slot == self.nodes.get(path.tip()).as_leaf().len() {
                if !self.step_right(&mut path) {
                    return None;
                }
                slot = 0;
            }
            let leaf = self.nodes.get(path.tip()).as_leaf();
            if self.cmp.cmp(leaf.key(slot), key) != Ordering::Equal {
                return None;
            }
            if is_match(leaf.value(slot)) {
                return Some(self.remove_at(path, slot));
            }
            slot += 1;
        }
    }

    /// Removes every entry equal to `key`, returning how many went.
    pub(crate) fn remove_all(&mut self, key: &K) -> usize {
        let mut removed = 0;
        while self.remove_first_match(key, |_| true).is_some() {
            removed += 1;
        }
        removed
    }

    /// Removes the entry at global rank `index`, if it exists.
    pub(crate) fn remove_index(&mut self, index: usize) -> Option<(K, V)> {
        if index >= self.weight() {
            return None;
        }
        let (path, slot) = self.descend_to_index(index);
        Some(self.remove_at(path, slot))
    }

    /// Recomputes every structural invariant from scratch and reports all
    /// violations found; an empty list means a healthy tree. Diagnostic tool
    /// for tests, never run on production paths.
    pub(crate) fn check_invariants(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut leaves = Vec::new();

        if let Node::Branch(branch) = self.nodes.get(self.root) {
            if branch.key_count() == 0 {
                problems.push(String::from("root branch holds no keys"));
            }
        }

        let summary = self.check_subtree(self.root, true, &mut leaves, &mut problems);
        if self.nodes.len() != summary.nodes {
            problems.push(format!(
                "arena holds {} nodes but {} are reachable",
                self.nodes.len(),
                summary.nodes
            ));
        }

        if leaves.first() != Some(&self.leftmost) {
            problems.push(String::from("leftmost does not name the first leaf"));
        }
        if leaves.last() != Some(&self.rightmost) {
            problems.push(String::from("rightmost does not name the last leaf"));
        }

        let mut chained = Vec::with_capacity(leaves.len());
        let mut prev: Option<Handle> = None;
        let mut current = Some(self.leftmost);
        while let Some(handle) = current {
            let leaf = self.nodes.get(handle).as_leaf();
            if leaf.left() != prev {
                problems.push(format!("leaf {handle:?} back-link skips its predecessor"));
            }
            chained.push(handle);
            if chained.len() > leaves.len() {
                problems.push(String::from("leaf chain is longer than the leaf count"));
                break;
            }
            prev = current;
            current = leaf.right();
        }
        if chained != leaves {
            problems.push(String::from("leaf chain disagrees with in-order descent"));
        }

        problems
    }

    fn check_subtree<'t>(
        &'t self,
        handle: Handle,
        is_rightmost: bool,
        leaves: &mut Vec<Handle>,
        problems: &mut Vec<String>,
    ) -> SubtreeSummary<'t, K> {
        match self.nodes.get(handle) {
            Node::Leaf(leaf) => {
                if leaf.len() > self.max_keys() {
                    problems.push(format!(
                        "leaf {handle:?} holds {} keys, over the maximum {}",
                        leaf.len(),
                        self.max_keys()
                    ));
                }
                if !is_rightmost && leaf.len() < self.min_leaf_keys() {
                    problems.push(format!(
                        "non-rightmost leaf {handle:?} holds {} keys, under the minimum {}",
                        leaf.len(),
                        self.min_leaf_keys()
                    ));
                }
                if is_rightmost && leaf.is_empty() && handle != self.leftmost {
                    problems.push(format!("empty rightmost leaf {handle:?} was not pruned"));
                }
                for i in 1..leaf.len() {
                    if self.cmp.cmp(leaf.key(i - 1), leaf.key(i)) == Ordering::Greater {
                        problems.push(format!("leaf {handle:?} keys out of order at slot {i}"));
                    }
                }
                leaves.push(handle);
                SubtreeSummary {
                    weight: leaf.len(),
                    leaf_depth: 0,
                    first_key: (!leaf.is_empty()).then(|| leaf.first_key()),
                    nodes: 1,
                }
            }
            Node::Branch(branch) => {
                if branch.child_count() != branch.key_count() + 1 {
                    problems.push(format!(
                        "branch {handle:?} holds {} keys but {} children",
                        branch.key_count(),
                        branch.child_count()
                    ));
                }
                if branch.key_count() > self.max_keys() {
                    problems.push(format!(
                        "branch {handle:?} holds {} keys, over the maximum {}",
                        branch.key_count(),
                        self.max_keys()
                    ));
                }
                if !is_rightmost && branch.key_count() < self.min_branch_keys() {
                    problems.push(format!(
                        "non-rightmost branch {handle:?} holds {} keys, under the minimum {}",
                        branch.key_count(),
                        self.min_branch_keys()
                    ));
                }
                for i in 1..branch.key_count() {
                    if self.cmp.cmp(branch.key(i - 1), branch.key(i)) == Ordering::Greater {
                        problems.push(format!("branch {handle:?} keys out of order at slot {i}"));
                    }
                }

                let mut weight = 0;
                let mut nodes = 1;
                let mut depth = None;
                let mut first_key = None;
                for i in 0..branch.child_count() {
                    let child = self.check_subtree(
                        branch.child(i),
                        is_rightmost && i + 1 == branch.child_count(),
                        leaves,
                        problems,
                    );
                    if branch.child_weight(i) != child.weight {
                        problems.push(format!(
                            "branch {handle:?} caches weight {} for child {i}, subtree holds {}",
                            branch.child_weight(i),
                            child.weight
                        ));
                    }
                    weight += child.weight;
                    nodes += child.nodes;
                    match depth {
                        None => depth = Some(child.leaf_depth),
                        Some(depth) if depth != child.leaf_depth => {
                            problems.push(format!(
                                "leaves under branch {handle:?} sit at depths {depth} and {}",
                                child.leaf_depth
                            ));
                        }
                        Some(_) => {}
                    }
                    if i == 0 {
                        first_key = child.first_key;
                    } else {
                        match child.first_key {
                            Some(first)
                                if self.cmp.cmp(branch.key(i - 1), first) == Ordering::Equal => {}
                            _ => problems.push(format!(
                                "branch {handle:?} anchor {} does not name its subtree's first key",
                                i - 1
                            )),
                        }
                    }
                }
                if branch.weight() != weight {
                    problems.push(format!(
                        "branch {handle:?} caches total weight {}, subtree holds {weight}",
                        branch.weight()
                    ));
                }
                SubtreeSummary { weight, leaf_depth: depth.unwrap_or(0) + 1, first_key, nodes }
            }
        }
    }
}

struct SubtreeSummary<'t, K> {
    weight: usize,
    leaf_depth: usize,
    first_key: Option<&'t K>,
    nodes: usize,
}
