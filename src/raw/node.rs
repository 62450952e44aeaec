use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::comparator::Comparator;

use super::handle::Handle;

/// A tree node: branch or leaf.
///
/// Everything here is a pure local mutation over one node's storage. Fill
/// limits, anchor maintenance, and weight propagation across levels are the
/// path engine's job, so nothing in this module knows the tree's order.
#[derive(Clone)]
pub(crate) enum Node<K, V> {
    Branch(Branch<K>),
    Leaf(Leaf<K, V>),
}

/// Routing node: `k` anchor keys and `k + 1` children.
///
/// `keys[i]` is a copy of the leftmost key in the subtree of `children[i + 1]`.
/// `child_weights[i]` caches the entry count of `children[i]`'s subtree and
/// `weight` is their sum, kept current incrementally.
#[derive(Clone)]
pub(crate) struct Branch<K> {
    keys: Vec<K>,
    children: Vec<Handle>,
    child_weights: Vec<usize>,
    weight: usize,
}

/// Terminal node: sorted keys with parallel values, doubly linked to its
/// neighbors in key order.
#[derive(Clone)]
pub(crate) struct Leaf<K, V> {
    keys: Vec<K>,
    values: Vec<V>,
    left: Option<Handle>,
    right: Option<Handle>,
}

impl<K, V> Node<K, V> {
    pub(crate) const fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Entry count of the subtree rooted at this node.
    pub(crate) fn weight(&self) -> usize {
        match self {
            Node::Branch(branch) => branch.weight,
            Node::Leaf(leaf) => leaf.len(),
        }
    }

    pub(crate) fn as_leaf(&self) -> &Leaf<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Branch(_) => panic!("expected a leaf node"),
        }
    }

    pub(crate) fn as_leaf_mut(&mut self) -> &mut Leaf<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Branch(_) => panic!("expected a leaf node"),
        }
    }

    pub(crate) fn as_branch(&self) -> &Branch<K> {
        match self {
            Node::Branch(branch) => branch,
            Node::Leaf(_) => panic!("expected a branch node"),
        }
    }

    pub(crate) fn as_branch_mut(&mut self) -> &mut Branch<K> {
        match self {
            Node::Branch(branch) => branch,
            Node::Leaf(_) => panic!("expected a branch node"),
        }
    }

    pub(crate) fn into_leaf(self) -> Leaf<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Branch(_) => panic!("expected a leaf node"),
        }
    }

    pub(crate) fn into_branch(self) -> Branch<K> {
        match self {
            Node::Branch(branch) => branch,
            Node::Leaf(_) => panic!("expected a branch node"),
        }
    }
}

impl<K> Branch<K> {
    /// A branch over exactly two subtrees, used when the root splits.
    pub(crate) fn new_root(
        anchor: K,
        left: Handle,
        right: Handle,
        left_weight: usize,
        right_weight: usize,
    ) -> Self {
        let mut keys = Vec::with_capacity(1);
        keys.push(anchor);
        let mut children = Vec::with_capacity(2);
        children.push(left);
        children.push(right);
        let mut child_weights = Vec::with_capacity(2);
        child_weights.push(left_weight);
        child_weights.push(right_weight);
        Self { keys, children, child_weights, weight: left_weight + right_weight }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    /// Rewrites an anchor in place; used by pivot updates.
    pub(crate) fn set_key(&mut self, index: usize, key: K) {
        self.keys[index] = key;
    }

    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    pub(crate) fn child_weight(&self, index: usize) -> usize {
        self.child_weights[index]
    }

    /// Sum of the cached weights of the children left of `child_index`.
    pub(crate) fn weight_before(&self, child_index: usize) -> usize {
        self.child_weights[..child_index].iter().sum()
    }

    pub(crate) const fn weight(&self) -> usize {
        self.weight
    }

    /// Adds entries to one child's cached weight (and to this branch's total).
    pub(crate) fn add_weight(&mut self, child_index: usize, count: usize) {
        self.child_weights[child_index] += count;
        self.weight += count;
    }

    /// Removes entries from one child's cached weight (and from this branch's
    /// total).
    pub(crate) fn sub_weight(&mut self, child_index: usize, count: usize) {
        self.child_weights[child_index] -= count;
        self.weight -= count;
    }

    /// Inserts a new child at `child_index` (>= 1) with `anchor` separating it
    /// from its left neighbor.
    pub(crate) fn insert_child(
        &mut self,
        child_index: usize,
        anchor: K,
        child: Handle,
        weight: usize,
    ) {
        debug_assert!(child_index >= 1);
        self.keys.insert(child_index - 1, anchor);
        self.children.insert(child_index, child);
        self.child_weights.insert(child_index, weight);
        self.weight += weight;
    }

    /// Removes the child at `child_index` (>= 1) and the anchor that routed
    /// to it. Returns the removed child's cached weight.
    pub(crate) fn remove_child(&mut self, child_index: usize) -> usize {
        debug_assert!(child_index >= 1);
        self.keys.remove(child_index - 1);
        self.children.remove(child_index);
        let removed = self.child_weights.remove(child_index);
        self.weight -= removed;
        removed
    }

    /// Removes the first child. Returns it along with its cached weight and
    /// the first anchor, which routed to the *second* child and now describes
    /// this branch's new leftmost subtree.
    pub(crate) fn pop_front_child(&mut self) -> (Handle, usize, K) {
        debug_assert!(!self.keys.is_empty());
        let child = self.children.remove(0);
        let weight = self.child_weights.remove(0);
        self.weight -= weight;
        (child, weight, self.keys.remove(0))
    }

    /// Appends a child, anchored by `anchor`.
    pub(crate) fn push_child(&mut self, anchor: K, child: Handle, weight: usize) {
        self.keys.push(anchor);
        self.children.push(child);
        self.child_weights.push(weight);
        self.weight += weight;
    }

    /// Splits off the children from `at_child` onward into a new right
    /// branch, returning it with the promoted anchor that separated the two
    /// halves.
    pub(crate) fn split(&mut self, at_child: usize) -> (K, Self) {
        debug_assert!(at_child >= 1 && at_child < self.children.len());
        let right_keys: Vec<K> = self.keys.drain(at_child..).collect();
        let promoted = self.keys.remove(at_child - 1);
        let right_children: Vec<Handle> = self.children.drain(at_child..).collect();
        let right_weights: Vec<usize> = self.child_weights.drain(at_child..).collect();
        let right_weight = right_weights.iter().sum();
        self.weight -= right_weight;
        (
            promoted,
            Self {
                keys: right_keys,
                children: right_children,
                child_weights: right_weights,
                weight: right_weight,
            },
        )
    }

    /// Absorbs an entire right sibling, with `pivot` (the anchor that
    /// separated the two) rotated down between them.
    pub(crate) fn absorb(&mut self, pivot: K, right: Self) {
        self.keys.push(pivot);
        self.keys.extend(right.keys);
        self.children.extend(right.children);
        self.child_weights.extend(right.child_weights);
        self.weight += right.weight;
    }

    /// Child to descend into for the *first* position not less than `key`.
    pub(crate) fn route_leftmost<C: Comparator<K>>(&self, cmp: &C, key: &K) -> usize {
        self.keys.partition_point(|anchor| cmp.cmp(anchor, key) == Ordering::Less)
    }

    /// Child to descend into for the first position *greater* than `key`.
    /// With unique keys this is also the exact-match route, since an anchor
    /// equal to the key names the leftmost key of the child it routes to.
    pub(crate) fn route_rightmost<C: Comparator<K>>(&self, cmp: &C, key: &K) -> usize {
        self.keys.partition_point(|anchor| cmp.cmp(anchor, key) != Ordering::Greater)
    }
}

impl<K, V> Leaf<K, V> {
    pub(crate) const fn empty() -> Self {
        Self { keys: Vec::new(), values: Vec::new(), left: None, right: None }
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    pub(crate) fn first_key(&self) -> &K {
        &self.keys[0]
    }

    pub(crate) fn entry(&self, index: usize) -> (&K, &V) {
        (&self.keys[index], &self.values[index])
    }

    /// Shared key, mutable value. Keys are never handed out mutably; editing
    /// one would break the sort order around it.
    pub(crate) fn entry_mut(&mut self, index: usize) -> (&K, &mut V) {
        (&self.keys[index], &mut self.values[index])
    }

    pub(crate) fn value(&self, index: usize) -> &V {
        &self.values[index]
    }

    pub(crate) fn value_mut(&mut self, index: usize) -> &mut V {
        &mut self.values[index]
    }

    pub(crate) fn replace_value(&mut self, index: usize, value: V) -> V {
        core::mem::replace(&mut self.values[index], value)
    }

    pub(crate) const fn left(&self) -> Option<Handle> {
        self.left
    }

    pub(crate) const fn right(&self) -> Option<Handle> {
        self.right
    }

    pub(crate) const fn set_left(&mut self, left: Option<Handle>) {
        self.left = left;
    }

    pub(crate) const fn set_right(&mut self, right: Option<Handle>) {
        self.right = right;
    }

    pub(crate) fn insert(&mut self, index: usize, key: K, value: V) {
        self.keys.insert(index, key);
        self.values.insert(index, value);
    }

    pub(crate) fn remove(&mut self, index: usize) -> (K, V) {
        (self.keys.remove(index), self.values.remove(index))
    }

    /// Splits off the entries from `at` onward into a new unlinked leaf.
    pub(crate) fn split_off(&mut self, at: usize) -> Self {
        Self {
            keys: self.keys.split_off(at),
            values: self.values.split_off(at),
            left: None,
            right: None,
        }
    }

    /// Splits off the entries before `at` into a new unlinked leaf, keeping
    /// the tail. Used when a sibling donates its front entries.
    pub(crate) fn split_front(&mut self, at: usize) -> Self {
        Self {
            keys: self.keys.drain(..at).collect(),
            values: self.values.drain(..at).collect(),
            left: None,
            right: None,
        }
    }

    /// Appends every entry of a consumed right sibling.
    pub(crate) fn absorb(&mut self, right: Self) {
        self.keys.extend(right.keys);
        self.values.extend(right.values);
    }

    pub(crate) fn into_entries(self) -> impl Iterator<Item = (K, V)> {
        self.keys.into_iter().zip(self.values)
    }

    /// Binary search: `Ok(index)` when found, `Err(insertion point)` when not.
    pub(crate) fn search<C: Comparator<K>>(&self, cmp: &C, key: &K) -> Result<usize, usize> {
        self.keys.binary_search_by(|probe| cmp.cmp(probe, key))
    }

    /// Index of the first key not less than `key` (may equal `len()`).
    pub(crate) fn lower_bound<C: Comparator<K>>(&self, cmp: &C, key: &K) -> usize {
        self.keys.partition_point(|probe| cmp.cmp(probe, key) == Ordering::Less)
    }

    /// Index of the first key greater than `key` (may equal `len()`).
    pub(crate) fn upper_bound<C: Comparator<K>>(&self, cmp: &C, key: &K) -> usize {
        self.keys.partition_point(|probe| cmp.cmp(probe, key) != Ordering::Greater)
    }
}
