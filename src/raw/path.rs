use smallvec::SmallVec;

use crate::comparator::Comparator;

use super::handle::Handle;
use super::node::{Branch, Node};
use super::tree::RawTree;

/// One level of a root-to-node traversal: the branch visited and the child
/// index taken out of it.
#[derive(Clone, Copy)]
pub(crate) struct Frame {
    pub(crate) node: Handle,
    pub(crate) child: usize,
}

/// Frame stack from the root down to (excluding) a path's tip. Sized for a
/// branching order of 4 over billions of entries without spilling.
pub(crate) type Frames = SmallVec<[Frame; 16]>;

/// Routing bias for key descents when equal keys may span nodes.
///
/// `Leftmost` routes toward the first position not less than the key,
/// `Rightmost` toward the first position greater than it. With unique keys,
/// `Rightmost` is also the exact-match route: an anchor equal to the key
/// names the leftmost key of the child it routes to.
#[derive(Clone, Copy)]
pub(crate) enum Bias {
    Leftmost,
    Rightmost,
}

/// A recorded traversal: ancestor frames plus the node (`tip`) reached.
///
/// Paths are how every structural mutation finds its way back up: split
/// propagation, weight deltas, and pivot rewrites all replay the frames
/// instead of re-descending from the root.
#[derive(Clone)]
pub(crate) struct Path {
    frames: Frames,
    tip: Handle,
}

impl Path {
    pub(crate) fn tip(&self) -> Handle {
        self.tip
    }

    pub(crate) fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub(crate) fn into_frames(self) -> Frames {
        self.frames
    }
}

impl<K: Clone, V, C: Comparator<K>> RawTree<K, V, C> {
    /// Builds the root-to-leaf path routing `key` with the given bias.
    pub(crate) fn descend(&self, key: &K, bias: Bias) -> Path {
        let mut frames = Frames::new();
        let mut current = self.root;
        loop {
            match self.nodes.get(current) {
                Node::Branch(branch) => {
                    let child = match bias {
                        Bias::Leftmost => branch.route_leftmost(&self.cmp, key),
                        Bias::Rightmost => branch.route_rightmost(&self.cmp, key),
                    };
                    frames.push(Frame { node: current, child });
                    current = branch.child(child);
                }
                Node::Leaf(_) => return Path { frames, tip: current },
            }
        }
    }

    /// Builds the path to the leaf holding global `index`, returning the
    /// index made leaf-local. Routes on cached weights only; no comparator
    /// calls. `index == weight()` resolves to the one-past-end slot of the
    /// rightmost leaf.
    pub(crate) fn descend_to_index(&self, mut index: usize) -> (Path, usize) {
        debug_assert!(index <= self.weight());
        let mut frames = Frames::new();
        let mut current = self.root;
        loop {
            match self.nodes.get(current) {
                Node::Branch(branch) => {
                    let mut child = 0;
                    while child + 1 < branch.child_count() && index >= branch.child_weight(child) {
                        index -= branch.child_weight(child);
                        child += 1;
                    }
                    frames.push(Frame { node: current, child });
                    current = branch.child(child);
                }
                Node::Leaf(_) => return (Path { frames, tip: current }, index),
            }
        }
    }

    /// Moves `path` to the node at the same depth immediately to its right.
    /// Returns `false`, leaving `path` unchanged, when the tip is on the
    /// rightmost spine.
    pub(crate) fn step_right(&self, path: &mut Path) -> bool {
        let depth = path.frames.len();
        let Some(pos) = path.frames.iter().rposition(|frame| {
            frame.child + 1 < self.nodes.get(frame.node).as_branch().child_count()
        }) else {
            return false;
        };
        path.frames.truncate(pos + 1);
        path.frames[pos].child += 1;
        let frame = path.frames[pos];
        let mut current = self.nodes.get(frame.node).as_branch().child(frame.child);
        // Re-descend the leftmost spine back to the original depth.
        while path.frames.len() < depth {
            let next = self.nodes.get(current).as_branch().child(0);
            path.frames.push(Frame { node: current, child: 0 });
            current = next;
        }
        path.tip = current;
        true
    }

    /// Mirror of [`Self::step_right`]: moves `path` one node to the left,
    /// re-descending the rightmost spine. Returns `false` on the leftmost
    /// spine.
    pub(crate) fn step_left(&self, path: &mut Path) -> bool {
        let depth = path.frames.len();
        let Some(pos) = path.frames.iter().rposition(|frame| frame.child > 0) else {
            return false;
        };
        path.frames.truncate(pos + 1);
        path.frames[pos].child -= 1;
        let frame = path.frames[pos];
        let mut current = self.nodes.get(frame.node).as_branch().child(frame.child);
        while path.frames.len() < depth {
            let branch = self.nodes.get(current).as_branch();
            let last = branch.child_count() - 1;
            let next = branch.child(last);
            path.frames.push(Frame { node: current, child: last });
            current = next;
        }
        path.tip = current;
        true
    }

    /// The nearest ancestor separator copied from the leftmost key of the
    /// subtree these frames lead into: the deepest frame entered through a
    /// child index above 0. Leftmost-spine frames have no pivot.
    pub(crate) fn pivot_key(&self, frames: &[Frame]) -> Option<&K> {
        frames
            .iter()
            .rev()
            .find(|frame| frame.child > 0)
            .map(|frame| self.nodes.get(frame.node).as_branch().key(frame.child - 1))
    }

    /// Rewrites the separator found by [`Self::pivot_key`]. Called whenever
    /// the leftmost key of the subtree under these frames changes; a
    /// leftmost-spine path has nothing to update.
    pub(crate) fn set_pivot(&mut self, frames: &[Frame], key: K) {
        if let Some(frame) = frames.iter().rev().find(|frame| frame.child > 0) {
            self.nodes.get_mut(frame.node).as_branch_mut().set_key(frame.child - 1, key);
        }
    }

    /// Adds `count` entries to the cached weights along `frames`.
    pub(crate) fn add_weights(&mut self, frames: &[Frame], count: usize) {
        for frame in frames {
            self.nodes.get_mut(frame.node).as_branch_mut().add_weight(frame.child, count);
        }
    }

    /// Removes `count` entries from the cached weights along `frames`.
    pub(crate) fn sub_weights(&mut self, frames: &[Frame], count: usize) {
        for frame in frames {
            self.nodes.get_mut(frame.node).as_branch_mut().sub_weight(frame.child, count);
        }
    }

    /// Propagates a split upward: hangs `new_node`, separated by `anchor`,
    /// immediately right of the child each frame descended into, splitting
    /// ancestors that overflow and growing a new root at the top.
    ///
    /// Ancestor weights must already account for the entries now under
    /// `new_node` (they sat under the split node on the same frames), so each
    /// level only moves weight sideways, never changes its total.
    ///
    /// `appending` carries the split placement chosen at the leaf up the
    /// climb: a rightmost-spine append splits every overfull ancestor at the
    /// tail, keeping the left node full, instead of at the midpoint.
    pub(crate) fn promote(
        &mut self,
        mut frames: Frames,
        mut anchor: K,
        mut new_node: Handle,
        appending: bool,
    ) {
        loop {
            let moved = self.nodes.get(new_node).weight();
            let Some(frame) = frames.pop() else {
                let left_weight = self.nodes.get(self.root).weight();
                let root = Branch::new_root(anchor, self.root, new_node, left_weight, moved);
                self.root = self.nodes.alloc(Node::Branch(root));
                return;
            };
            let max_keys = self.max_keys();
            let branch = self.nodes.get_mut(frame.node).as_branch_mut();
            branch.sub_weight(frame.child, moved);
            branch.insert_child(frame.child + 1, anchor, new_node, moved);
            if branch.key_count() <= max_keys {
                return;
            }
            let at_child =
                if appending { branch.child_count() - 1 } else { branch.child_count() / 2 };
            let (promoted, right) = branch.split(at_child);
            anchor = promoted;
            new_node = self.nodes.alloc(Node::Branch(right));
        }
    }

    /// Removes the child recorded by the deepest frame from its parent and
    /// rebalances branches upward. Entered with the removed child already
    /// freed and carrying zero cached weight on every ancestor.
    pub(crate) fn demote(&mut self, mut frames: Frames) {
        loop {
            let frame = frames.pop().expect("`RawTree::demote()` - climbed past the root!");

            // A parent holding nothing but the removed child dissolves; its
            // own slot is removed one level up.
            let dissolves = frame.child == 0
                && self.nodes.get(frame.node).as_branch().key_count() == 0;
            if dissolves {
                self.nodes.free(frame.node);
                continue;
            }

            if frame.child == 0 {
                // The first anchor routed to the second child, which is now
                // the parent's leftmost subtree; it rotates out to become the
                // parent's own pivot.
                let (_, _, anchor) =
                    self.nodes.get_mut(frame.node).as_branch_mut().pop_front_child();
                self.set_pivot(&frames, anchor);
            } else {
                self.nodes.get_mut(frame.node).as_branch_mut().remove_child(frame.child);
            }

            let mut right_path = Path { frames: frames.clone(), tip: frame.node };
            if !self.step_right(&mut right_path) {
                // Rightmost at its level: exempt from minimum fill. A root
                // left keyless collapses into its sole child.
                if frames.is_empty()
                    && self.nodes.get(frame.node).as_branch().key_count() == 0
                {
                    self.root = self.nodes.get(frame.node).as_branch().child(0);
                    self.nodes.free(frame.node);
                }
                return;
            }

            let left_keys = self.nodes.get(frame.node).as_branch().key_count();
            let right_keys = self.nodes.get(right_path.tip).as_branch().key_count();

            if left_keys + right_keys + 1 < self.order() {
                // Counting the pivot rotated down between them, both fit in
                // one node: coalesce into the left and cascade, since the
                // right sibling's slot must now leave *its* parent.
                let pivot = self
                    .pivot_key(&right_path.frames)
                    .expect("`RawTree::demote()` - right sibling without a pivot!")
                    .clone();
                let right = self.nodes.take(right_path.tip).into_branch();
                let moved = right.weight();
                self.nodes.get_mut(frame.node).as_branch_mut().absorb(pivot, right);
                self.add_weights(&frames, moved);
                self.sub_weights(&right_path.frames, moved);
                frames = right_path.into_frames();
                continue;
            }

            if left_keys < self.min_branch_keys() {
                // They don't fit in one node, so the right sibling can spare
                // children: rotate them over until the pair is even.
                let want_left = (left_keys + right_keys + 1) / 2;
                let mut pivot = self
                    .pivot_key(&right_path.frames)
                    .expect("`RawTree::demote()` - right sibling without a pivot!")
                    .clone();
                let mut moved = 0;
                for _ in left_keys..want_left {
                    let (child, weight, next_pivot) =
                        self.nodes.get_mut(right_path.tip).as_branch_mut().pop_front_child();
                    self.nodes.get_mut(frame.node).as_branch_mut().push_child(
                        pivot, child, weight,
                    );
                    pivot = next_pivot;
                    moved += weight;
                }
                self.add_weights(&frames, moved);
                self.sub_weights(&right_path.frames, moved);
                self.set_pivot(&right_path.frames, pivot);
            }
            return;
        }
    }

    /// Restores minimum fill at `path`'s leaf after a removal left it short.
    /// The rightmost leaf carries no minimum and is left alone.
    pub(crate) fn rebalance_leaf(&mut self, path: Path) {
        let mut right_path = path.clone();
        if !self.step_right(&mut right_path) {
            return;
        }
        let left_len = self.nodes.get(path.tip).as_leaf().len();
        let right_len = self.nodes.get(right_path.tip).as_leaf().len();

        if left_len + right_len <= self.max_keys() {
            // Both fit in one leaf: coalesce right into left, relink the
            // chain, and demote the right leaf's slot.
            let right = self.nodes.take(right_path.tip).into_leaf();
            let after = right.right();
            {
                let left = self.nodes.get_mut(path.tip).as_leaf_mut();
                left.set_right(after);
                left.absorb(right);
            }
            match after {
                Some(next) => self.nodes.get_mut(next).as_leaf_mut().set_left(Some(path.tip)),
                None => self.rightmost = path.tip,
            }
            self.add_weights(path.frames(), right_len);
            self.sub_weights(right_path.frames(), right_len);
            self.demote(right_path.into_frames());
        } else {
            // Shift just enough entries over to restore minimum fill, then
            // fix the pivot naming the right sibling's first key.
            let need = self.min_leaf_keys() - left_len;
            let donated = self.nodes.get_mut(right_path.tip).as_leaf_mut().split_front(need);
            self.nodes.get_mut(path.tip).as_leaf_mut().absorb(donated);
            let first = self.nodes.get(right_path.tip).as_leaf().first_key().clone();
            self.add_weights(path.frames(), need);
            self.sub_weights(right_path.frames(), need);
            self.set_pivot(right_path.frames(), first);
        }
    }
}
