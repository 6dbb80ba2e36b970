// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Composite segment: an ordered list of child segments.
//!
//! Every positional operation locates the child holding the index, forwards
//! the call, then settles the bookkeeping on the way back up: cached length,
//! generation, hash trust and the touched range.
//!
//! # Rebalancing
//!
//! A pass walks the touched children in index order:
//!
//! - empty children are dropped;
//! - a child above `max_child_size` is split in half and the left half is
//!   examined again, so one pass leaves no oversized child behind. This
//!   differs from a sweep that moves past the new sibling: such a sweep
//!   can leave a half above the limit after a single pass;
//! - a child is glued into its predecessor when the pair is smaller than
//!   `min_glue_size`, or when either of them is below the glue floor;
//! - anything else that is itself a composite gets its own pass.
//!
//! Thresholds are recomputed from the new child count after each pass. If
//! they moved, the pass is repeated over every child, so the result is a
//! fixed point: running `rebalance` again changes nothing.
//!
//! # Locality
//!
//! The composite remembers the last child it located along with that
//! child's starting index. Lookups scan outward from there, so sequential
//! access touches one or two children. The hint is dropped whenever a
//! mutation could have shifted the starting index it records.

use std::cell::Cell;

use tracing::debug;
use tracing::trace;

use crate::cursor::Path;
use crate::cursor::composite::CompositeCursor;
use crate::cursor::covering::CoveringCursor;
use crate::error::SegmentError;
use crate::error::SegmentResult;
use crate::hash::HashState;
use crate::policy::ChildKind;
use crate::policy::FlatPolicy;
use crate::policy::GLUE_FLOOR;
use crate::policy::NestedPolicy;
use crate::policy::PolicyRef;
use crate::policy::same_policy;
use crate::segment::Iter;
use crate::segment::Node;
use crate::segment::Segment;
use crate::segment::leaf::Leaf;

/// Passes repeated after a threshold change before giving up on a fixed point.
const MAX_ROUNDS: usize = 4;

/// The last located child and the global index of its first element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Locality {
    child: usize,
    start: usize,
}

/// A segment built from child segments.
#[derive(Clone, Debug)]
pub struct Composite<T> {
    children: Vec<Node<T>>,
    len: usize,
    /// Nesting depth, root at 0. Passed to the policy.
    depth: usize,
    policy: PolicyRef,
    max_child: usize,
    min_glue: usize,
    /// Inclusive range of children mutated since the last pass.
    touched: Option<(usize, usize)>,
    locality: Cell<Option<Locality>>,
    generation: u64,
    pub(crate) hash: HashState,
    /// Path buffer lent to the soft cursor.
    pub(crate) soft: Path,
}

impl<T> Composite<T> {
    pub fn new(policy: PolicyRef) -> Composite<T> {
        return Composite::at_depth(policy, 0);
    }

    /// An empty composite with the default [`FlatPolicy`].
    pub fn flat() -> Composite<T> {
        return Composite::new(FlatPolicy::default().shared());
    }

    /// An empty composite with the default [`NestedPolicy`].
    pub fn nested() -> Composite<T> {
        return Composite::new(NestedPolicy::default().shared());
    }

    pub(crate) fn at_depth(policy: PolicyRef, depth: usize) -> Composite<T> {
        let mut composite = Composite {
            children: Vec::new(),
            len: 0,
            depth,
            policy,
            max_child: 0,
            min_glue: 0,
            touched: None,
            locality: Cell::new(None),
            generation: 0,
            hash: HashState::EMPTY,
            soft: Path::new(),
        };
        composite.recompute_thresholds();
        return composite;
    }

    /// Wrap `leaf` and rebalance it into children sized for `policy`.
    pub fn from_leaf(policy: PolicyRef, leaf: Leaf<T>) -> Composite<T> {
        return Composite::wrap(policy, 0, leaf);
    }

    pub fn from_vec(policy: PolicyRef, items: Vec<T>) -> Composite<T> {
        let page = policy.default_capacity();
        return Composite::from_leaf(policy, Leaf::from_vec_with_page(items, page));
    }

    pub(crate) fn wrap(policy: PolicyRef, depth: usize, leaf: Leaf<T>) -> Composite<T> {
        let mut composite = Composite::at_depth(policy, depth);
        if leaf.is_empty() {
            return composite;
        }
        debug!(depth, len = leaf.len(), "wrapping leaf in composite");
        let child = match composite.policy.child_kind(depth) {
            ChildKind::Leaf => Node::Leaf(leaf),
            ChildKind::Composite => {
                Node::Composite(Composite::wrap(composite.policy.clone(), depth + 1, leaf))
            }
        };
        composite.len = child.len();
        composite.children.push(child);
        composite.hash = HashState::STALE;
        composite.touched = Some((0, 0));
        composite.rebalance_touched();
        return composite;
    }

    /// A fresh child of the kind the policy asks for at this depth.
    fn new_child(&self) -> Node<T> {
        return match self.policy.child_kind(self.depth) {
            ChildKind::Leaf => Node::Leaf(Leaf::with_page(self.policy.default_capacity())),
            ChildKind::Composite => {
                Node::Composite(Composite::at_depth(self.policy.clone(), self.depth + 1))
            }
        };
    }

    #[inline(always)]
    pub fn children(&self) -> &[Node<T>] {
        return &self.children;
    }

    /// Children for in-place bookkeeping that leaves lengths unchanged.
    #[inline(always)]
    pub(crate) fn children_mut(&mut self) -> &mut [Node<T>] {
        return &mut self.children;
    }

    #[inline(always)]
    pub fn child_count(&self) -> usize {
        return self.children.len();
    }

    #[inline(always)]
    pub fn depth(&self) -> usize {
        return self.depth;
    }

    #[inline(always)]
    pub fn policy(&self) -> &PolicyRef {
        return &self.policy;
    }

    #[inline(always)]
    pub fn max_child_size(&self) -> usize {
        return self.max_child;
    }

    #[inline(always)]
    pub fn min_glue_size(&self) -> usize {
        return self.min_glue;
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        let (child, local) = self.locate(index)?;
        self.hash.invalidate();
        return self.children[child].get_mut(local);
    }

    pub fn into_vec(self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len);
        for child in self.children {
            out.extend(child.into_vec());
        }
        return out;
    }

    /// Soft cursor at the start. It reuses a path buffer owned by this
    /// composite, so repeated cursors do not allocate.
    pub fn cursor(&mut self) -> CompositeCursor<'_, T> {
        return CompositeCursor::new(self);
    }

    /// Soft cursor positioned so that `next` yields the element at `index`.
    pub fn cursor_at(&mut self, index: usize) -> SegmentResult<CompositeCursor<'_, T>> {
        let mut cursor = CompositeCursor::new(self);
        cursor.go_to(index)?;
        return Ok(cursor);
    }

    /// Leaf-level cursor on the leaf holding `index`.
    pub fn covering_at(&mut self, index: usize) -> SegmentResult<CoveringCursor<'_, T>> {
        return CoveringCursor::at(self, index);
    }

    /// Find the child holding `index` and the index within it.
    fn locate(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.len {
            return None;
        }
        let (mut child, mut start) = match self.locality.get() {
            Some(hint) if hint.child < self.children.len() => (hint.child, hint.start),
            _ => (0, 0),
        };
        while index < start {
            child = child.checked_sub(1)?;
            start = start.checked_sub(self.children.get(child)?.len())?;
        }
        loop {
            let size = self.children.get(child)?.len();
            if index < start + size {
                break;
            }
            start += size;
            child += 1;
        }
        self.locality.set(Some(Locality { child, start }));
        return Some((child, index - start));
    }

    /// Global index of the first element of `child`.
    pub(crate) fn child_start(&self, child: usize) -> usize {
        if let Some(hint) = self.locality.get()
            && hint.child == child
        {
            return hint.start;
        }
        return self.children[..child].iter().map(|node| node.len()).sum();
    }

    fn touch(&mut self, child: usize) {
        self.touched = match self.touched {
            Some((lo, hi)) => Some((lo.min(child), hi.max(child))),
            None => Some((child, child)),
        };
    }

    fn touch_all(&mut self) {
        if !self.children.is_empty() {
            self.touched = Some((0, self.children.len() - 1));
        }
    }

    /// Drop the locality hint if `child` changing size moved its start.
    fn forget_after(&mut self, child: usize) {
        if let Some(hint) = self.locality.get()
            && hint.child > child
        {
            self.locality.set(None);
        }
    }

    /// Account for a change made directly to `child`, whose length was
    /// `before`. Rebalances when the child left the allowed size band.
    pub(crate) fn settle(&mut self, child: usize, before: usize) {
        self.hash.invalidate();
        let after = match self.children.get(child) {
            Some(node) => node.len(),
            None => return,
        };
        if after == before {
            return;
        }
        self.len = self.len - before + after;
        self.generation += 1;
        self.forget_after(child);
        self.touch(child);
        let oversized = after > self.max_child;
        let undersized = after == 0 || (after < GLUE_FLOOR && self.children.len() > 1);
        if undersized && child + 1 < self.children.len() {
            // Only the successor can glue into a first child.
            self.touch(child + 1);
        }
        if oversized || undersized {
            self.rebalance_touched();
        }
    }

    /// Run `op` on the last child (created if needed) and settle.
    pub(crate) fn push_with<F>(&mut self, op: F) -> SegmentResult<bool>
    where
        F: FnOnce(&mut Node<T>) -> SegmentResult<bool>,
    {
        if self.children.is_empty() {
            let child = self.new_child();
            self.children.push(child);
        }
        let last = self.children.len() - 1;
        let before = self.children[last].len();
        let changed = op(&mut self.children[last])?;
        self.settle(last, before);
        return Ok(changed);
    }

    /// Run a length-preserving `op` on the child holding `index`.
    pub(crate) fn with_child_at<R, F>(&mut self, index: usize, op: F) -> SegmentResult<R>
    where
        F: FnOnce(&mut Node<T>, usize) -> SegmentResult<R>,
    {
        let (child, local) = self
            .locate(index)
            .ok_or(SegmentError::bounds(index, self.len))?;
        let result = op(&mut self.children[child], local)?;
        self.hash.invalidate();
        return Ok(result);
    }

    /// Append into the first child with spare room instead of the last.
    ///
    /// The element lands at the end of that child, not at the end of the
    /// sequence. Useful when order does not matter and allocation does.
    pub fn push_first_free(&mut self, value: T) -> SegmentResult<bool> {
        let max = self.max_child;
        let Some(child) = self.children.iter().position(|node| node.has_room(max)) else {
            return self.push(value);
        };
        let before = self.children[child].len();
        let changed = self.children[child].push(value)?;
        self.settle(child, before);
        return Ok(changed);
    }

    /// Run a full split/glue pass over every child.
    pub fn rebalance(&mut self) {
        self.touch_all();
        self.rebalance_touched();
    }

    /// Run the split/glue pass over the touched children only.
    pub(crate) fn rebalance_touched(&mut self) {
        for round in 0..MAX_ROUNDS {
            let Some((lo, hi)) = self.touched.take() else {
                return;
            };
            self.pass(lo, hi + 1);
            if !self.recompute_thresholds() {
                return;
            }
            debug!(
                depth = self.depth,
                round,
                children = self.children.len(),
                max = self.max_child,
                glue = self.min_glue,
                "thresholds moved, repeating pass"
            );
            self.touch_all();
        }
        self.touched = None;
    }

    /// One split/glue sweep over children `from..=to`.
    fn pass(&mut self, from: usize, to: usize) {
        let mut reshaped = false;
        let mut i = from;
        let mut end = to;
        while i < self.children.len() && i <= end {
            let size = self.children[i].len();
            if size == 0 {
                self.children.remove(i);
                end = end.saturating_sub(1);
                reshaped = true;
                continue;
            }
            if size > self.max_child
                && let Some(right) = self.children[i].split_half()
            {
                trace!(depth = self.depth, child = i, size, "splitting child");
                self.children.insert(i + 1, right);
                end += 1;
                reshaped = true;
                continue;
            }
            if i > 0 {
                let prev = self.children[i - 1].len();
                if prev + size < self.min_glue || size < GLUE_FLOOR || prev < GLUE_FLOOR {
                    trace!(depth = self.depth, child = i, prev, size, "gluing child");
                    let node = self.children.remove(i);
                    self.children[i - 1].absorb(node);
                    end = end.saturating_sub(1);
                    i -= 1;
                    reshaped = true;
                    continue;
                }
            }
            if let Node::Composite(inner) = &mut self.children[i] {
                inner.rebalance_touched();
            }
            i += 1;
        }
        if reshaped {
            self.locality.set(None);
            self.generation += 1;
        }
    }

    /// Recompute thresholds from the current child count. Returns whether
    /// either moved.
    pub fn recompute_thresholds(&mut self) -> bool {
        let factor = self.policy.scaling_factor(self.depth, self.children.len());
        let max = self
            .policy
            .max_child_size(self.depth, factor)
            .max(2 * GLUE_FLOOR);
        let glue = self.policy.min_glue_size(self.depth, factor).min(max / 2);
        let changed = max != self.max_child || glue != self.min_glue;
        self.max_child = max;
        self.min_glue = glue;
        return changed;
    }

    /// Move the elements from `at` onward into a new composite at the same
    /// depth. The child holding `at` is split exactly there.
    pub(crate) fn split_off(&mut self, at: usize) -> Composite<T> {
        let mut right = Composite::at_depth(self.policy.clone(), self.depth);
        let tail = match self.locate(at) {
            None => Vec::new(),
            Some((child, 0)) => self.children.split_off(child),
            Some((child, local)) => {
                let piece = self.children[child].split_off(local);
                let mut tail = Vec::with_capacity(self.children.len() - child);
                tail.push(piece);
                tail.extend(self.children.drain(child + 1..));
                tail
            }
        };
        right.len = tail.iter().map(|node| node.len()).sum();
        right.children = tail;
        right.hash = HashState::STALE;
        right.touch_all();
        right.recompute_thresholds();

        self.len -= right.len;
        self.generation += 1;
        self.hash.invalidate();
        self.locality.set(None);
        self.touch_all();
        self.recompute_thresholds();
        return right;
    }

    /// Move every child of `other` onto the end. Depths that differ are
    /// rebuilt at this depth first.
    pub(crate) fn adopt(&mut self, other: Composite<T>) {
        if other.len == 0 {
            return;
        }
        let other = if other.depth == self.depth {
            other
        } else {
            let leaf = Leaf::from_vec(other.into_vec());
            Composite::wrap(self.policy.clone(), self.depth, leaf)
        };
        let first = self.children.len().saturating_sub(1);
        self.len += other.len;
        self.children.extend(other.children);
        self.generation += 1;
        self.hash.invalidate();
        self.touched = match self.touched {
            Some((lo, _)) => Some((lo.min(first), self.children.len() - 1)),
            None => Some((first, self.children.len() - 1)),
        };
    }

    pub(crate) fn dump_into(&self, out: &mut String, indent: usize) {
        out.push_str(&" ".repeat(indent));
        out.push_str(&format!(
            "composite depth={} len={} children={} max={} glue={} gen={}\n",
            self.depth,
            self.len,
            self.children.len(),
            self.max_child,
            self.min_glue,
            self.generation
        ));
        for child in &self.children {
            child.dump_into(out, indent + 2);
        }
    }

    /// Fill `path` with the child indices leading to the leaf that holds
    /// `index`, returning the offset within that leaf. `index == len`
    /// addresses the end of the last leaf. `None` when there is no leaf.
    pub(crate) fn descend(&self, index: usize, path: &mut Path) -> Option<usize> {
        path.clear();
        return self.descend_into(index, path);
    }

    fn descend_into(&self, index: usize, path: &mut Path) -> Option<usize> {
        let (child, local) = if index == self.len {
            let last = self.children.len().checked_sub(1)?;
            (last, self.children[last].len())
        } else {
            self.locate(index)?
        };
        path.push(child);
        return match &self.children[child] {
            Node::Leaf(_) => Some(local),
            Node::Composite(inner) => inner.descend_into(local, path),
        };
    }

    /// The leaf addressed by `path`, if it still addresses one.
    pub(crate) fn leaf_at(&self, path: &[usize]) -> Option<&Leaf<T>> {
        let (&first, rest) = path.split_first()?;
        return match self.children.get(first)? {
            Node::Leaf(leaf) if rest.is_empty() => Some(leaf),
            Node::Composite(inner) => inner.leaf_at(rest),
            Node::Leaf(_) => None,
        };
    }

    /// The composite addressed by `path`, `self` for an empty path.
    pub(crate) fn composite_at(&self, path: &[usize]) -> Option<&Composite<T>> {
        let Some((&first, rest)) = path.split_first() else {
            return Some(self);
        };
        return match self.children.get(first)? {
            Node::Composite(inner) => inner.composite_at(rest),
            Node::Leaf(_) => None,
        };
    }

    /// Step `path` to the next leaf in order. Returns false at the end.
    pub(crate) fn next_leaf(&self, path: &mut Path) -> bool {
        let mut level = path.len();
        while level > 0 {
            level -= 1;
            let Some(parent) = self.composite_at(&path[..level]) else {
                return false;
            };
            if path[level] + 1 < parent.children.len() {
                path[level] += 1;
                path.truncate(level + 1);
                let mut node = &parent.children[path[level]];
                while let Node::Composite(inner) = node {
                    if inner.children.is_empty() {
                        return self.next_leaf(path);
                    }
                    path.push(0);
                    node = &inner.children[0];
                }
                return true;
            }
        }
        return false;
    }

    /// Step `path` to the previous leaf in order. Returns false at the start.
    pub(crate) fn prev_leaf(&self, path: &mut Path) -> bool {
        let mut level = path.len();
        while level > 0 {
            level -= 1;
            if path[level] > 0 {
                let Some(parent) = self.composite_at(&path[..level]) else {
                    return false;
                };
                path[level] -= 1;
                path.truncate(level + 1);
                let mut node = &parent.children[path[level]];
                while let Node::Composite(inner) = node {
                    if inner.children.is_empty() {
                        return self.prev_leaf(path);
                    }
                    let last = inner.children.len() - 1;
                    path.push(last);
                    node = &inner.children[last];
                }
                return true;
            }
        }
        return false;
    }
}

impl<T> FromIterator<T> for Composite<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        return Composite::from_vec(FlatPolicy::default().shared(), iter.into_iter().collect());
    }
}

impl<T> Segment<T> for Composite<T> {
    #[inline(always)]
    fn len(&self) -> usize {
        return self.len;
    }

    fn get(&self, index: usize) -> Option<&T> {
        let (child, local) = self.locate(index)?;
        return self.children[child].get(local);
    }

    fn push(&mut self, value: T) -> SegmentResult<bool> {
        return self.push_with(|child| child.push(value));
    }

    fn insert(&mut self, index: usize, value: T) -> SegmentResult<bool> {
        if index > self.len {
            return Err(SegmentError::bounds(index, self.len));
        }
        if index == self.len {
            return self.push(value);
        }
        let (child, local) = self
            .locate(index)
            .ok_or(SegmentError::bounds(index, self.len))?;
        let before = self.children[child].len();
        let changed = self.children[child].insert(local, value)?;
        self.settle(child, before);
        return Ok(changed);
    }

    fn remove_at(&mut self, index: usize) -> SegmentResult<T> {
        let (child, local) = self
            .locate(index)
            .ok_or(SegmentError::bounds(index, self.len))?;
        let before = self.children[child].len();
        let removed = self.children[child].remove_at(local)?;
        self.settle(child, before);
        return Ok(removed);
    }

    fn set(&mut self, index: usize, value: T) -> SegmentResult<T> {
        return self.with_child_at(index, |child, local| child.set(local, value));
    }

    fn clear(&mut self) {
        self.children.clear();
        self.len = 0;
        self.generation += 1;
        self.hash = HashState::EMPTY;
        self.touched = None;
        self.locality.set(None);
        self.recompute_thresholds();
    }

    fn retain_dyn(&mut self, keep: &mut dyn FnMut(&T) -> bool) {
        for child in &mut self.children {
            child.retain_dyn(keep);
        }
        let len = self.children.iter().map(|node| node.len()).sum();
        if len == self.len {
            return;
        }
        self.len = len;
        self.generation += 1;
        self.hash.invalidate();
        self.locality.set(None);
        self.rebalance();
    }

    fn iter<'a>(&'a self) -> impl Iterator<Item = &'a T>
    where
        T: 'a,
    {
        return Iter::new(&self.children, self.len);
    }

    #[inline(always)]
    fn generation(&self) -> u64 {
        return self.generation;
    }

    fn split_half(&mut self) -> Option<Composite<T>> {
        if self.len <= 1 {
            return None;
        }
        return Some(self.split_off(self.len / 2));
    }

    /// Fails with [`SegmentError::PolicyMismatch`] unless both sides share
    /// one policy object.
    fn append(&mut self, other: Composite<T>) -> SegmentResult<()> {
        if !same_policy(&self.policy, &other.policy) {
            return Err(SegmentError::PolicyMismatch);
        }
        self.adopt(other);
        self.rebalance_touched();
        return Ok(());
    }

    fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        return out;
    }
}
