// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Segments: the nodes of a sequence tree.
//!
//! A segment is either a [`Leaf`] (one flat growable array) or a
//! [`Composite`] (an ordered list of child segments that rebalances itself).
//! Both present the same [`Segment`] contract, as does the order-maintaining
//! [`SortedSegment`](crate::sorted::SortedSegment).
//!
//! Children of a composite are stored as [`Node`]s, a closed set of the two
//! physical variants. Rebalancing only ever asks a child to split itself or
//! absorb a neighbour, so it never needs to know which variant it holds.
//!
//! Reads flow top-down: composite, child, leaf. Size, generation and hash
//! bookkeeping flows back up along the same path.

pub mod composite;
pub mod leaf;

use std::ops::Range;

use smallvec::SmallVec;

use crate::cursor::Walker;
use crate::cursor::frozen::FrozenCursor;
use crate::error::SegmentError;
use crate::error::SegmentResult;

pub use composite::Composite;
pub use leaf::Leaf;

/// The capability contract shared by every segment.
///
/// Indexed reads return `Option`, mutators return [`SegmentResult`].
/// `push` and `insert` report whether the segment changed, which is always
/// true except for a sorted segment refusing a duplicate or an
/// order-violating position.
pub trait Segment<T> {
    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Option<&T>;

    fn push(&mut self, value: T) -> SegmentResult<bool>;

    fn insert(&mut self, index: usize, value: T) -> SegmentResult<bool>;

    fn remove_at(&mut self, index: usize) -> SegmentResult<T>;

    /// Replace the element at `index`, returning the old one.
    fn set(&mut self, index: usize, value: T) -> SegmentResult<T>;

    fn clear(&mut self);

    /// Keep only the elements for which `keep` returns true.
    fn retain_dyn(&mut self, keep: &mut dyn FnMut(&T) -> bool);

    fn iter<'a>(&'a self) -> impl Iterator<Item = &'a T>
    where
        T: 'a;

    /// Mutation counter. Bumped by every structural change.
    fn generation(&self) -> u64;

    /// Move the back half into a new segment. `None` below two elements.
    fn split_half(&mut self) -> Option<Self>
    where
        Self: Sized;

    /// Move every element of `other` to the end of `self`.
    fn append(&mut self, other: Self) -> SegmentResult<()>
    where
        Self: Sized;

    /// Human-readable shape of the segment. The format is not stable.
    fn dump(&self) -> String;

    #[inline]
    fn is_empty(&self) -> bool {
        return self.len() == 0;
    }

    fn first(&self) -> SegmentResult<&T> {
        return self.get(0).ok_or(SegmentError::Empty);
    }

    fn last(&self) -> SegmentResult<&T> {
        let len = self.len();
        if len == 0 {
            return Err(SegmentError::Empty);
        }
        return self.get(len - 1).ok_or(SegmentError::Empty);
    }

    fn retain<F: FnMut(&T) -> bool>(&mut self, mut keep: F)
    where
        Self: Sized,
    {
        self.retain_dyn(&mut keep);
    }

    fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        return self.iter().any(|item| item == value);
    }

    fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        return self.iter().position(|item| item == value);
    }

    fn last_index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        return (0..self.len())
            .rev()
            .find(|&index| self.get(index) == Some(value));
    }

    /// Remove the first element equal to `value`. Returns whether one was found.
    fn remove_value(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        return match self.index_of(value) {
            Some(index) => self.remove_at(index).is_ok(),
            None => false,
        };
    }

    /// Push every item. Returns whether the segment changed.
    fn extend_from<I: IntoIterator<Item = T>>(&mut self, items: I) -> SegmentResult<bool>
    where
        Self: Sized,
    {
        let mut changed = false;
        for item in items {
            changed |= self.push(item)?;
        }
        return Ok(changed);
    }

    /// Keep only elements that appear in `other`. Returns whether anything
    /// was removed.
    fn retain_all<'c, I>(&mut self, other: I) -> bool
    where
        Self: Sized,
        T: PartialEq + 'c,
        I: IntoIterator<Item = &'c T>,
    {
        let other: Vec<&T> = other.into_iter().collect();
        let before = self.len();
        self.retain(|item| other.iter().any(|candidate| *candidate == item));
        return self.len() != before;
    }

    /// Drop every element that appears in `other`. Returns whether anything
    /// was removed.
    fn remove_all<'c, I>(&mut self, other: I) -> bool
    where
        Self: Sized,
        T: PartialEq + 'c,
        I: IntoIterator<Item = &'c T>,
    {
        let other: Vec<&T> = other.into_iter().collect();
        let before = self.len();
        self.retain(|item| !other.iter().any(|candidate| *candidate == item));
        return self.len() != before;
    }

    /// Clone the elements in `range`.
    fn copy_range(&self, range: Range<usize>) -> SegmentResult<Vec<T>>
    where
        T: Clone,
    {
        let len = self.len();
        if range.end > len {
            return Err(SegmentError::bounds(range.end, len));
        }
        if range.start > range.end {
            return Err(SegmentError::bounds(range.start, range.end));
        }
        let mut out = Vec::with_capacity(range.end - range.start);
        for index in range {
            let item = self.get(index).ok_or(SegmentError::bounds(index, len))?;
            out.push(item.clone());
        }
        return Ok(out);
    }

    fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        return self.iter().cloned().collect();
    }

    /// A read-only cursor at the start of the segment.
    fn frozen_cursor(&self) -> FrozenCursor<'_, T, Self>
    where
        Self: Sized,
    {
        return FrozenCursor::new(self);
    }

    /// Cursor whose `next` yields the first match.
    fn find_first<F: FnMut(&T) -> bool>(&self, predicate: F) -> Option<FrozenCursor<'_, T, Self>>
    where
        Self: Sized,
    {
        let index = self.iter().position(predicate)?;
        return Some(FrozenCursor::at(self, index));
    }

    /// Cursor whose `next` yields the last match.
    fn find_last<F: FnMut(&T) -> bool>(&self, mut predicate: F) -> Option<FrozenCursor<'_, T, Self>>
    where
        Self: Sized,
    {
        let index = (0..self.len())
            .rev()
            .find(|&index| self.get(index).is_some_and(&mut predicate))?;
        return Some(FrozenCursor::at(self, index));
    }

    /// Every match, copied into a new leaf.
    fn filter<F: FnMut(&T) -> bool>(&self, mut predicate: F) -> Leaf<T>
    where
        T: Clone,
    {
        return self.iter().filter(|item| predicate(*item)).cloned().collect();
    }

    /// Start a generation-checked traversal.
    fn walker(&self) -> Walker {
        return Walker::new(self.generation());
    }

    /// Advance `walker`, failing if the segment changed since it started.
    fn walk<'s>(&'s self, walker: &mut Walker) -> SegmentResult<Option<&'s T>> {
        walker.check(self.generation())?;
        let item = self.get(walker.position());
        if item.is_some() {
            walker.advance();
        }
        return Ok(item);
    }
}

/// A child of a composite.
#[derive(Clone, Debug)]
pub enum Node<T> {
    Leaf(Leaf<T>),
    Composite(Composite<T>),
}

impl<T> Node<T> {
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        return match self {
            Node::Leaf(leaf) => leaf.get_mut(index),
            Node::Composite(composite) => composite.get_mut(index),
        };
    }

    pub fn into_vec(self) -> Vec<T> {
        return match self {
            Node::Leaf(leaf) => leaf.into_vec(),
            Node::Composite(composite) => composite.into_vec(),
        };
    }

    /// Glue `other` onto the end of this node. Same-kind neighbours move
    /// their storage wholesale. A mixed pair is flattened into the left
    /// node's kind first.
    pub(crate) fn absorb(&mut self, other: Node<T>) {
        match (self, other) {
            (Node::Leaf(left), Node::Leaf(right)) => left.absorb(right),
            (Node::Composite(left), Node::Composite(right)) => left.adopt(right),
            (Node::Leaf(left), right) => left.absorb(Leaf::from_vec(right.into_vec())),
            (Node::Composite(left), right) => {
                let leaf = Leaf::from_vec(right.into_vec());
                let wrapped = Composite::wrap(left.policy().clone(), left.depth(), leaf);
                left.adopt(wrapped);
            }
        }
    }

    /// Move the elements from `at` onward into a new node of the same kind.
    pub(crate) fn split_off(&mut self, at: usize) -> Node<T> {
        return match self {
            Node::Leaf(leaf) => Node::Leaf(leaf.split_off(at)),
            Node::Composite(composite) => Node::Composite(composite.split_off(at)),
        };
    }

    /// Whether `push_first_free` may place an element here.
    pub(crate) fn has_room(&self, max: usize) -> bool {
        return match self {
            Node::Leaf(leaf) => leaf.len() < leaf.capacity() && leaf.len() < max,
            Node::Composite(composite) => composite.len() < max,
        };
    }

    pub(crate) fn dump_into(&self, out: &mut String, indent: usize) {
        match self {
            Node::Leaf(leaf) => {
                out.push_str(&" ".repeat(indent));
                out.push_str(&leaf.dump());
                out.push('\n');
            }
            Node::Composite(composite) => composite.dump_into(out, indent),
        }
    }
}

impl<T> Segment<T> for Node<T> {
    fn len(&self) -> usize {
        return match self {
            Node::Leaf(leaf) => leaf.len(),
            Node::Composite(composite) => composite.len(),
        };
    }

    fn get(&self, index: usize) -> Option<&T> {
        return match self {
            Node::Leaf(leaf) => leaf.get(index),
            Node::Composite(composite) => composite.get(index),
        };
    }

    fn push(&mut self, value: T) -> SegmentResult<bool> {
        return match self {
            Node::Leaf(leaf) => leaf.push(value),
            Node::Composite(composite) => composite.push(value),
        };
    }

    fn insert(&mut self, index: usize, value: T) -> SegmentResult<bool> {
        return match self {
            Node::Leaf(leaf) => leaf.insert(index, value),
            Node::Composite(composite) => composite.insert(index, value),
        };
    }

    fn remove_at(&mut self, index: usize) -> SegmentResult<T> {
        return match self {
            Node::Leaf(leaf) => leaf.remove_at(index),
            Node::Composite(composite) => composite.remove_at(index),
        };
    }

    fn set(&mut self, index: usize, value: T) -> SegmentResult<T> {
        return match self {
            Node::Leaf(leaf) => leaf.set(index, value),
            Node::Composite(composite) => composite.set(index, value),
        };
    }

    fn clear(&mut self) {
        match self {
            Node::Leaf(leaf) => leaf.clear(),
            Node::Composite(composite) => composite.clear(),
        }
    }

    fn retain_dyn(&mut self, keep: &mut dyn FnMut(&T) -> bool) {
        match self {
            Node::Leaf(leaf) => leaf.retain_dyn(keep),
            Node::Composite(composite) => composite.retain_dyn(keep),
        }
    }

    fn iter<'a>(&'a self) -> impl Iterator<Item = &'a T>
    where
        T: 'a,
    {
        return Iter::new(std::slice::from_ref(self), self.len());
    }

    fn generation(&self) -> u64 {
        return match self {
            Node::Leaf(leaf) => leaf.generation(),
            Node::Composite(composite) => composite.generation(),
        };
    }

    fn split_half(&mut self) -> Option<Node<T>> {
        return match self {
            Node::Leaf(leaf) => leaf.split_half().map(Node::Leaf),
            Node::Composite(composite) => composite.split_half().map(Node::Composite),
        };
    }

    fn append(&mut self, other: Node<T>) -> SegmentResult<()> {
        return match (self, other) {
            (Node::Leaf(left), Node::Leaf(right)) => left.append(right),
            (Node::Composite(left), Node::Composite(right)) => left.append(right),
            (left, right) => {
                left.absorb(right);
                Ok(())
            }
        };
    }

    fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        return out;
    }
}

/// In-order iterator over the elements below a run of nodes.
pub struct Iter<'a, T> {
    /// Pending siblings at each open level.
    stack: SmallVec<[std::slice::Iter<'a, Node<T>>; 4]>,
    /// Remaining elements of the current leaf.
    leaf: std::slice::Iter<'a, T>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(nodes: &'a [Node<T>], len: usize) -> Iter<'a, T> {
        let mut stack = SmallVec::new();
        stack.push(nodes.iter());
        return Iter {
            stack,
            leaf: Default::default(),
            remaining: len,
        };
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            if let Some(item) = self.leaf.next() {
                self.remaining -= 1;
                return Some(item);
            }
            let siblings = self.stack.last_mut()?;
            match siblings.next() {
                Some(Node::Leaf(leaf)) => self.leaf = leaf.as_slice().iter(),
                Some(Node::Composite(composite)) => self.stack.push(composite.children().iter()),
                None => {
                    self.stack.pop();
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        return (self.remaining, Some(self.remaining));
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::FlatPolicy;

    fn small_policy() -> crate::policy::PolicyRef {
        return FlatPolicy {
            capacity: 4,
            max_base: 16,
            glue_base: 4,
        }
        .shared();
    }

    #[test]
    fn provided_queries() {
        let mut composite = Composite::new(small_policy());
        for i in [3, 1, 4, 1, 5, 9, 2, 6] {
            composite.push(i).unwrap();
        }
        assert!(composite.contains(&9));
        assert!(!composite.contains(&7));
        assert_eq!(composite.index_of(&1), Some(1));
        assert_eq!(composite.last_index_of(&1), Some(3));
        assert_eq!(composite.first(), Ok(&3));
        assert_eq!(composite.last(), Ok(&6));
        assert_eq!(composite.copy_range(2..5), Ok(vec![4, 1, 5]));
        assert!(composite.copy_range(5..9).is_err());
    }

    #[test]
    fn bulk_membership_edits() {
        let mut leaf: Leaf<u32> = (0..10).collect();
        assert!(leaf.remove_all(&[2, 4, 6]));
        assert_eq!(leaf.to_vec(), vec![0, 1, 3, 5, 7, 8, 9]);
        assert!(leaf.retain_all(&[1, 3, 5, 42]));
        assert_eq!(leaf.to_vec(), vec![1, 3, 5]);
        assert!(!leaf.retain_all(&[1, 3, 5]));
        assert!(leaf.extend_from([8, 9]).unwrap());
        assert!(leaf.remove_value(&8));
        assert!(!leaf.remove_value(&8));
        assert_eq!(leaf.to_vec(), vec![1, 3, 5, 9]);
    }

    #[test]
    fn filters() {
        let composite = Composite::from_vec(small_policy(), (0..100u32).collect());
        let evens = composite.filter(|x| x % 2 == 0);
        assert_eq!(evens.len(), 50);

        let mut first = composite.find_first(|x| *x > 40).unwrap();
        assert_eq!(first.next(), Some(&41));
        let mut last = composite.find_last(|x| x % 7 == 0).unwrap();
        assert_eq!(last.next(), Some(&98));
        assert!(composite.find_first(|x| *x > 1000).is_none());
    }

    #[test]
    fn empty_faults() {
        let leaf: Leaf<u32> = Leaf::new();
        assert_eq!(leaf.first(), Err(SegmentError::Empty));
        assert_eq!(leaf.last(), Err(SegmentError::Empty));
    }

    #[test]
    fn walker_detects_mutation() {
        let mut leaf: Leaf<u32> = (0..4).collect();
        let mut walker = leaf.walker();
        assert_eq!(leaf.walk(&mut walker), Ok(Some(&0)));
        assert_eq!(leaf.walk(&mut walker), Ok(Some(&1)));
        leaf.push(4).unwrap();
        assert!(matches!(
            leaf.walk(&mut walker),
            Err(SegmentError::ConcurrentModification { .. })
        ));
    }

    #[test]
    fn node_iter_is_exact() {
        let composite = Composite::from_vec(small_policy(), (0..50u32).collect());
        let node = Node::Composite(composite);
        assert_eq!(node.iter().size_hint(), (50, Some(50)));
        assert_eq!(node.iter().copied().collect::<Vec<_>>(), (0..50).collect::<Vec<_>>());
    }
}
