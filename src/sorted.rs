// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Order-maintaining segment.
//!
//! A [`SortedSegment`] is a composite whose elements always satisfy a strict
//! ordering predicate pairwise. It behaves as a set: two elements neither of
//! which precedes the other are equal, and adding one that is already
//! present does nothing.
//!
//! Every value-directed operation runs the same search, then hands the
//! result to a [`Worker`] that decides what to do with it:
//!
//! 1. the rightmost child's last element, then its first,
//! 2. the leftmost child's first element, then its last,
//! 3. a binary search across the remaining children by first element,
//! 4. a binary search inside the chosen child.
//!
//! The first two steps settle appends, prepends and edits at either end in
//! constant time.

use std::cmp::Ordering;
use std::marker::PhantomData;

use crate::error::SegmentError;
use crate::error::SegmentResult;
use crate::policy::FlatPolicy;
use crate::policy::PolicyRef;
use crate::policy::same_policy;
use crate::segment::Node;
use crate::segment::Segment;
use crate::segment::composite::Composite;

/// A strict ordering: `precedes(a, b)` is true when `a` must come before `b`.
pub trait Precedes<T: ?Sized> {
    fn precedes(&self, a: &T, b: &T) -> bool;
}

/// Ordering from a two-argument predicate.
#[derive(Clone, Copy, Debug)]
pub struct ByPredicate<F>(pub F);

impl<T: ?Sized, F: Fn(&T, &T) -> bool> Precedes<T> for ByPredicate<F> {
    fn precedes(&self, a: &T, b: &T) -> bool {
        return (self.0)(a, b);
    }
}

/// Ordering from a comparator and a direction flag.
#[derive(Clone, Copy, Debug)]
pub struct ByComparator<C> {
    compare: C,
    descending: bool,
}

impl<C> ByComparator<C> {
    pub fn new(compare: C, descending: bool) -> ByComparator<C> {
        return ByComparator {
            compare,
            descending,
        };
    }
}

impl<T: ?Sized, C: Fn(&T, &T) -> Ordering> Precedes<T> for ByComparator<C> {
    fn precedes(&self, a: &T, b: &T) -> bool {
        let wanted = if self.descending {
            Ordering::Greater
        } else {
            Ordering::Less
        };
        return (self.compare)(a, b) == wanted;
    }
}

/// The natural `Ord` ordering, either direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Natural {
    pub descending: bool,
}

impl<T: Ord + ?Sized> Precedes<T> for Natural {
    fn precedes(&self, a: &T, b: &T) -> bool {
        if self.descending {
            return a > b;
        }
        return a < b;
    }
}

/// Outcome of a search, as a global index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Probe {
    /// An equal element sits at this index.
    Equal(usize),
    /// No equal element; this is where the value belongs.
    Slot(usize),
}

/// What to do with a search result.
pub trait Worker<S> {
    type Output;

    fn equal(self, segment: S, index: usize) -> Self::Output;

    fn slot(self, segment: S, index: usize) -> Self::Output;
}

/// Inserts at the slot; refuses an equal element.
pub struct InsertWorker<T> {
    pub value: T,
}

impl<'s, T> Worker<&'s mut Composite<T>> for InsertWorker<T> {
    type Output = SegmentResult<bool>;

    fn equal(self, _segment: &'s mut Composite<T>, _index: usize) -> SegmentResult<bool> {
        return Ok(false);
    }

    fn slot(self, segment: &'s mut Composite<T>, index: usize) -> SegmentResult<bool> {
        return segment.insert(index, self.value);
    }
}

/// Removes the equal element, if any.
pub struct RemoveWorker<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for RemoveWorker<T> {
    fn default() -> Self {
        return RemoveWorker {
            _marker: PhantomData,
        };
    }
}

impl<'s, T> Worker<&'s mut Composite<T>> for RemoveWorker<T> {
    type Output = SegmentResult<Option<T>>;

    fn equal(self, segment: &'s mut Composite<T>, index: usize) -> SegmentResult<Option<T>> {
        return segment.remove_at(index).map(Some);
    }

    fn slot(self, _segment: &'s mut Composite<T>, _index: usize) -> SegmentResult<Option<T>> {
        return Ok(None);
    }
}

/// Reports where the equal element is.
#[derive(Clone, Copy, Debug, Default)]
pub struct LookupWorker;

impl<'s, T> Worker<&'s Composite<T>> for LookupWorker {
    type Output = Option<usize>;

    fn equal(self, _segment: &'s Composite<T>, index: usize) -> Option<usize> {
        return Some(index);
    }

    fn slot(self, _segment: &'s Composite<T>, _index: usize) -> Option<usize> {
        return None;
    }
}

#[inline]
fn dispatch<S, W: Worker<S>>(probe: Probe, segment: S, worker: W) -> W::Output {
    return match probe {
        Probe::Equal(index) => worker.equal(segment, index),
        Probe::Slot(index) => worker.slot(segment, index),
    };
}

/// A composite kept in order by `P`.
#[derive(Clone, Debug)]
pub struct SortedSegment<T, P> {
    inner: Composite<T>,
    order: P,
}

impl<T, P: Precedes<T>> SortedSegment<T, P> {
    pub fn new(order: P) -> SortedSegment<T, P> {
        return SortedSegment::with_policy(order, FlatPolicy::default().shared());
    }

    pub fn with_policy(order: P, policy: PolicyRef) -> SortedSegment<T, P> {
        return SortedSegment {
            inner: Composite::new(policy),
            order,
        };
    }

    pub fn inner(&self) -> &Composite<T> {
        return &self.inner;
    }

    pub fn order(&self) -> &P {
        return &self.order;
    }

    pub fn into_inner(self) -> Composite<T> {
        return self.inner;
    }

    /// Whether the tie rule calls `a` and `b` equal.
    #[inline]
    fn ties(&self, a: &T, b: &T) -> bool {
        return !self.order.precedes(a, b) && !self.order.precedes(b, a);
    }

    /// Binary search `node[lo..hi]`, reporting indices offset by `base`.
    fn search_node(&self, node: &Node<T>, base: usize, mut lo: usize, mut hi: usize, value: &T) -> Probe {
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let Some(item) = node.get(mid) else {
                break;
            };
            if self.order.precedes(item, value) {
                lo = mid + 1;
            } else if self.order.precedes(value, item) {
                hi = mid;
            } else {
                return Probe::Equal(base + mid);
            }
        }
        return Probe::Slot(base + lo);
    }

    /// Locate `value`.
    pub fn probe(&self, value: &T) -> Probe {
        let children = self.inner.children();
        let len = self.inner.len();
        let (Some(first_child), Some(last_child)) = (children.first(), children.last()) else {
            return Probe::Slot(0);
        };
        let (Ok(head), Ok(tail)) = (first_child.first(), last_child.last()) else {
            return self.probe_children(value);
        };

        // Rightmost child.
        if self.order.precedes(tail, value) {
            return Probe::Slot(len);
        }
        if !self.order.precedes(value, tail) {
            return Probe::Equal(len - 1);
        }
        let last_start = len - last_child.len();
        if let Ok(last_head) = last_child.first() {
            if self.order.precedes(last_head, value) {
                return self.search_node(last_child, last_start, 1, last_child.len() - 1, value);
            }
            if !self.order.precedes(value, last_head) {
                return Probe::Equal(last_start);
            }
        }

        // Leftmost child.
        if self.order.precedes(value, head) {
            return Probe::Slot(0);
        }
        if !self.order.precedes(head, value) {
            return Probe::Equal(0);
        }
        if let Ok(first_tail) = first_child.last() {
            if self.order.precedes(value, first_tail) {
                return self.search_node(first_child, 0, 1, first_child.len() - 1, value);
            }
            if !self.order.precedes(first_tail, value) {
                return Probe::Equal(first_child.len() - 1);
            }
        }

        return self.probe_children(value);
    }

    /// Binary search across children by first element, then inside one.
    fn probe_children(&self, value: &T) -> Probe {
        let children = self.inner.children();
        let mut lo = 0;
        let mut hi = children.len();
        // Find the last child whose first element does not follow `value`.
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match children[mid].first() {
                Ok(head) if self.order.precedes(value, head) => hi = mid,
                Ok(head) if self.ties(head, value) => {
                    return Probe::Equal(self.inner.child_start(mid));
                }
                _ => lo = mid + 1,
            }
        }
        if lo == 0 {
            return Probe::Slot(0);
        }
        let child = lo - 1;
        let node = &children[child];
        return self.search_node(node, self.inner.child_start(child), 0, node.len(), value);
    }

    /// Insert `value` in order. Returns false if an equal element exists.
    pub fn add(&mut self, value: T) -> SegmentResult<bool> {
        let probe = self.probe(&value);
        return dispatch(probe, &mut self.inner, InsertWorker { value });
    }

    /// Remove the element equal to `value`, returning it.
    pub fn take(&mut self, value: &T) -> SegmentResult<Option<T>> {
        let probe = self.probe(value);
        return dispatch(probe, &mut self.inner, RemoveWorker::default());
    }

    /// Remove the element equal to `value`. Returns whether one was found.
    pub fn remove_value(&mut self, value: &T) -> bool {
        return matches!(self.take(value), Ok(Some(_)));
    }

    pub fn contains(&self, value: &T) -> bool {
        return self.index_of(value).is_some();
    }

    pub fn index_of(&self, value: &T) -> Option<usize> {
        return dispatch(self.probe(value), &self.inner, LookupWorker);
    }

    /// Always fails: a sorted segment decides placement itself.
    pub fn push_first_free(&mut self, _value: T) -> SegmentResult<bool> {
        return Err(SegmentError::Unsupported("first-free insert on a sorted segment"));
    }

    /// Whether `value` fits between the neighbours of `index`.
    fn fits_at(&self, index: usize, value: &T) -> bool {
        if index > 0
            && let Some(prev) = self.inner.get(index - 1)
            && !self.order.precedes(prev, value)
        {
            return false;
        }
        if let Some(next) = self.inner.get(index)
            && !self.order.precedes(value, next)
        {
            return false;
        }
        return true;
    }
}

impl<T: Ord> SortedSegment<T, Natural> {
    pub fn ascending() -> SortedSegment<T, Natural> {
        return SortedSegment::new(Natural { descending: false });
    }

    pub fn descending() -> SortedSegment<T, Natural> {
        return SortedSegment::new(Natural { descending: true });
    }
}

impl<T, C: Fn(&T, &T) -> Ordering> SortedSegment<T, ByComparator<C>> {
    pub fn by_comparator(compare: C, descending: bool) -> SortedSegment<T, ByComparator<C>> {
        return SortedSegment::new(ByComparator::new(compare, descending));
    }
}

impl<T, F: Fn(&T, &T) -> bool> SortedSegment<T, ByPredicate<F>> {
    pub fn by_predicate(precedes: F) -> SortedSegment<T, ByPredicate<F>> {
        return SortedSegment::new(ByPredicate(precedes));
    }
}

impl<T, P: Precedes<T> + Clone> Segment<T> for SortedSegment<T, P> {
    #[inline]
    fn len(&self) -> usize {
        return self.inner.len();
    }

    fn get(&self, index: usize) -> Option<&T> {
        return self.inner.get(index);
    }

    /// Same as [`SortedSegment::add`].
    fn push(&mut self, value: T) -> SegmentResult<bool> {
        return self.add(value);
    }

    /// Inserts only if `value` fits strictly between its would-be
    /// neighbours. Returns `Ok(false)` and leaves the segment untouched
    /// otherwise.
    fn insert(&mut self, index: usize, value: T) -> SegmentResult<bool> {
        if index > self.inner.len() {
            return Err(SegmentError::bounds(index, self.inner.len()));
        }
        if !self.fits_at(index, &value) {
            return Ok(false);
        }
        return self.inner.insert(index, value);
    }

    fn remove_at(&mut self, index: usize) -> SegmentResult<T> {
        return self.inner.remove_at(index);
    }

    /// Equality here is the tie rule of the ordering, not `PartialEq`.
    fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        return dispatch(self.probe(value), &self.inner, LookupWorker).is_some();
    }

    fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        return dispatch(self.probe(value), &self.inner, LookupWorker);
    }

    /// Elements are unique, so this is [`Segment::index_of`].
    fn last_index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        return dispatch(self.probe(value), &self.inner, LookupWorker);
    }

    fn remove_value(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        let position = self.probe(value);
        let removed = dispatch(position, &mut self.inner, RemoveWorker::default());
        return matches!(removed, Ok(Some(_)));
    }

    fn set(&mut self, _index: usize, _value: T) -> SegmentResult<T> {
        return Err(SegmentError::Unsupported("positional replace on a sorted segment"));
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn retain_dyn(&mut self, keep: &mut dyn FnMut(&T) -> bool) {
        self.inner.retain_dyn(keep);
    }

    fn iter<'a>(&'a self) -> impl Iterator<Item = &'a T>
    where
        T: 'a,
    {
        return self.inner.iter();
    }

    fn generation(&self) -> u64 {
        return self.inner.generation();
    }

    fn split_half(&mut self) -> Option<SortedSegment<T, P>> {
        let right = self.inner.split_half()?;
        return Some(SortedSegment {
            inner: right,
            order: self.order.clone(),
        });
    }

    /// Splices wholesale when both sides share a policy and every element
    /// of `other` follows every element here, otherwise adds them one by one.
    fn append(&mut self, other: SortedSegment<T, P>) -> SegmentResult<()> {
        let disjoint = match (self.inner.last(), other.inner.first()) {
            (Ok(tail), Ok(head)) => self.order.precedes(tail, head),
            _ => true,
        };
        if disjoint && same_policy(self.inner.policy(), other.inner.policy()) {
            return self.inner.append(other.inner);
        }
        for item in other.inner.into_vec() {
            self.add(item)?;
        }
        return Ok(());
    }

    fn dump(&self) -> String {
        return format!("sorted {}", self.inner.dump());
    }
}
