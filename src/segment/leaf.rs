// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Leaf segment: one flat growable array.
//!
//! Capacity grows in steps of `capacity + page + len / 4`, so appends are
//! O(1) amortized without doubling large leaves. Positional insert and
//! remove shift the tail.
//!
//! Removal keeps a trim countdown. Each in-place removal decrements it; once
//! it runs out, the next removal copies the survivors into a fresh array
//! sized `len + page - 1` instead of shifting, which reclaims capacity left
//! behind by earlier growth.

use tracing::trace;

use crate::cursor::leaf::LeafCursor;
use crate::error::SegmentError;
use crate::error::SegmentResult;
use crate::hash::HashState;
use crate::segment::Segment;

/// Default growth page.
pub const DEFAULT_PAGE: usize = 32;

/// A flat array-backed segment.
#[derive(Clone, Debug)]
pub struct Leaf<T> {
    items: Vec<T>,
    /// Growth increment, also the initial capacity.
    page: usize,
    generation: u64,
    /// In-place removals left before the next trimming removal.
    trim_countdown: usize,
    pub(crate) hash: HashState,
}

impl<T> Leaf<T> {
    pub fn new() -> Leaf<T> {
        return Leaf::with_page(DEFAULT_PAGE);
    }

    /// An empty leaf whose initial capacity and growth page is `page`.
    pub fn with_page(page: usize) -> Leaf<T> {
        let page = page.max(1);
        return Leaf {
            items: Vec::with_capacity(page),
            page,
            generation: 0,
            trim_countdown: 4 * page,
            hash: HashState::EMPTY,
        };
    }

    pub fn from_vec(items: Vec<T>) -> Leaf<T> {
        return Leaf::from_vec_with_page(items, DEFAULT_PAGE);
    }

    pub(crate) fn from_vec_with_page(items: Vec<T>, page: usize) -> Leaf<T> {
        let page = page.max(1);
        let hash = if items.is_empty() {
            HashState::EMPTY
        } else {
            HashState::STALE
        };
        return Leaf {
            items,
            page,
            generation: 0,
            trim_countdown: 4 * page,
            hash,
        };
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        return self.items.capacity();
    }

    #[inline(always)]
    pub fn page(&self) -> usize {
        return self.page;
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        return &self.items;
    }

    /// Mutable access to one element. Clears hash trust.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.hash.invalidate();
        return self.items.get_mut(index);
    }

    pub fn into_vec(self) -> Vec<T> {
        return self.items;
    }

    /// A cursor at the start of this leaf.
    pub fn cursor(&mut self) -> LeafCursor<'_, T> {
        return LeafCursor::new(self);
    }

    /// Append a run of elements in one copy.
    pub fn extend_from_slice(&mut self, items: &[T]) -> SegmentResult<()>
    where
        T: Clone,
    {
        self.reserve(items.len())?;
        self.items.extend_from_slice(items);
        self.touch();
        return Ok(());
    }

    #[inline]
    fn touch(&mut self) {
        self.generation += 1;
        self.hash.invalidate();
    }

    /// Make room for `additional` more elements, growing by at least one
    /// step of the growth rule.
    fn reserve(&mut self, additional: usize) -> SegmentResult<()> {
        let len = self.items.len();
        let capacity = self.items.capacity();
        if len + additional <= capacity {
            return Ok(());
        }
        let stepped = capacity + self.page + len / 4;
        let target = stepped.max(len + additional);
        self.items
            .try_reserve_exact(target - len)
            .map_err(|_| SegmentError::CapacityExhausted { requested: target })?;
        self.generation += 1;
        return Ok(());
    }

    /// Move the elements from `at` onward into a new leaf with the same page.
    pub(crate) fn split_off(&mut self, at: usize) -> Leaf<T> {
        let right = self.items.split_off(at);
        self.touch();
        return Leaf::from_vec_with_page(right, self.page);
    }

    /// Glue `other` onto the end. Used by rebalancing, where the combined
    /// size is bounded by the policy.
    pub(crate) fn absorb(&mut self, other: Leaf<T>) {
        if other.items.is_empty() {
            return;
        }
        self.items.extend(other.items);
        self.touch();
    }

    /// Remove `index` by copying the survivors into a right-sized array.
    fn trim_remove(&mut self, index: usize) -> Option<T> {
        let target = self.items.len() - 1 + self.page - 1;
        if self.items.capacity() <= target {
            return None;
        }
        let mut fresh = Vec::new();
        if fresh.try_reserve_exact(target).is_err() {
            return None;
        }
        trace!(
            from = self.items.capacity(),
            to = target,
            "trimming leaf storage"
        );
        let mut removed = None;
        for (i, item) in self.items.drain(..).enumerate() {
            if i == index {
                removed = Some(item);
            } else {
                fresh.push(item);
            }
        }
        self.items = fresh;
        return removed;
    }
}

impl<T> Default for Leaf<T> {
    fn default() -> Self {
        return Leaf::new();
    }
}

impl<T> FromIterator<T> for Leaf<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        return Leaf::from_vec(iter.into_iter().collect());
    }
}

impl<T> Segment<T> for Leaf<T> {
    #[inline(always)]
    fn len(&self) -> usize {
        return self.items.len();
    }

    #[inline(always)]
    fn get(&self, index: usize) -> Option<&T> {
        return self.items.get(index);
    }

    fn push(&mut self, value: T) -> SegmentResult<bool> {
        self.reserve(1)?;
        self.items.push(value);
        self.touch();
        return Ok(true);
    }

    fn insert(&mut self, index: usize, value: T) -> SegmentResult<bool> {
        if index > self.items.len() {
            return Err(SegmentError::bounds(index, self.items.len()));
        }
        self.reserve(1)?;
        self.items.insert(index, value);
        self.touch();
        return Ok(true);
    }

    fn remove_at(&mut self, index: usize) -> SegmentResult<T> {
        if index >= self.items.len() {
            return Err(SegmentError::bounds(index, self.items.len()));
        }
        let removed = if self.trim_countdown == 0 {
            self.trim_countdown = 4 * self.page;
            self.trim_remove(index)
        } else {
            self.trim_countdown -= 1;
            None
        };
        let removed = match removed {
            Some(item) => item,
            None => self.items.remove(index),
        };
        self.touch();
        return Ok(removed);
    }

    fn set(&mut self, index: usize, value: T) -> SegmentResult<T> {
        let len = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or(SegmentError::bounds(index, len))?;
        let old = std::mem::replace(slot, value);
        self.hash.invalidate();
        return Ok(old);
    }

    fn clear(&mut self) {
        self.items.clear();
        self.generation += 1;
        self.hash = HashState::EMPTY;
    }

    fn retain_dyn(&mut self, keep: &mut dyn FnMut(&T) -> bool) {
        let before = self.items.len();
        self.items.retain(|item| keep(item));
        if self.items.len() != before {
            self.touch();
        }
    }

    fn iter<'a>(&'a self) -> impl Iterator<Item = &'a T>
    where
        T: 'a,
    {
        return self.items.iter();
    }

    #[inline(always)]
    fn generation(&self) -> u64 {
        return self.generation;
    }

    fn split_half(&mut self) -> Option<Leaf<T>> {
        if self.items.len() <= 1 {
            return None;
        }
        let mid = self.items.len() / 2;
        return Some(self.split_off(mid));
    }

    fn append(&mut self, other: Leaf<T>) -> SegmentResult<()> {
        self.reserve(other.items.len())?;
        self.absorb(other);
        return Ok(());
    }

    fn dump(&self) -> String {
        return format!(
            "leaf len={} cap={} gen={}",
            self.items.len(),
            self.items.capacity(),
            self.generation
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_leaf() {
        let leaf: Leaf<u32> = Leaf::new();
        assert_eq!(leaf.len(), 0);
        assert!(leaf.is_empty());
        assert_eq!(leaf.capacity(), DEFAULT_PAGE);
    }

    #[test]
    fn grows_past_initial_capacity() {
        let mut leaf = Leaf::with_page(32);
        for i in 0..40u32 {
            leaf.push(i).unwrap();
        }
        assert_eq!(leaf.len(), 40);
        assert!(leaf.capacity() >= 40);
        for i in 0..40u32 {
            assert_eq!(leaf.get(i as usize), Some(&i));
        }
    }

    #[test]
    fn growth_rule() {
        let mut leaf = Leaf::with_page(4);
        for i in 0..4u32 {
            leaf.push(i).unwrap();
        }
        assert_eq!(leaf.capacity(), 4);
        leaf.push(4).unwrap();
        // 4 + 4 + 4 / 4
        assert_eq!(leaf.capacity(), 9);
    }

    #[test]
    fn insert_and_remove_shift() {
        let mut leaf: Leaf<u32> = (0..5).collect();
        leaf.insert(0, 10).unwrap();
        leaf.insert(6, 20).unwrap();
        assert_eq!(leaf.as_slice(), &[10, 0, 1, 2, 3, 4, 20]);
        assert_eq!(leaf.remove_at(3), Ok(2));
        assert_eq!(leaf.as_slice(), &[10, 0, 1, 3, 4, 20]);
        assert!(leaf.insert(8, 1).is_err());
        assert!(leaf.remove_at(6).is_err());
    }

    #[test]
    fn trim_reclaims_capacity() {
        let mut leaf = Leaf::with_page(2);
        for i in 0..64u32 {
            leaf.push(i).unwrap();
        }
        let grown = leaf.capacity();
        // Countdown is 4 * page = 8 in-place removals, then one trimming removal.
        for _ in 0..9 {
            leaf.remove_at(0).unwrap();
        }
        assert_eq!(leaf.len(), 55);
        assert!(leaf.capacity() < grown);
        assert_eq!(leaf.capacity(), 55 + 2 - 1);
        assert_eq!(leaf.first(), Ok(&9));
        assert_eq!(leaf.last(), Ok(&63));
    }

    #[test]
    fn split_in_half() {
        let mut leaf: Leaf<u32> = (0..10).collect();
        let mut right = leaf.split_half().unwrap();
        assert_eq!(leaf.as_slice(), &[0, 1, 2, 3, 4]);
        assert_eq!(right.as_slice(), &[5, 6, 7, 8, 9]);

        right.set(0, 50).unwrap();
        leaf.push(99).unwrap();
        assert_eq!(leaf.as_slice(), &[0, 1, 2, 3, 4, 99]);
        assert_eq!(right.as_slice(), &[50, 6, 7, 8, 9]);

        let mut single: Leaf<u32> = (0..1).collect();
        assert!(single.split_half().is_none());
    }

    #[test]
    fn append_copies_storage() {
        let mut left: Leaf<u32> = (0..3).collect();
        let right: Leaf<u32> = (3..6).collect();
        left.append(right).unwrap();
        assert_eq!(left.as_slice(), &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn generation_tracks_structure() {
        let mut leaf: Leaf<u32> = Leaf::new();
        let g0 = leaf.generation();
        leaf.push(1).unwrap();
        let g1 = leaf.generation();
        assert!(g1 > g0);
        leaf.set(0, 2).unwrap();
        assert_eq!(leaf.generation(), g1);
        leaf.remove_at(0).unwrap();
        assert!(leaf.generation() > g1);
    }

    #[test]
    fn copy_is_independent() {
        let original: Leaf<u32> = (0..8).collect();
        let mut copy = original.clone();
        copy.set(0, 100).unwrap();
        assert_eq!(original.get(0), Some(&0));
        assert_eq!(copy.get(0), Some(&100));
    }
}
