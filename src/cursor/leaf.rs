// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Cursor over a single leaf.

use crate::cursor::Direction;
use crate::cursor::current_index;
use crate::error::SegmentError;
use crate::error::SegmentResult;
use crate::segment::Segment;
use crate::segment::leaf::Leaf;

/// A mutating cursor over one leaf.
///
/// The cursor sits between elements: `index` is the position `next` would
/// read. `add` inserts at that position and steps past the new element, so
/// a following `next` is unaffected.
pub struct LeafCursor<'a, T> {
    leaf: &'a mut Leaf<T>,
    index: usize,
    last_move: Option<Direction>,
}

impl<'a, T> LeafCursor<'a, T> {
    pub fn new(leaf: &'a mut Leaf<T>) -> LeafCursor<'a, T> {
        return LeafCursor {
            leaf,
            index: 0,
            last_move: None,
        };
    }

    /// A cursor whose `next` yields the element at `index`.
    pub fn at(leaf: &'a mut Leaf<T>, index: usize) -> SegmentResult<LeafCursor<'a, T>> {
        let mut cursor = LeafCursor::new(leaf);
        cursor.go_to(index)?;
        return Ok(cursor);
    }

    #[inline]
    pub fn index(&self) -> usize {
        return self.index;
    }

    #[inline]
    pub fn last_move(&self) -> Option<Direction> {
        return self.last_move;
    }

    pub fn has_next(&self) -> bool {
        return self.index < self.leaf.len();
    }

    pub fn has_previous(&self) -> bool {
        return self.index > 0;
    }

    pub fn next(&mut self) -> Option<&T> {
        let item = self.leaf.get(self.index)?;
        self.index += 1;
        self.last_move = Some(Direction::Forward);
        return Some(item);
    }

    pub fn previous(&mut self) -> Option<&T> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        self.last_move = Some(Direction::Backward);
        return self.leaf.get(self.index);
    }

    /// The element `next` would return, without moving.
    pub fn peek(&self) -> Option<&T> {
        return self.leaf.get(self.index);
    }

    pub fn go_first(&mut self) {
        self.index = 0;
        self.last_move = None;
    }

    pub fn go_last(&mut self) {
        self.index = self.leaf.len();
        self.last_move = None;
    }

    pub fn go_to(&mut self, index: usize) -> SegmentResult<()> {
        if index > self.leaf.len() {
            return Err(SegmentError::bounds(index, self.leaf.len()));
        }
        self.index = index;
        self.last_move = None;
        return Ok(());
    }

    pub fn add(&mut self, value: T) -> SegmentResult<()> {
        self.leaf.insert(self.index, value)?;
        self.index += 1;
        self.last_move = None;
        return Ok(());
    }

    /// Remove the element the last move returned.
    pub fn remove(&mut self) -> SegmentResult<T> {
        let target = current_index(self.index, self.last_move)?;
        let removed = self.leaf.remove_at(target)?;
        self.index = target;
        self.last_move = None;
        return Ok(removed);
    }

    /// Remove the element ahead of the cursor.
    pub fn remove_forward(&mut self) -> SegmentResult<T> {
        let removed = self.leaf.remove_at(self.index)?;
        self.last_move = None;
        return Ok(removed);
    }

    /// Remove the element behind the cursor, stepping back over its slot.
    pub fn remove_backward(&mut self) -> SegmentResult<T> {
        if self.index == 0 {
            return Err(SegmentError::bounds(0, self.leaf.len()));
        }
        let removed = self.leaf.remove_at(self.index - 1)?;
        self.index -= 1;
        self.last_move = None;
        return Ok(removed);
    }

    /// Replace the element the last move returned.
    pub fn set(&mut self, value: T) -> SegmentResult<T> {
        let target = current_index(self.index, self.last_move)?;
        return self.leaf.set(target, value);
    }
}
