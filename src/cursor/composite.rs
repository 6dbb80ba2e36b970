// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! The soft cursor over a composite.
//!
//! The cursor keeps a path to its current leaf plus an offset into it.
//! Stepping off either end of the leaf moves the path to the neighbouring
//! leaf, so a full traversal touches each composite on the way only once
//! per child. `go_to` is the only move that descends from the root.
//!
//! Edits go through [`cover`], which can rebalance any composite on the
//! path. The cursor keeps its global index and descends again lazily on
//! the next move, so iteration continues correctly across splits and
//! glues.

use std::mem;

use crate::cursor::Direction;
use crate::cursor::Path;
use crate::cursor::covering::cover;
use crate::cursor::current_index;
use crate::error::SegmentError;
use crate::error::SegmentResult;
use crate::segment::Segment;
use crate::segment::composite::Composite;
use crate::segment::leaf::Leaf;

/// A mutating cursor over a whole composite tree.
pub struct CompositeCursor<'a, T> {
    composite: &'a mut Composite<T>,
    path: Path,
    /// Offset within the leaf at `path`, valid while `located`.
    offset: usize,
    index: usize,
    located: bool,
    last_move: Option<Direction>,
}

impl<'a, T> CompositeCursor<'a, T> {
    pub fn new(composite: &'a mut Composite<T>) -> CompositeCursor<'a, T> {
        let mut path = mem::take(&mut composite.soft);
        path.clear();
        return CompositeCursor {
            composite,
            path,
            offset: 0,
            index: 0,
            located: false,
            last_move: None,
        };
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
        return self.index < self.composite.len();
    }

    pub fn has_previous(&self) -> bool {
        return self.index > 0;
    }

    fn locate(&mut self) -> bool {
        if self.located {
            return true;
        }
        match self.composite.descend(self.index, &mut self.path) {
            Some(offset) => {
                self.offset = offset;
                self.located = true;
            }
            None => self.path.clear(),
        }
        return self.located;
    }

    fn leaf_len(&self) -> Option<usize> {
        return self.composite.leaf_at(&self.path).map(|leaf| leaf.len());
    }

    pub fn next(&mut self) -> Option<&T> {
        if self.index >= self.composite.len() || !self.locate() {
            return None;
        }
        loop {
            let Some(len) = self.leaf_len() else {
                self.located = false;
                return None;
            };
            if self.offset < len {
                break;
            }
            if !self.composite.next_leaf(&mut self.path) {
                return None;
            }
            self.offset = 0;
        }
        self.offset += 1;
        self.index += 1;
        self.last_move = Some(Direction::Forward);
        return self.composite.leaf_at(&self.path)?.get(self.offset - 1);
    }

    pub fn previous(&mut self) -> Option<&T> {
        if self.index == 0 || !self.locate() {
            return None;
        }
        while self.offset == 0 {
            if !self.composite.prev_leaf(&mut self.path) {
                return None;
            }
            let Some(len) = self.leaf_len() else {
                self.located = false;
                return None;
            };
            self.offset = len;
        }
        self.offset -= 1;
        self.index -= 1;
        self.last_move = Some(Direction::Backward);
        return self.composite.leaf_at(&self.path)?.get(self.offset);
    }

    /// The element `next` would return, without moving.
    pub fn peek(&self) -> Option<&T> {
        return self.composite.get(self.index);
    }

    pub fn go_first(&mut self) {
        self.index = 0;
        self.located = false;
        self.last_move = None;
    }

    pub fn go_last(&mut self) {
        self.index = self.composite.len();
        self.located = false;
        self.last_move = None;
    }

    /// Jump to a global index, descending from the root on the next move.
    pub fn go_to(&mut self, index: usize) -> SegmentResult<()> {
        if index > self.composite.len() {
            return Err(SegmentError::bounds(index, self.composite.len()));
        }
        self.index = index;
        self.located = false;
        self.last_move = None;
        return Ok(());
    }

    /// Apply `op` to the leaf holding global `target`.
    fn edit<R, F>(&mut self, target: usize, op: F) -> SegmentResult<R>
    where
        F: FnOnce(&mut Leaf<T>, usize) -> SegmentResult<R>,
    {
        let len = self.composite.len();
        let offset = self
            .composite
            .descend(target, &mut self.path)
            .ok_or(SegmentError::bounds(target, len))?;
        self.located = false;
        return cover(self.composite, &self.path, |leaf| op(leaf, offset));
    }

    /// Insert before the element `next` would return, then step past it.
    pub fn add(&mut self, value: T) -> SegmentResult<()> {
        if self.composite.child_count() == 0 {
            self.composite.push(value)?;
        } else {
            self.edit(self.index, |leaf, offset| leaf.insert(offset, value))?;
        }
        self.index += 1;
        self.located = false;
        self.last_move = None;
        return Ok(());
    }

    /// Remove the element the last move returned.
    pub fn remove(&mut self) -> SegmentResult<T> {
        let target = current_index(self.index, self.last_move)?;
        let removed = self.edit(target, |leaf, offset| leaf.remove_at(offset))?;
        self.index = target;
        self.last_move = None;
        return Ok(removed);
    }

    /// Remove the element ahead of the cursor.
    pub fn remove_forward(&mut self) -> SegmentResult<T> {
        if self.index >= self.composite.len() {
            return Err(SegmentError::bounds(self.index, self.composite.len()));
        }
        let removed = self.edit(self.index, |leaf, offset| leaf.remove_at(offset))?;
        self.last_move = None;
        return Ok(removed);
    }

    /// Remove the element behind the cursor.
    pub fn remove_backward(&mut self) -> SegmentResult<T> {
        if self.index == 0 {
            return Err(SegmentError::bounds(0, self.composite.len()));
        }
        let removed = self.edit(self.index - 1, |leaf, offset| leaf.remove_at(offset))?;
        self.index -= 1;
        self.last_move = None;
        return Ok(removed);
    }

    /// Replace the element the last move returned.
    pub fn set(&mut self, value: T) -> SegmentResult<T> {
        let target = current_index(self.index, self.last_move)?;
        return self.edit(target, |leaf, offset| leaf.set(offset, value));
    }
}

impl<T> Drop for CompositeCursor<'_, T> {
    fn drop(&mut self) {
        self.composite.soft = mem::take(&mut self.path);
    }
}
