// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Leaf edits that keep the owning composites consistent.
//!
//! A leaf deep inside a tree cannot be edited directly: every composite on
//! the way down caches the length below it, carries a generation and may
//! hold a trusted hash. [`cover`] walks a path down to the leaf, runs the
//! edit, then settles each composite on the way back up, innermost first.
//! A composite whose child left the allowed size band rebalances as part of
//! settling, which can invalidate the path; cursors therefore re-locate by
//! global index after every edit.

use std::mem;

use crate::cursor::Direction;
use crate::cursor::Path;
use crate::cursor::current_index;
use crate::error::SegmentError;
use crate::error::SegmentResult;
use crate::segment::Node;
use crate::segment::Segment;
use crate::segment::composite::Composite;
use crate::segment::leaf::Leaf;

/// Run `op` on the leaf at `path` below `root`, then settle every composite
/// on the path.
pub(crate) fn cover<T, R, F>(root: &mut Composite<T>, path: &[usize], op: F) -> SegmentResult<R>
where
    F: FnOnce(&mut Leaf<T>) -> SegmentResult<R>,
{
    let (&first, rest) = path.split_first().ok_or(SegmentError::StaleCursor)?;
    let node = root
        .children_mut()
        .get_mut(first)
        .ok_or(SegmentError::StaleCursor)?;
    let before = node.len();
    let result = match node {
        Node::Leaf(leaf) if rest.is_empty() => op(leaf)?,
        Node::Composite(inner) => cover(inner, rest, op)?,
        Node::Leaf(_) => return Err(SegmentError::StaleCursor),
    };
    root.settle(first, before);
    return Ok(result);
}

/// A cursor confined to the leaf holding a global index.
///
/// `next` and `previous` stop at the leaf's edges. Edits go through
/// [`cover`], and afterwards the cursor lands again on whichever leaf now
/// holds its position.
pub struct CoveringCursor<'a, T> {
    root: &'a mut Composite<T>,
    path: Path,
    /// Global index of the leaf's first element.
    base: usize,
    offset: usize,
    last_move: Option<Direction>,
}

impl<'a, T> CoveringCursor<'a, T> {
    pub fn at(root: &'a mut Composite<T>, index: usize) -> SegmentResult<CoveringCursor<'a, T>> {
        if index > root.len() {
            return Err(SegmentError::bounds(index, root.len()));
        }
        let path = mem::take(&mut root.soft);
        let mut cursor = CoveringCursor {
            root,
            path,
            base: 0,
            offset: 0,
            last_move: None,
        };
        cursor.land(index);
        return Ok(cursor);
    }

    fn land(&mut self, index: usize) {
        match self.root.descend(index, &mut self.path) {
            Some(offset) => {
                self.offset = offset;
                self.base = index - offset;
            }
            None => {
                self.path.clear();
                self.offset = 0;
                self.base = 0;
            }
        }
    }

    fn leaf(&self) -> Option<&Leaf<T>> {
        return self.root.leaf_at(&self.path);
    }

    /// Global index of the cursor.
    #[inline]
    pub fn index(&self) -> usize {
        return self.base + self.offset;
    }

    /// Index within the covered leaf.
    #[inline]
    pub fn offset(&self) -> usize {
        return self.offset;
    }

    #[inline]
    pub fn last_move(&self) -> Option<Direction> {
        return self.last_move;
    }

    pub fn leaf_len(&self) -> usize {
        return self.leaf().map_or(0, |leaf| leaf.len());
    }

    pub fn next(&mut self) -> Option<&T> {
        let offset = self.offset;
        self.leaf()?.get(offset)?;
        self.offset += 1;
        self.last_move = Some(Direction::Forward);
        return self.leaf()?.get(offset);
    }

    pub fn previous(&mut self) -> Option<&T> {
        if self.offset == 0 {
            return None;
        }
        self.offset -= 1;
        self.last_move = Some(Direction::Backward);
        return self.leaf()?.get(self.offset);
    }

    pub fn peek(&self) -> Option<&T> {
        return self.leaf()?.get(self.offset);
    }

    /// Apply `op` at global `target`, then land on `after`.
    fn edit<R, F>(&mut self, target: usize, after: usize, op: F) -> SegmentResult<R>
    where
        F: FnOnce(&mut Leaf<T>, usize) -> SegmentResult<R>,
    {
        let offset = target
            .checked_sub(self.base)
            .ok_or(SegmentError::StaleCursor)?;
        let result = cover(self.root, &self.path, |leaf| op(leaf, offset))?;
        self.last_move = None;
        self.land(after);
        return Ok(result);
    }

    pub fn add(&mut self, value: T) -> SegmentResult<()> {
        let index = self.index();
        if self.path.is_empty() {
            self.root.push(value)?;
            self.land(index + 1);
            return Ok(());
        }
        return self.edit(index, index + 1, |leaf, offset| leaf.insert(offset, value).map(|_| ()));
    }

    /// Remove the element the last move returned.
    pub fn remove(&mut self) -> SegmentResult<T> {
        let target = current_index(self.index(), self.last_move)?;
        return self.edit(target, target, |leaf, offset| leaf.remove_at(offset));
    }

    pub fn remove_forward(&mut self) -> SegmentResult<T> {
        let index = self.index();
        return self.edit(index, index, |leaf, offset| leaf.remove_at(offset));
    }

    pub fn remove_backward(&mut self) -> SegmentResult<T> {
        if self.offset == 0 {
            return Err(SegmentError::bounds(0, self.leaf_len()));
        }
        let target = self.index() - 1;
        return self.edit(target, target, |leaf, offset| leaf.remove_at(offset));
    }

    pub fn set(&mut self, value: T) -> SegmentResult<T> {
        let target = current_index(self.index(), self.last_move)?;
        let last_move = self.last_move;
        let index = self.index();
        let old = self.edit(target, index, |leaf, offset| leaf.set(offset, value))?;
        self.last_move = last_move;
        return Ok(old);
    }
}

impl<T> Drop for CoveringCursor<'_, T> {
    fn drop(&mut self) {
        self.root.soft = mem::take(&mut self.path);
    }
}
