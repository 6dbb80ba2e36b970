// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Read-only cursor.

use std::marker::PhantomData;

use crate::cursor::Direction;
use crate::cursor::current_index;
use crate::error::SegmentError;
use crate::error::SegmentResult;
use crate::segment::Segment;

/// An independent read-only cursor.
///
/// Holds a shared borrow, so several can traverse one segment at once and
/// none of them can observe a structural edit.
pub struct FrozenCursor<'a, T, S> {
    segment: &'a S,
    index: usize,
    last_move: Option<Direction>,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T, S: Segment<T>> FrozenCursor<'a, T, S> {
    pub fn new(segment: &'a S) -> FrozenCursor<'a, T, S> {
        return FrozenCursor::at(segment, 0);
    }

    /// A cursor whose `next` yields the element at `index`, clamped to the
    /// end of the segment.
    pub fn at(segment: &'a S, index: usize) -> FrozenCursor<'a, T, S> {
        return FrozenCursor {
            segment,
            index: index.min(segment.len()),
            last_move: None,
            _marker: PhantomData,
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

    pub fn previous(&mut self) -> Option<&'a T> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        self.last_move = Some(Direction::Backward);
        return self.segment.get(self.index);
    }

    pub fn peek(&self) -> Option<&'a T> {
        return self.segment.get(self.index);
    }

    /// The element the last move returned.
    pub fn current(&self) -> SegmentResult<&'a T> {
        let index = current_index(self.index, self.last_move)?;
        return self
            .segment
            .get(index)
            .ok_or(SegmentError::bounds(index, self.segment.len()));
    }

    pub fn go_first(&mut self) {
        self.index = 0;
        self.last_move = None;
    }

    pub fn go_last(&mut self) {
        self.index = self.segment.len();
        self.last_move = None;
    }

    pub fn go_to(&mut self, index: usize) -> SegmentResult<()> {
        if index > self.segment.len() {
            return Err(SegmentError::bounds(index, self.segment.len()));
        }
        self.index = index;
        self.last_move = None;
        return Ok(());
    }
}

impl<'a, T: 'a, S: Segment<T>> Iterator for FrozenCursor<'a, T, S> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let item = self.segment.get(self.index)?;
        self.index += 1;
        self.last_move = Some(Direction::Forward);
        return Some(item);
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.segment.len() - self.index;
        return (left, Some(left));
    }
}

impl<T, S> Clone for FrozenCursor<'_, T, S> {
    fn clone(&self) -> Self {
        return FrozenCursor {
            segment: self.segment,
            index: self.index,
            last_move: self.last_move,
            _marker: PhantomData,
        };
    }
}
